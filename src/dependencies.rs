//! # Dependency Resolution
//!
//! Turns the [`DependencySpec`]s of one library into `-D<VAR>=<path>`
//! configuration tokens, followed by the library's own configuration template.
//!
//! Dependencies are looked up among every library available on the platform,
//! muted ones included, so filtering a run down to one library still lets it
//! link against everything it needs. Bindings are strict:
//!
//! - a single `lib_var` needs the dependency to produce exactly one library
//!   artifact; zero or several is an error rather than a guess
//! - each `lib_vars` entry needs exactly one library artifact with that file
//!   name
//! - an `include_var` binds the dependency's deployed include directory

use log::debug;

use crate::artifacts::{self, ArtifactFile};
use crate::context::{LibraryRecord, RunContext};
use crate::descriptor::{ArtifactKind, DependencySpec, LibraryBinding};
use crate::error::{Error, Result};
use crate::process::split_template;

/// Placeholder in configuration templates replaced by the source directory.
pub const SOURCE_PATH_PLACEHOLDER: &str = "{source_path}";

/// Configuration tokens for `record`: dependency bindings in declaration
/// order, then the library's own configuration template.
pub fn resolve_tokens(ctx: &RunContext, record: &LibraryRecord) -> Result<Vec<String>> {
    let mut tokens = Vec::new();

    for spec in &record.descriptor.dependencies {
        if !spec.applies_to(ctx.platform) {
            continue;
        }
        tokens.extend(dependency_tokens(ctx, record, spec)?);
    }

    if let Some(template) = &record.descriptor.config {
        let source_path = record.source_dir.to_string_lossy();
        tokens.extend(split_template(
            template,
            &[(SOURCE_PATH_PLACEHOLDER, source_path.as_ref())],
        ));
    }

    Ok(tokens)
}

fn dependency_tokens(
    ctx: &RunContext,
    record: &LibraryRecord,
    spec: &DependencySpec,
) -> Result<Vec<String>> {
    let dependency = ctx
        .find(&spec.library)
        .ok_or_else(|| Error::UnknownDependency {
            library: record.name().to_string(),
            dependency: spec.library.clone(),
        })?;

    let mut tokens = Vec::new();

    if let Some(binding) = &spec.binding {
        let libraries: Vec<ArtifactFile> = artifacts::collect(dependency, ctx.platform)?
            .into_iter()
            .filter(|file| file.kind == ArtifactKind::Library)
            .collect();

        match binding {
            LibraryBinding::Single(var) => {
                let [library] = libraries.as_slice() else {
                    return Err(Error::AmbiguousDependency {
                        library: record.name().to_string(),
                        dependency: dependency.name().to_string(),
                        count: libraries.len(),
                    });
                };
                tokens.push(define(var, &library.source_path.to_string_lossy()));
            }
            LibraryBinding::PerFile(bindings) => {
                for binding in bindings {
                    let matches: Vec<&ArtifactFile> = libraries
                        .iter()
                        .filter(|file| file.file_name == binding.file)
                        .collect();
                    let library = match matches.as_slice() {
                        [library] => library,
                        [] => {
                            return Err(Error::UnmatchedDependencyFile {
                                library: record.name().to_string(),
                                dependency: dependency.name().to_string(),
                                file: binding.file.clone(),
                            })
                        }
                        _ => {
                            return Err(Error::DuplicateDependencyFile {
                                library: record.name().to_string(),
                                dependency: dependency.name().to_string(),
                                file: binding.file.clone(),
                                count: matches.len(),
                            })
                        }
                    };
                    tokens.push(define(&binding.var, &library.source_path.to_string_lossy()));
                }
            }
        }
    }

    if let Some(var) = &spec.include_var {
        tokens.push(define(var, &dependency.include_dir().to_string_lossy()));
    }

    debug!(
        "Dependency '{}' of '{}': {:?}",
        dependency.name(),
        record.name(),
        tokens
    );
    Ok(tokens)
}

fn define(var: &str, value: &str) -> String {
    format!("-D{}={}", var, value)
}
