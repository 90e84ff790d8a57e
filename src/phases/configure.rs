//! Configure stage: prepare a library's build tree.
//!
//! Dependency tokens are resolved before anything else, so a broken binding
//! stops the run before any tool is started. Then:
//!
//! 1. the build directory is created
//! 2. patched libraries get their override set copied over the sources
//! 3. a platform setup script runs if the descriptor has one, otherwise the
//!    generation step runs if the descriptor has a configuration template
//!
//! A library with neither needs no configuration.

use std::path::PathBuf;

use log::info;

use crate::context::{LibraryRecord, RunContext};
use crate::dependencies;
use crate::error::{Error, Result};
use crate::fsutil::{make_directory, overlay_tree};
use crate::process::Invocation;

/// Placeholders substituted in setup scripts.
pub const BUILD_DIR_PLACEHOLDER: &str = "{build_dir}";
pub const SOURCE_DIR_PLACEHOLDER: &str = "{source_dir}";

/// Program that generates build files.
const GENERATOR: &str = "cmake";

pub fn execute(ctx: &RunContext, record: &LibraryRecord) -> Result<()> {
    let tokens = dependencies::resolve_tokens(ctx, record)?;

    make_directory(&record.build_dir)?;

    if record.descriptor.patched {
        apply_overrides(ctx, record)?;
    }

    match plan(ctx, record, tokens)? {
        Some(invocation) => invocation.run(),
        None => {
            info!(
                "Library '{}' does not require configuration",
                record.name()
            );
            Ok(())
        }
    }
}

/// The command that configures `record`, if any.
pub fn plan(
    ctx: &RunContext,
    record: &LibraryRecord,
    tokens: Vec<String>,
) -> Result<Option<Invocation>> {
    if let Some(script) = record.descriptor.setup_script(ctx.platform)? {
        let build_dir = record.build_dir.to_string_lossy();
        let source_dir = record.source_dir.to_string_lossy();
        let invocation = Invocation::from_template(
            script,
            &record.build_dir,
            &[
                (BUILD_DIR_PLACEHOLDER, build_dir.as_ref()),
                (SOURCE_DIR_PLACEHOLDER, source_dir.as_ref()),
            ],
        )
        .ok_or_else(|| Error::Descriptor {
            library: record.name().to_string(),
            message: format!("setup script for '{}' is empty", ctx.platform),
            hint: None,
        })?;
        return Ok(Some(invocation));
    }

    if record.descriptor.config.is_none() {
        return Ok(None);
    }

    let project_dir = generation_dir(record);
    if record.descriptor.build_subdir.is_some() {
        info!("Using custom CMake build path: {}", project_dir.display());
    }

    Ok(Some(
        Invocation::new(GENERATOR, &record.build_dir)
            .arg(project_dir.to_string_lossy())
            .args(tokens),
    ))
}

/// Directory holding the top-level build file.
pub fn generation_dir(record: &LibraryRecord) -> PathBuf {
    match &record.descriptor.build_subdir {
        Some(subdir) => record.source_dir.join(subdir),
        None => record.source_dir.clone(),
    }
}

fn apply_overrides(ctx: &RunContext, record: &LibraryRecord) -> Result<()> {
    let overrides = ctx.roots.overrides.join(record.name());
    if !overrides.is_dir() {
        return Err(Error::MissingOverrides {
            library: record.name().to_string(),
            path: overrides,
        });
    }

    let copied = overlay_tree(&overrides, &record.source_dir)?;
    info!(
        "Copied {} override file(s) to library '{}' from '{}'",
        copied,
        record.name(),
        overrides.display()
    );
    Ok(())
}
