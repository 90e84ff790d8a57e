//! # Library Descriptors
//!
//! This module defines the declarative model for one externally built library:
//! where its sources come from, which platforms it supports, how it is
//! configured and built, what other libraries it links against, and which
//! files it produces.
//!
//! Descriptors are authored in YAML. Each entry is first deserialized into a
//! loose [`DescriptorDef`] that mirrors the file format, then validated into a
//! strongly typed [`LibraryDescriptor`]. Validation happens once, when the
//! registry is loaded, so nothing downstream has to deal with a half-formed
//! descriptor:
//!
//! - exactly one acquisition method (`repo` or `archive`)
//! - a non-empty platform set
//! - per-platform maps (`build`, `setup`) cover every supported platform
//! - every dependency binds at least one variable, and never both a single
//!   library variable and per-file variables
//! - every artifact lists either `files` or `dirs`, with relative paths only
//!
//! ## Example
//!
//! ```yaml
//! - name: zlib
//!   repo: https://github.com/madler/zlib.git
//!   platforms: [windows, linux]
//!   build_tool: cmake
//!   config: ""
//!   build: --build . --config Release
//!   artifacts:
//!     - kind: library
//!       origin: build
//!       platforms: [linux]
//!       files: [libz.a]
//!     - kind: header
//!       origin: source
//!       files: [zlib.h]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};
use crate::platform::Platform;

/// How a library's sources are acquired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acquisition {
    /// A version-controlled repository, cloned shallow.
    Git { repo: String },
    /// A downloadable archive, unpacked into the source tree.
    Archive { url: String, file_name: String },
}

/// The native build tool that drives a library's build step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildTool {
    Cmake,
    Ninja,
}

impl BuildTool {
    /// The executable run for the build step.
    pub fn program(self) -> &'static str {
        match self {
            BuildTool::Cmake => "cmake",
            BuildTool::Ninja => "ninja",
        }
    }

    /// Arguments requesting `jobs` parallel jobs, if the platform needs them.
    pub fn parallel_args(self, platform: Platform, jobs: usize) -> Vec<String> {
        if platform != Platform::Linux {
            return Vec::new();
        }
        match self {
            BuildTool::Cmake => vec!["--parallel".to_string(), jobs.to_string()],
            BuildTool::Ninja => vec!["-j".to_string(), jobs.to_string()],
        }
    }
}

/// A string that is either shared by all platforms or given per platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlatformValue {
    Shared(String),
    PerPlatform(BTreeMap<Platform, String>),
}

impl PlatformValue {
    /// The value for `platform`, or `None` when a per-platform map lacks it.
    pub fn for_platform(&self, platform: Platform) -> Option<&str> {
        match self {
            PlatformValue::Shared(value) => Some(value),
            PlatformValue::PerPlatform(map) => map.get(&platform).map(String::as_str),
        }
    }
}

/// Classification of a produced file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// A public header, deployed under `include/`.
    Header,
    /// A link library, deployed under `lib/`.
    Library,
    /// A runtime binary, deployed under `bin/`.
    Deploy,
}

impl ArtifactKind {
    /// The output subtree artifacts of this kind are deployed into.
    pub fn subdir(self) -> &'static str {
        match self {
            ArtifactKind::Header => "include",
            ArtifactKind::Library => "lib",
            ArtifactKind::Deploy => "bin",
        }
    }
}

/// Which tree an artifact spec collects from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Source,
    Build,
}

/// How an artifact spec selects its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactSelection {
    /// Explicit paths relative to the origin root.
    Files(Vec<String>),
    /// Directories relative to the origin root, scanned recursively.
    Dirs(Vec<String>),
}

/// One group of files a library produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSpec {
    pub kind: ArtifactKind,
    pub origin: Origin,
    pub platforms: Vec<Platform>,
    pub selection: ArtifactSelection,
    /// Optional path prepended to every deployed file, e.g. `lua/`.
    pub prefix: Option<String>,
}

impl ArtifactSpec {
    pub fn applies_to(&self, platform: Platform) -> bool {
        self.platforms.contains(&platform)
    }
}

/// One variable bound to a named file of a dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileBinding {
    pub var: String,
    pub file: String,
}

/// How a dependency's link libraries are bound to configuration variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryBinding {
    /// One variable bound to the dependency's only library artifact.
    Single(String),
    /// Several variables, each bound to an exactly named library artifact.
    PerFile(Vec<FileBinding>),
}

/// A build-time reference from one library to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySpec {
    pub library: String,
    pub enabled: bool,
    pub platform: Option<Platform>,
    pub binding: Option<LibraryBinding>,
    /// Variable bound to the dependency's deployed include directory.
    pub include_var: Option<String>,
}

impl DependencySpec {
    pub fn applies_to(&self, platform: Platform) -> bool {
        self.enabled && self.platform.is_none_or(|p| p == platform)
    }
}

/// A validated, immutable library descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryDescriptor {
    pub name: String,
    pub acquisition: Acquisition,
    pub platforms: Vec<Platform>,
    pub build_tool: Option<BuildTool>,
    /// Configuration argument template; `{source_path}` is substituted.
    pub config: Option<String>,
    pub build: Option<PlatformValue>,
    /// Per-platform setup script run instead of the generation step;
    /// `{build_dir}` and `{source_dir}` are substituted.
    pub setup: Option<BTreeMap<Platform, String>>,
    /// Nested directory holding the top-level build file.
    pub build_subdir: Option<String>,
    /// Override files are overlaid onto the sources before configuring.
    pub patched: bool,
    pub in_source_build: bool,
    pub dependencies: Vec<DependencySpec>,
    pub artifacts: Vec<ArtifactSpec>,
}

impl LibraryDescriptor {
    pub fn supports(&self, platform: Platform) -> bool {
        self.platforms.contains(&platform)
    }

    /// Build arguments for `platform`; an empty string when none are declared.
    pub fn build_args(&self, platform: Platform) -> Result<&str> {
        match &self.build {
            None => Ok(""),
            Some(value) => value
                .for_platform(platform)
                .ok_or_else(|| Error::MissingPlatformEntry {
                    library: self.name.clone(),
                    what: "build arguments".to_string(),
                    platform: platform.to_string(),
                }),
        }
    }

    /// Setup script for `platform`, if the descriptor uses one.
    pub fn setup_script(&self, platform: Platform) -> Result<Option<&str>> {
        match &self.setup {
            None => Ok(None),
            Some(map) => map
                .get(&platform)
                .map(|script| Some(script.as_str()))
                .ok_or_else(|| Error::MissingPlatformEntry {
                    library: self.name.clone(),
                    what: "setup script".to_string(),
                    platform: platform.to_string(),
                }),
        }
    }
}

////// FILE FORMAT //////

/// Dependency entry as written in a registry file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DependencyDef {
    pub library: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub platform: Option<Platform>,
    #[serde(default)]
    pub lib_var: Option<String>,
    #[serde(default)]
    pub lib_vars: Option<Vec<FileBinding>>,
    #[serde(default)]
    pub include_var: Option<String>,
}

fn default_enabled() -> bool {
    true
}

/// Artifact entry as written in a registry file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArtifactDef {
    pub kind: ArtifactKind,
    pub origin: Origin,
    /// Defaults to every platform the library supports.
    #[serde(default)]
    pub platforms: Option<Vec<Platform>>,
    #[serde(default)]
    pub files: Option<Vec<String>>,
    #[serde(default)]
    pub dirs: Option<Vec<String>>,
    #[serde(default)]
    pub prefix: Option<String>,
}

/// Library entry as written in a registry file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DescriptorDef {
    pub name: String,
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default)]
    pub archive: Option<String>,
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub build_tool: Option<BuildTool>,
    #[serde(default)]
    pub config: Option<String>,
    #[serde(default)]
    pub build: Option<PlatformValue>,
    #[serde(default)]
    pub setup: Option<BTreeMap<Platform, String>>,
    #[serde(default)]
    pub build_subdir: Option<String>,
    #[serde(default)]
    pub patched: bool,
    #[serde(default)]
    pub in_source_build: bool,
    #[serde(default)]
    pub dependencies: Vec<DependencyDef>,
    #[serde(default)]
    pub artifacts: Vec<ArtifactDef>,
}

impl TryFrom<DescriptorDef> for LibraryDescriptor {
    type Error = Error;

    fn try_from(def: DescriptorDef) -> Result<Self> {
        let name = def.name.trim().to_string();
        if name.is_empty() {
            return Err(invalid("<unnamed>", "library name is empty", None));
        }

        let acquisition = match (def.repo, def.archive) {
            (Some(repo), None) => Acquisition::Git { repo },
            (None, Some(url)) => {
                let file_name = archive_file_name(&url).ok_or_else(|| {
                    invalid(
                        &name,
                        &format!("archive URL '{}' does not end in a file name", url),
                        None,
                    )
                })?;
                Acquisition::Archive { url, file_name }
            }
            (Some(_), Some(_)) => {
                return Err(invalid(
                    &name,
                    "both 'repo' and 'archive' are set",
                    Some("Keep exactly one acquisition method"),
                ))
            }
            (None, None) => {
                return Err(invalid(
                    &name,
                    "no acquisition method",
                    Some("Add 'repo:' or 'archive:'"),
                ))
            }
        };

        if def.platforms.is_empty() {
            return Err(invalid(&name, "'platforms' is empty", None));
        }

        for &platform in &def.platforms {
            if let Some(build) = &def.build {
                if build.for_platform(platform).is_none() {
                    return Err(missing_entry(&name, "build arguments", platform));
                }
            }
            if let Some(setup) = &def.setup {
                if !setup.contains_key(&platform) {
                    return Err(missing_entry(&name, "setup script", platform));
                }
            }
        }

        if let Some(subdir) = &def.build_subdir {
            ensure_relative(&name, subdir)?;
        }

        let dependencies = def
            .dependencies
            .into_iter()
            .map(|dep| dependency_from_def(&name, dep))
            .collect::<Result<Vec<_>>>()?;

        let artifacts = def
            .artifacts
            .into_iter()
            .map(|artifact| artifact_from_def(&name, &def.platforms, artifact))
            .collect::<Result<Vec<_>>>()?;

        Ok(LibraryDescriptor {
            name,
            acquisition,
            platforms: def.platforms,
            build_tool: def.build_tool,
            config: def.config,
            build: def.build,
            setup: def.setup,
            build_subdir: def.build_subdir.filter(|s| !s.is_empty()),
            patched: def.patched,
            in_source_build: def.in_source_build,
            dependencies,
            artifacts,
        })
    }
}

fn dependency_from_def(library: &str, def: DependencyDef) -> Result<DependencySpec> {
    let binding = match (def.lib_var, def.lib_vars) {
        (Some(_), Some(_)) => {
            return Err(invalid(
                library,
                &format!(
                    "dependency on '{}' sets both 'lib_var' and 'lib_vars'",
                    def.library
                ),
                None,
            ))
        }
        (Some(var), None) => Some(LibraryBinding::Single(var)),
        (None, Some(vars)) if vars.is_empty() => {
            return Err(invalid(
                library,
                &format!("dependency on '{}' has an empty 'lib_vars'", def.library),
                None,
            ))
        }
        (None, Some(vars)) => Some(LibraryBinding::PerFile(vars)),
        (None, None) => None,
    };

    if binding.is_none() && def.include_var.is_none() {
        return Err(invalid(
            library,
            &format!("dependency on '{}' binds no variable", def.library),
            Some("Set 'lib_var', 'lib_vars' or 'include_var'"),
        ));
    }

    Ok(DependencySpec {
        library: def.library,
        enabled: def.enabled,
        platform: def.platform,
        binding,
        include_var: def.include_var,
    })
}

fn artifact_from_def(
    library: &str,
    library_platforms: &[Platform],
    def: ArtifactDef,
) -> Result<ArtifactSpec> {
    let selection = match (def.files, def.dirs) {
        (Some(files), None) => ArtifactSelection::Files(files),
        (None, Some(dirs)) => ArtifactSelection::Dirs(dirs),
        _ => {
            return Err(invalid(
                library,
                "invalid artifact definition, either 'dirs' or 'files' should be specified",
                None,
            ))
        }
    };

    let paths = match &selection {
        ArtifactSelection::Files(paths) | ArtifactSelection::Dirs(paths) => paths,
    };
    if paths.is_empty() {
        return Err(invalid(library, "artifact lists no paths", None));
    }
    for path in paths {
        ensure_relative(library, path)?;
    }
    if let Some(prefix) = &def.prefix {
        ensure_relative(library, prefix)?;
    }

    Ok(ArtifactSpec {
        kind: def.kind,
        origin: def.origin,
        platforms: def
            .platforms
            .unwrap_or_else(|| library_platforms.to_vec()),
        selection,
        prefix: def.prefix.filter(|p| !p.is_empty()),
    })
}

/// Last path segment of an archive URL, used as the local download name.
pub fn archive_file_name(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(str::to_string)
}

fn ensure_relative(library: &str, path: &str) -> Result<()> {
    if Path::new(path).is_absolute() {
        return Err(invalid(
            library,
            &format!("path '{}' must be relative", path),
            None,
        ));
    }
    Ok(())
}

fn invalid(library: &str, message: &str, hint: Option<&str>) -> Error {
    Error::Descriptor {
        library: library.to_string(),
        message: message.to_string(),
        hint: hint.map(str::to_string),
    }
}

fn missing_entry(library: &str, what: &str, platform: Platform) -> Error {
    Error::MissingPlatformEntry {
        library: library.to_string(),
        what: what.to_string(),
        platform: platform.to_string(),
    }
}
