//! # Run Context
//!
//! Everything a run needs to know, resolved once before the first library is
//! touched and never mutated afterwards:
//!
//! - the target [`Platform`]
//! - the resolved [`RunRoots`] (source, build, output, overrides)
//! - the [`RunOptions`] tuning external tools
//! - one [`LibraryRecord`] per descriptor that supports the platform
//!
//! Building the context is the job of the platform resolver
//! ([`RunContext::new`]): descriptors for other platforms are dropped, each
//! remaining descriptor gets its own source/build/output directory, and
//! libraries excluded by the name filter are marked *muted*. Muted records
//! stay in [`RunContext::all`] so dependents can still resolve their
//! artifacts, but are left out of [`RunContext::active`].

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::defaults;
use crate::descriptor::{Acquisition, LibraryDescriptor, Origin};
use crate::error::{Error, Result};
use crate::fsutil::make_directory;
use crate::platform::Platform;
use crate::registry::Registry;

/// Absolute directories shared by every library of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRoots {
    pub root: PathBuf,
    pub source: PathBuf,
    pub build: PathBuf,
    pub output: PathBuf,
    /// Holds one override-file set per patched library.
    pub overrides: PathBuf,
}

impl RunRoots {
    /// Resolve roots from optional overrides. The root defaults to the current
    /// directory and everything else to a fixed folder under the root;
    /// relative overrides are taken relative to the root.
    pub fn resolve(
        root: Option<&Path>,
        source: Option<&Path>,
        build: Option<&Path>,
        output: Option<&Path>,
        overrides: Option<&Path>,
    ) -> Result<Self> {
        let root = match root {
            Some(root) => std::path::absolute(root)?,
            None => std::env::current_dir()?,
        };
        let under_root = |custom: Option<&Path>, default: &str| match custom {
            Some(path) if path.is_absolute() => path.to_path_buf(),
            Some(path) => root.join(path),
            None => root.join(default),
        };

        Ok(Self {
            source: under_root(source, defaults::SOURCE_FOLDER),
            build: under_root(build, defaults::BUILD_FOLDER),
            output: under_root(output, defaults::OUTPUT_FOLDER),
            overrides: under_root(overrides, defaults::OVERRIDES_FOLDER),
            root,
        })
    }

    /// Create the source, build and output roots.
    pub fn create_all(&self) -> Result<()> {
        make_directory(&self.source)?;
        make_directory(&self.build)?;
        make_directory(&self.output)
    }
}

/// Knobs for the external tools a run drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Parallel jobs requested from build tools.
    pub jobs: usize,
    /// Strip debug symbols from deployed libraries where the platform allows.
    pub strip_symbols: bool,
    /// Paths shorter than this are never removed by clean or purge.
    pub min_clean_path_len: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            jobs: defaults::default_jobs(),
            strip_symbols: true,
            min_clean_path_len: defaults::MIN_CLEAN_PATH_LEN,
        }
    }
}

/// A descriptor bound to the directories of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryRecord {
    pub descriptor: LibraryDescriptor,
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Excluded by the name filter; still available to dependents.
    pub muted: bool,
}

impl LibraryRecord {
    pub fn new(descriptor: LibraryDescriptor, roots: &RunRoots, muted: bool) -> Self {
        Self {
            source_dir: roots.source.join(&descriptor.name),
            build_dir: roots.build.join(&descriptor.name),
            output_dir: roots.output.join(&descriptor.name),
            descriptor,
            muted,
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Root directory an artifact spec with `origin` collects from.
    pub fn origin_dir(&self, origin: Origin) -> &Path {
        match origin {
            Origin::Source => &self.source_dir,
            Origin::Build => &self.build_dir,
        }
    }

    /// Directory the build tool runs in.
    pub fn work_dir(&self) -> &Path {
        if self.descriptor.in_source_build {
            &self.source_dir
        } else {
            &self.build_dir
        }
    }

    /// Where the downloaded archive is kept, for archive-acquired libraries.
    pub fn archive_path(&self, roots: &RunRoots) -> Option<PathBuf> {
        match &self.descriptor.acquisition {
            Acquisition::Archive { file_name, .. } => Some(roots.source.join(file_name)),
            Acquisition::Git { .. } => None,
        }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.output_dir.join(defaults::MANIFEST_FILE)
    }

    pub fn include_dir(&self) -> PathBuf {
        self.output_dir.join("include")
    }
}

/// Immutable state shared by every stage of a run.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub platform: Platform,
    pub roots: RunRoots,
    pub options: RunOptions,
    pub filter: BTreeSet<String>,
    records: Vec<LibraryRecord>,
}

impl RunContext {
    /// Resolve `registry` for `platform`.
    ///
    /// An empty `filter` selects every library.
    pub fn new(
        registry: &Registry,
        platform: Platform,
        roots: RunRoots,
        filter: impl IntoIterator<Item = String>,
        options: RunOptions,
    ) -> Result<Self> {
        let filter: BTreeSet<String> = filter.into_iter().collect();
        let mut records: Vec<LibraryRecord> = Vec::new();

        for descriptor in registry.libraries() {
            if !descriptor.supports(platform) {
                info!(
                    "Library '{}' will be skipped because it's not for platform '{}'",
                    descriptor.name, platform
                );
                continue;
            }
            if records.iter().any(|r| r.name() == descriptor.name) {
                return Err(Error::DuplicateLibrary {
                    name: descriptor.name.clone(),
                    platform: platform.to_string(),
                });
            }

            let muted = !filter.is_empty() && !filter.contains(&descriptor.name);
            if muted {
                info!("Library '{}' will be IGNORED", descriptor.name);
            } else {
                info!("Library '{}' will be BUILT", descriptor.name);
            }
            records.push(LibraryRecord::new(descriptor.clone(), &roots, muted));
        }

        for name in &filter {
            if !records.iter().any(|r| r.name() == name) {
                warn!(
                    "Filter '{}' does not match any library available for '{}'",
                    name, platform
                );
            }
        }

        let context = Self {
            platform,
            roots,
            options,
            filter,
            records,
        };
        info!("Found {} libraries to process", context.active().count());
        Ok(context)
    }

    /// Libraries this run works on, in declaration order.
    pub fn active(&self) -> impl Iterator<Item = &LibraryRecord> {
        self.records.iter().filter(|r| !r.muted)
    }

    /// Every library available on the platform, muted or not.
    pub fn all(&self) -> &[LibraryRecord] {
        &self.records
    }

    pub fn find(&self, name: &str) -> Option<&LibraryRecord> {
        self.records.iter().find(|r| r.name() == name)
    }
}
