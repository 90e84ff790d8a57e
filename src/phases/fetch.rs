//! Fetch stage: make sure a library's source tree exists.
//!
//! Version-controlled libraries are shallow-cloned when their source tree is
//! absent, and their submodules initialised right after. In
//! [`FetchMode::Synchronize`] an existing checkout is pulled and its
//! submodules updated as well.
//!
//! Archive libraries are downloaded into the source root once and unpacked
//! into the source tree once. Both steps are skipped when their result is
//! already on disk, so fetching twice downloads and unpacks nothing the
//! second time.

use std::fmt;
use std::path::Path;

use log::info;

use crate::archive;
use crate::context::{LibraryRecord, RunContext};
use crate::defaults::UNVERSIONED_REVISION;
use crate::descriptor::Acquisition;
use crate::error::{Error, Result};
use crate::git;

/// What to do with a version-controlled source tree that already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Leave existing sources alone.
    CloneMissing,
    /// Pull existing sources and update their submodules.
    Synchronize,
}

/// What a fetch actually did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchReport {
    pub downloaded: bool,
    pub unpacked: bool,
    pub cloned: bool,
    pub updated: bool,
}

pub fn execute(ctx: &RunContext, record: &LibraryRecord, mode: FetchMode) -> Result<FetchReport> {
    match &record.descriptor.acquisition {
        Acquisition::Git { repo } => fetch_git(record, repo, mode),
        Acquisition::Archive { url, file_name } => {
            let archive_path = ctx.roots.source.join(file_name);
            fetch_archive(record, url, &archive_path)
        }
    }
}

fn fetch_git(record: &LibraryRecord, repo: &str, mode: FetchMode) -> Result<FetchReport> {
    let mut report = FetchReport::default();

    if !record.source_dir.is_dir() {
        info!("Cloning '{}'...", record.name());
        git::clone_shallow(repo, &record.source_dir)?;

        if !record.source_dir.is_dir() {
            return Err(Error::CloneVerification {
                library: record.name().to_string(),
                path: record.source_dir.clone(),
            });
        }
        git::update_submodules(&record.source_dir)?;
        report.cloned = true;
    } else if mode == FetchMode::Synchronize {
        git::pull(&record.source_dir)?;
        git::update_submodules(&record.source_dir)?;
        report.updated = true;
    }

    Ok(report)
}

fn fetch_archive(
    record: &LibraryRecord,
    url: &str,
    archive_path: &Path,
) -> Result<FetchReport> {
    let mut report = FetchReport::default();

    if archive_path.is_file() {
        info!("File '{}' already downloaded", url);
    } else {
        archive::download(url, archive_path)?;
        if !archive_path.is_file() {
            return Err(Error::Download {
                url: url.to_string(),
                message: format!("'{}' is missing after download", archive_path.display()),
            });
        }
        report.downloaded = true;
    }

    if record.source_dir.is_dir() {
        info!("File '{}' already unpacked", archive_path.display());
    } else {
        archive::unpack(archive_path, &record.source_dir)?;
        report.unpacked = true;
    }

    Ok(report)
}

/// The version of a library's sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revision {
    /// Full commit hash of a version-controlled checkout.
    Commit(String),
    /// Sources that do not come from version control.
    Unversioned,
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Revision::Commit(hash) => f.write_str(hash),
            Revision::Unversioned => f.write_str(UNVERSIONED_REVISION),
        }
    }
}

/// Capture the revision of a library's sources.
///
/// A checkout whose revision cannot be queried, or is not a full commit hash,
/// is an error.
pub fn verify(record: &LibraryRecord) -> Result<Revision> {
    match &record.descriptor.acquisition {
        Acquisition::Git { .. } => {
            let raw = git::head_revision(&record.source_dir).map_err(|e| Error::Revision {
                library: record.name().to_string(),
                message: format!("unable to verify proper clone: {}", e),
            })?;
            let hash = git::parse_revision(&raw).ok_or_else(|| Error::Revision {
                library: record.name().to_string(),
                message: format!("'{}' is not a full commit hash", raw),
            })?;
            info!("Library '{}' at {}", record.name(), hash);
            Ok(Revision::Commit(hash))
        }
        Acquisition::Archive { .. } => {
            info!(
                "Library '{}' was not cloned from git repo, no hash",
                record.name()
            );
            Ok(Revision::Unversioned)
        }
    }
}
