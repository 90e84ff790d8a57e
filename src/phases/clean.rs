//! Clean and purge stages.
//!
//! Clean removes a library's build and output trees. Purge also removes its
//! source tree and, for archive libraries, the downloaded archive. Paths
//! shorter than [`RunOptions::min_clean_path_len`] are never touched.
//!
//! [`RunOptions::min_clean_path_len`]: crate::context::RunOptions::min_clean_path_len

use std::path::PathBuf;

use log::info;

use crate::context::{LibraryRecord, RunContext};
use crate::error::Result;
use crate::fsutil::{remove_guarded, Removal};

/// What happened to each path a clean or purge looked at, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub paths: Vec<(PathBuf, Removal)>,
}

impl CleanReport {
    pub fn removed(&self) -> usize {
        self.paths
            .iter()
            .filter(|(_, removal)| *removal == Removal::Removed)
            .count()
    }

    pub fn refused(&self) -> usize {
        self.paths
            .iter()
            .filter(|(_, removal)| *removal == Removal::Refused)
            .count()
    }
}

/// Remove the build and output trees of `record`.
pub fn clean(ctx: &RunContext, record: &LibraryRecord) -> Result<CleanReport> {
    remove_all(
        ctx,
        "Cleaning",
        vec![record.build_dir.clone(), record.output_dir.clone()],
    )
}

/// Remove everything `clean` does, plus the sources of `record`.
pub fn purge(ctx: &RunContext, record: &LibraryRecord) -> Result<CleanReport> {
    let mut paths = vec![
        record.source_dir.clone(),
        record.build_dir.clone(),
        record.output_dir.clone(),
    ];
    paths.extend(record.archive_path(&ctx.roots));
    remove_all(ctx, "Purging", paths)
}

fn remove_all(ctx: &RunContext, action: &str, paths: Vec<PathBuf>) -> Result<CleanReport> {
    let mut report = CleanReport::default();
    for path in paths {
        info!("{} '{}'", action, path.display());
        let removal = remove_guarded(&path, ctx.options.min_clean_path_len)?;
        report.paths.push((path, removal));
    }
    Ok(report)
}
