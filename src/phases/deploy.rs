//! Deploy stage: copy a library's artifacts into its output tree.
//!
//! Every collected artifact must exist before anything is copied, so a
//! missing file never leaves a half-deployed library behind. Copies are
//! incremental: a target that is not meaningfully older than its source is
//! left alone. The manifest is rewritten on every successful deploy.

use std::fs::{self, File};
use std::path::Path;
use std::time::SystemTime;

use log::info;

use crate::artifacts::{self, ArtifactFile};
use crate::context::{LibraryRecord, RunContext};
use crate::defaults::MTIME_TOLERANCE;
use crate::error::{Error, Result};
use crate::fsutil::make_directory;
use crate::manifest::Manifest;
use crate::phases::fetch::Revision;
use crate::process::Invocation;

/// Program that strips debug symbols from deployed libraries.
const STRIP: &str = "strip";

/// How many artifacts a deploy copied and how many were already current.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeployReport {
    pub copied: usize,
    pub up_to_date: usize,
}

pub fn execute(ctx: &RunContext, record: &LibraryRecord, revision: &Revision) -> Result<DeployReport> {
    make_directory(&record.output_dir)?;

    info!("Deploying lib {}", record.name());
    let files = artifacts::collect(record, ctx.platform)?;

    check_sources(&files)?;
    let report = copy_artifacts(ctx, &files)?;

    Manifest::from_artifacts(
        record.name(),
        ctx.platform.as_str(),
        &revision.to_string(),
        &files,
    )
    .write(&record.manifest_path())?;

    Ok(report)
}

fn check_sources(files: &[ArtifactFile]) -> Result<()> {
    match files.iter().find(|file| !file.source_path.is_file()) {
        Some(missing) => Err(Error::MissingArtifact {
            path: missing.source_path.clone(),
        }),
        None => Ok(()),
    }
}

fn copy_artifacts(ctx: &RunContext, files: &[ArtifactFile]) -> Result<DeployReport> {
    let strip = ctx.options.strip_symbols && ctx.platform.strips_symbols();
    let mut report = DeployReport::default();

    for file in files {
        if is_up_to_date(&file.source_path, &file.target_path)? {
            info!("File '{}' is up to date", file.target_path.display());
            report.up_to_date += 1;
            continue;
        }

        if let Some(parent) = file.target_path.parent() {
            make_directory(parent)?;
        }
        info!(
            "Copying '{}' to '{}'",
            file.source_path.display(),
            file.target_path.display()
        );
        copy_preserving_mtime(&file.source_path, &file.target_path)?;
        report.copied += 1;

        if strip && is_strippable(&file.file_name) {
            strip_symbols(&file.target_path)?;
        }

        if !file.target_path.is_file() {
            return Err(Error::MissingDeployedArtifact {
                path: file.target_path.clone(),
            });
        }
    }

    info!(
        "Copied {} file(s), {} up to date",
        report.copied, report.up_to_date
    );
    Ok(report)
}

/// Whether `target` exists and its source is less than the tolerance newer.
pub fn is_up_to_date(source: &Path, target: &Path) -> Result<bool> {
    if !target.is_file() {
        return Ok(false);
    }
    let source_time = fs::metadata(source)?.modified()?;
    let target_time = fs::metadata(target)?.modified()?;
    Ok(is_within_tolerance(source_time, target_time))
}

fn is_within_tolerance(source_time: SystemTime, target_time: SystemTime) -> bool {
    match source_time.duration_since(target_time) {
        Ok(newer_by) => newer_by < MTIME_TOLERANCE,
        // source is older than the target
        Err(_) => true,
    }
}

fn copy_preserving_mtime(source: &Path, target: &Path) -> Result<()> {
    let copy_error = |e: std::io::Error| Error::Filesystem {
        message: format!(
            "Unable to copy file from '{}' to '{}': {}",
            source.display(),
            target.display(),
            e
        ),
    };

    fs::copy(source, target).map_err(copy_error)?;
    let modified = fs::metadata(source).and_then(|m| m.modified()).map_err(copy_error)?;
    File::options()
        .write(true)
        .open(target)
        .and_then(|f| f.set_modified(modified))
        .map_err(copy_error)
}

/// Static archives and shared objects, including versioned ones.
pub fn is_strippable(file_name: &str) -> bool {
    file_name.ends_with(".a") || file_name.ends_with(".so") || file_name.contains(".so.")
}

fn strip_symbols(path: &Path) -> Result<()> {
    let dir = path.parent().unwrap_or(path);
    Invocation::new(STRIP, dir)
        .arg(path.to_string_lossy())
        .run()
}
