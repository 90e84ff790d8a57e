//! # Artifact Collection
//!
//! Turns a library's [`ArtifactSpec`]s into the concrete list of files it
//! produces for the run's platform. The list is authoritative: deployment
//! copies exactly these files, the manifest records them, and dependency
//! resolution binds variables to them.
//!
//! ## Placement
//!
//! Each file is deployed under the library's output directory, in the subtree
//! for its kind (`include/`, `lib/`, `bin/`), below the entry's optional prefix:
//!
//! - explicitly listed files land by bare file name, so `lib/lz4.h` from the
//!   source tree becomes `include/lz4.h`
//! - files found by scanning a directory keep their path relative to that
//!   directory, so `include/freetype/freetype.h` scanned from `include`
//!   becomes `include/freetype/freetype.h`
//!
//! Directory scans of header specs only pick up header-like extensions.

use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::context::LibraryRecord;
use crate::descriptor::{ArtifactKind, ArtifactSelection, ArtifactSpec};
use crate::error::{Error, Result};
use crate::platform::Platform;

/// Extensions treated as headers when scanning directories.
const HEADER_EXTENSIONS: [&str; 4] = ["h", "hpp", "inl", "inc"];

/// One concrete file a library produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFile {
    pub kind: ArtifactKind,
    pub file_name: String,
    /// Path relative to the origin root (source or build tree).
    pub relative_path: PathBuf,
    pub source_path: PathBuf,
    pub target_path: PathBuf,
}

/// Whether `path` has a header-like extension.
pub fn is_header_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| HEADER_EXTENSIONS.contains(&ext))
}

/// Collect every artifact `record` produces on `platform`, in declaration order.
pub fn collect(record: &LibraryRecord, platform: Platform) -> Result<Vec<ArtifactFile>> {
    let mut files = Vec::new();

    for spec in &record.descriptor.artifacts {
        if !spec.applies_to(platform) {
            continue;
        }

        let origin = record.origin_dir(spec.origin);
        if !origin.is_dir() {
            return Err(Error::MissingOrigin {
                library: record.name().to_string(),
                path: origin.to_path_buf(),
            });
        }

        let located = match &spec.selection {
            ArtifactSelection::Files(paths) => from_files(origin, paths),
            ArtifactSelection::Dirs(dirs) => {
                from_directories(origin, dirs, spec.kind == ArtifactKind::Header)?
            }
        };

        let target_root = target_root(record, spec);
        files.extend(located.into_iter().map(|found| {
            let file = ArtifactFile {
                kind: spec.kind,
                file_name: file_name(&found.source_path),
                target_path: target_root.join(&found.placement),
                relative_path: found.relative_path,
                source_path: found.source_path,
            };
            debug!(
                "{:?} '{}' -> '{}'",
                file.kind,
                file.source_path.display(),
                file.target_path.display()
            );
            file
        }));
    }

    info!(
        "Found {} artifacts in library '{}'",
        files.len(),
        record.name()
    );
    Ok(files)
}

/// A located file before it is bound to a kind and a target.
struct Located {
    relative_path: PathBuf,
    /// Path under the kind subtree, before the prefix is applied.
    placement: PathBuf,
    source_path: PathBuf,
}

fn from_files(origin: &Path, paths: &[String]) -> Vec<Located> {
    paths
        .iter()
        .map(|path| {
            let source_path = origin.join(path);
            Located {
                relative_path: PathBuf::from(path),
                placement: PathBuf::from(file_name(&source_path)),
                source_path,
            }
        })
        .collect()
}

fn from_directories(origin: &Path, dirs: &[String], headers_only: bool) -> Result<Vec<Located>> {
    let mut found = Vec::new();

    for dir in dirs {
        let search_root = origin.join(dir);
        if !search_root.is_dir() {
            warn!("Artifact directory '{}' does not exist", search_root.display());
            continue;
        }

        for entry in WalkDir::new(&search_root).sort_by_file_name() {
            let entry = entry?;
            // symlinked files count, under the link's own name
            if entry.file_type().is_dir() || !entry.path().is_file() {
                continue;
            }
            if headers_only && !is_header_file(entry.path()) {
                continue;
            }

            let source_path = entry.path().to_path_buf();
            let placement = relative_to(&source_path, &search_root)?;
            found.push(Located {
                relative_path: relative_to(&source_path, origin)?,
                placement,
                source_path,
            });
        }
    }

    info!("Found {} files at '{}'", found.len(), origin.display());
    Ok(found)
}

fn target_root(record: &LibraryRecord, spec: &ArtifactSpec) -> PathBuf {
    let root = record.output_dir.join(spec.kind.subdir());
    match &spec.prefix {
        Some(prefix) => root.join(prefix),
        None => root,
    }
}

fn relative_to(path: &Path, base: &Path) -> Result<PathBuf> {
    path.strip_prefix(base)
        .map(Path::to_path_buf)
        .map_err(|_| Error::Filesystem {
            message: format!("'{}' is not under '{}'", path.display(), base.display()),
        })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
