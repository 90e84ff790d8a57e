//! Filesystem helpers shared by the pipeline stages.

use std::fs;
use std::path::Path;

use log::{info, warn};
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Create `path` and its parents if they do not exist yet.
pub fn make_directory(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    info!("Creating directory: '{}'", path.display());
    fs::create_dir_all(path).map_err(|source| Error::CreateDirectory {
        path: path.to_path_buf(),
        source,
    })
}

/// Copy every file under `from` onto `to`, replacing files that already
/// exist and keeping everything else in `to` untouched.
pub fn overlay_tree(from: &Path, to: &Path) -> Result<usize> {
    let mut copied = 0;
    for entry in WalkDir::new(from).sort_by_file_name() {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| Error::Filesystem {
                message: format!("'{}' is outside '{}': {}", entry.path().display(), from.display(), e),
            })?;
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            make_directory(&target)?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| Error::Filesystem {
                message: format!(
                    "Unable to copy '{}' to '{}': {}",
                    entry.path().display(),
                    target.display(),
                    e
                ),
            })?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Outcome of a guarded directory removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Removed,
    /// Nothing was there to remove.
    Absent,
    /// The path is too short to be trusted and was left alone.
    Refused,
}

/// Remove the file or directory tree at `path` unless its textual length is
/// below `min_len`.
pub fn remove_guarded(path: &Path, min_len: usize) -> Result<Removal> {
    if path.as_os_str().len() < min_len {
        warn!(
            "Refusing to remove '{}': path is shorter than {} characters",
            path.display(),
            min_len
        );
        return Ok(Removal::Refused);
    }
    let removed = if path.is_dir() {
        fs::remove_dir_all(path)
    } else if path.exists() {
        fs::remove_file(path)
    } else {
        return Ok(Removal::Absent);
    };
    removed.map_err(|e| Error::Filesystem {
        message: format!("Unable to remove '{}': {}", path.display(), e),
    })?;
    Ok(Removal::Removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_make_directory_creates_nested_dirs() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a/b/c");
        make_directory(&nested).unwrap();
        assert!(nested.is_dir());
        // second call is a no-op
        make_directory(&nested).unwrap();
    }

    #[test]
    fn test_make_directory_fails_under_a_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file");
        fs::write(&file, "x").unwrap();
        let err = make_directory(&file.join("sub")).unwrap_err();
        assert!(matches!(err, Error::CreateDirectory { .. }));
    }

    #[test]
    fn test_overlay_tree_replaces_and_keeps() {
        let temp = TempDir::new().unwrap();
        let from = temp.path().join("hacks");
        let to = temp.path().join("src");
        fs::create_dir_all(from.join("cmake")).unwrap();
        fs::create_dir_all(&to).unwrap();
        fs::write(from.join("CMakeLists.txt"), "patched").unwrap();
        fs::write(from.join("cmake/extra.cmake"), "extra").unwrap();
        fs::write(to.join("CMakeLists.txt"), "upstream").unwrap();
        fs::write(to.join("lua.c"), "int main;").unwrap();

        let copied = overlay_tree(&from, &to).unwrap();

        assert_eq!(copied, 2);
        assert_eq!(fs::read_to_string(to.join("CMakeLists.txt")).unwrap(), "patched");
        assert_eq!(fs::read_to_string(to.join("cmake/extra.cmake")).unwrap(), "extra");
        assert_eq!(fs::read_to_string(to.join("lua.c")).unwrap(), "int main;");
    }

    #[test]
    fn test_remove_guarded() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("build/zlib");
        fs::create_dir_all(&dir).unwrap();

        let too_long = dir.as_os_str().len() + 1;
        assert_eq!(remove_guarded(&dir, too_long).unwrap(), Removal::Refused);
        assert!(dir.exists());

        assert_eq!(remove_guarded(&dir, 4).unwrap(), Removal::Removed);
        assert!(!dir.exists());
        assert_eq!(remove_guarded(&dir, 4).unwrap(), Removal::Absent);
    }

    #[test]
    fn test_remove_guarded_handles_files() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("libsquish-1.15.tgz");
        fs::write(&archive, "gz").unwrap();

        assert_eq!(remove_guarded(&archive, 4).unwrap(), Removal::Removed);
        assert!(!archive.exists());
    }
}
