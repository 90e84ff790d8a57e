//! Default values for native-deps runs.
//!
//! This module provides centralized default values used across stages,
//! ensuring consistency and avoiding duplication.

use std::time::Duration;

/// Folder under the root holding fetched sources.
pub const SOURCE_FOLDER: &str = ".src";

/// Folder under the root holding build trees.
pub const BUILD_FOLDER: &str = ".build";

/// Folder under the root holding deployed libraries.
pub const OUTPUT_FOLDER: &str = ".out";

/// Folder under the root holding one override-file set per patched library.
pub const OVERRIDES_FOLDER: &str = "hacks";

/// Name of the manifest written into each library's output directory.
pub const MANIFEST_FILE: &str = "manifest.txt";

/// First line of every manifest.
pub const MANIFEST_MARKER: &str = "LIB_MANIFEST";

/// Revision recorded for sources that do not come from version control.
pub const UNVERSIONED_REVISION: &str = "0";

/// Shortest path clean and purge will remove.
///
/// Guards against wiping something like `/` or `C:\` when a root resolves
/// to an unexpected place.
pub const MIN_CLEAN_PATH_LEN: usize = 11;

/// A deployed file is considered current unless its source is at least this
/// much newer.
pub const MTIME_TOLERANCE: Duration = Duration::from_secs(1);

/// Parallel jobs requested from build tools when none are configured.
pub fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
