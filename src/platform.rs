//! Target platforms a run can build for.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// The closed set of platforms descriptors can target.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Linux,
}

impl Platform {
    /// Every supported platform, in declaration order.
    pub const ALL: [Platform; 2] = [Platform::Windows, Platform::Linux];

    /// The lowercase name used in descriptors, manifests and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Linux => "linux",
        }
    }

    /// Whether deployed libraries get their debug symbols stripped.
    pub fn strips_symbols(self) -> bool {
        matches!(self, Platform::Linux)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
