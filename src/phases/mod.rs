//! Pipeline stages of a native-deps run.
//!
//! ## Overview
//!
//! Each selected library goes through the stages its commands ask for, always
//! in this order:
//!
//! 1. Purge - remove sources, build and output trees ([`clean`])
//! 2. Fetch - clone, pull or download and unpack sources ([`fetch`])
//! 3. Verify - capture the source revision ([`fetch::verify`])
//! 4. Clean - remove build and output trees ([`clean`])
//! 5. Configure - overlay overrides, run setup or generation ([`configure`])
//! 6. Build - run the build tool ([`build`])
//! 7. Deploy - copy artifacts and write the manifest ([`deploy`])
//!
//! Libraries are processed one at a time in registry order by the
//! [`orchestrator`]. The first failing stage aborts the whole run.

use std::collections::BTreeSet;
use std::fmt;

use clap::ValueEnum;

pub mod build;
pub mod clean;
pub mod configure;
pub mod deploy;
pub mod fetch;
pub mod orchestrator;

/// A command selectable on the command line. Any combination may be given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub enum Command {
    /// Clone or download sources that are not there yet
    Clone,
    /// Like clone, but also update sources that already exist
    Pull,
    /// Generate build files
    Configure,
    /// Run the build tool
    Build,
    /// Copy artifacts into the output tree and write the manifest
    Deploy,
    /// Accepted for compatibility; does nothing yet
    Package,
    /// Remove build and output trees
    Clean,
    /// Remove sources, build and output trees
    Purge,
}

impl Command {
    pub fn as_str(self) -> &'static str {
        match self {
            Command::Clone => "clone",
            Command::Pull => "pull",
            Command::Configure => "configure",
            Command::Build => "build",
            Command::Deploy => "deploy",
            Command::Package => "package",
            Command::Clean => "clean",
            Command::Purge => "purge",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The deduplicated set of commands of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSet(BTreeSet<Command>);

impl CommandSet {
    pub fn contains(&self, command: Command) -> bool {
        self.0.contains(&command)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether any selected command works on the fetched sources, which
    /// makes revision verification necessary.
    pub fn needs_sources(&self) -> bool {
        [
            Command::Clone,
            Command::Pull,
            Command::Configure,
            Command::Build,
            Command::Deploy,
        ]
        .into_iter()
        .any(|command| self.contains(command))
    }
}

impl FromIterator<Command> for CommandSet {
    fn from_iter<I: IntoIterator<Item = Command>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for CommandSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|c| c.as_str()).collect();
        f.write_str(&names.join(", "))
    }
}
