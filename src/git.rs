//! Version-control operations, delegated to the system `git` command.
//!
//! Using the system binary means SSH keys, credential helpers and anything
//! else configured in `~/.gitconfig` just work.

use std::path::Path;
use std::process::Command;

use log::info;

use crate::error::{Error, Result};
use crate::process::Invocation;

/// Length of a full SHA-1 commit hash.
const HASH_LEN: usize = 40;

/// Shallow-clone `url` into `target_dir`.
pub fn clone_shallow(url: &str, target_dir: &Path) -> Result<()> {
    let parent = target_dir.parent().unwrap_or(target_dir);
    info!("{}$: git clone --depth 1 {} {}", parent.display(), url, target_dir.display());

    let output = Command::new("git")
        .args(["clone", "--depth", "1", url])
        .arg(target_dir)
        .current_dir(parent)
        .output()
        .map_err(|source| Error::Spawn {
            command: format!("git clone {}", url),
            source,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);

        // Provide helpful error message for common auth failures
        let message = if stderr.contains("Authentication failed")
            || stderr.contains("Permission denied")
            || stderr.contains("Could not read from remote repository")
        {
            format!(
                "{}: authentication failed, make sure you have access to the repository\n{}",
                output.status,
                stderr.trim()
            )
        } else {
            format!("{}: {}", output.status, stderr.trim())
        };

        return Err(Error::Command {
            command: format!("git clone --depth 1 {} {}", url, target_dir.display()),
            dir: parent.to_path_buf(),
            status: message,
        });
    }

    Ok(())
}

/// Bring an existing checkout up to date with its remote.
pub fn pull(repo_dir: &Path) -> Result<()> {
    git(repo_dir).arg("pull").run()
}

/// Initialise and update nested repositories recursively.
pub fn update_submodules(repo_dir: &Path) -> Result<()> {
    git(repo_dir)
        .args(["submodule", "update", "--init", "--recursive"])
        .run()
}

/// The full hash of the checked-out commit.
pub fn head_revision(repo_dir: &Path) -> Result<String> {
    git(repo_dir).args(["rev-parse", "HEAD"]).capture()
}

/// Accept `raw` only if it is a full lowercase or uppercase hex commit hash.
pub fn parse_revision(raw: &str) -> Option<String> {
    let hash = raw.trim();
    if hash.len() == HASH_LEN && hash.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(hash.to_string())
    } else {
        None
    }
}

fn git(repo_dir: &Path) -> Invocation {
    Invocation::new("git", repo_dir).arg("-C").arg(repo_dir.to_string_lossy())
}
