//! External command invocation.
//!
//! Every stage that needs a native tool builds an [`Invocation`] and runs it
//! synchronously. The working directory belongs to the child process only, so
//! our own working directory is never changed and nothing has to be restored
//! when a command fails.
//!
//! Argument templates from descriptors are split on whitespace *before*
//! placeholders are substituted, so a substituted path containing spaces stays
//! a single argument. No shell is involved.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{debug, info};

use crate::error::{Error, Result};

/// A program, its arguments and the directory it runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub dir: PathBuf,
}

impl Invocation {
    pub fn new(program: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            dir: dir.into(),
        }
    }

    /// Build an invocation from a whole command-line template, whose first
    /// token is the program. Returns `None` for a blank template.
    pub fn from_template(template: &str, dir: &Path, substitutions: &[(&str, &str)]) -> Option<Self> {
        let mut tokens = split_template(template, substitutions).into_iter();
        let program = tokens.next()?;
        Some(Self {
            program,
            args: tokens.collect(),
            dir: dir.to_path_buf(),
        })
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).current_dir(&self.dir);
        command
    }

    /// Run to completion with inherited output; a non-zero exit is an error.
    pub fn run(&self) -> Result<()> {
        info!("{}$: {}", self.dir.display(), self);
        let status = self
            .command()
            .status()
            .map_err(|source| Error::Spawn {
                command: self.to_string(),
                source,
            })?;

        if !status.success() {
            return Err(Error::Command {
                command: self.to_string(),
                dir: self.dir.clone(),
                status: status.to_string(),
            });
        }
        Ok(())
    }

    /// Run to completion and return trimmed stdout.
    pub fn capture(&self) -> Result<String> {
        debug!("{}$: {}", self.dir.display(), self);
        let output = self
            .command()
            .stderr(Stdio::inherit())
            .output()
            .map_err(|source| Error::Spawn {
                command: self.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(Error::Command {
                command: self.to_string(),
                dir: self.dir.clone(),
                status: output.status.to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Split `template` on whitespace, then replace each `(placeholder, value)`
/// pair inside every token.
pub fn split_template(template: &str, substitutions: &[(&str, &str)]) -> Vec<String> {
    template
        .split_whitespace()
        .map(|token| {
            substitutions
                .iter()
                .fold(token.to_string(), |acc, (placeholder, value)| {
                    acc.replace(placeholder, value)
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_split_template_substitutes_after_splitting() {
        let tokens = split_template(
            "-GNinja -C {source_path}/cmake/caches/PredefinedParams.cmake -DX=1",
            &[("{source_path}", "/my sources/dxc")],
        );
        assert_eq!(
            tokens,
            vec![
                "-GNinja",
                "-C",
                "/my sources/dxc/cmake/caches/PredefinedParams.cmake",
                "-DX=1"
            ]
        );
    }

    #[test]
    fn test_split_template_blank() {
        assert!(split_template("   ", &[]).is_empty());
        assert!(Invocation::from_template("", Path::new("/"), &[]).is_none());
    }

    #[test]
    fn test_from_template_takes_program_from_first_token() {
        let inv = Invocation::from_template(
            "{source_dir}/physx/generate_projects.sh linux",
            Path::new("/build/physx"),
            &[("{source_dir}", "/src/physx")],
        )
        .unwrap();
        assert_eq!(inv.program, "/src/physx/physx/generate_projects.sh");
        assert_eq!(inv.args, vec!["linux"]);
        assert_eq!(inv.dir, PathBuf::from("/build/physx"));
    }

    #[test]
    fn test_display_quotes_arguments_with_spaces() {
        let inv = Invocation::new("cmake", "/b").args(["/a b", "-DX=1"]);
        assert_eq!(inv.to_string(), "cmake \"/a b\" -DX=1");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_reports_failure() {
        let temp = TempDir::new().unwrap();
        let err = Invocation::new("false", temp.path()).run().unwrap_err();
        assert!(matches!(err, Error::Command { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_capture_runs_in_directory() {
        let temp = TempDir::new().unwrap();
        let out = Invocation::new("pwd", temp.path()).capture().unwrap();
        let expected = temp.path().canonicalize().unwrap();
        assert_eq!(PathBuf::from(out).canonicalize().unwrap(), expected);
    }

    #[test]
    fn test_missing_program_is_a_spawn_error() {
        let temp = TempDir::new().unwrap();
        let err = Invocation::new("definitely-not-a-real-tool-xyz", temp.path())
            .run()
            .unwrap_err();
        assert!(matches!(err, Error::Spawn { .. }));
    }
}
