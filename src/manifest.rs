//! Per-library manifest.
//!
//! Deploy writes one manifest into each library's output directory. It is the
//! contract consumers read to find out what a library provides, so the format
//! is fixed:
//!
//! ```text
//! LIB_MANIFEST
//! <library name>
//! <platform>
//! <revision>
//! LIBRARY
//! <file name>
//! DEPLOY
//! <file name>
//! ```
//!
//! Lines are joined with `\n` and there is no trailing newline. Only library
//! and deploy artifacts are listed; headers are found through the include
//! directory instead.

use std::fs;
use std::path::Path;

use log::info;

use crate::artifacts::ArtifactFile;
use crate::defaults::MANIFEST_MARKER;
use crate::descriptor::ArtifactKind;
use crate::error::{Error, Result};

/// One listed artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub kind: ArtifactKind,
    pub file_name: String,
}

impl ManifestEntry {
    fn tag(&self) -> &'static str {
        match self.kind {
            ArtifactKind::Deploy => "DEPLOY",
            _ => "LIBRARY",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub library: String,
    pub platform: String,
    pub revision: String,
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Build a manifest from collected artifacts, keeping their order.
    pub fn from_artifacts(
        library: &str,
        platform: &str,
        revision: &str,
        files: &[ArtifactFile],
    ) -> Self {
        let entries = files
            .iter()
            .filter(|file| file.kind != ArtifactKind::Header)
            .map(|file| ManifestEntry {
                kind: file.kind,
                file_name: file.file_name.clone(),
            })
            .collect();

        Self {
            library: library.to_string(),
            platform: platform.to_string(),
            revision: revision.to_string(),
            entries,
        }
    }

    pub fn render(&self) -> String {
        let mut lines: Vec<&str> = vec![
            MANIFEST_MARKER,
            self.library.as_str(),
            self.platform.as_str(),
            self.revision.as_str(),
        ];
        for entry in &self.entries {
            lines.push(entry.tag());
            lines.push(entry.file_name.as_str());
        }
        lines.join("\n")
    }

    /// Parse manifest text; `path` is only used for error messages.
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let malformed = |message: String| Error::Manifest {
            path: path.to_path_buf(),
            message,
        };

        let mut lines = text.lines();
        match lines.next() {
            Some(MANIFEST_MARKER) => {}
            other => {
                return Err(malformed(format!(
                    "expected '{}' marker, found {:?}",
                    MANIFEST_MARKER, other
                )))
            }
        }

        let mut header = || {
            lines
                .next()
                .map(str::to_string)
                .ok_or_else(|| malformed("truncated header".to_string()))
        };
        let library = header()?;
        let platform = header()?;
        let revision = header()?;

        let mut entries = Vec::new();
        while let Some(tag) = lines.next() {
            let kind = match tag {
                "LIBRARY" => ArtifactKind::Library,
                "DEPLOY" => ArtifactKind::Deploy,
                other => return Err(malformed(format!("unknown entry kind '{}'", other))),
            };
            let file_name = lines
                .next()
                .ok_or_else(|| malformed(format!("'{}' entry without a file name", tag)))?;
            entries.push(ManifestEntry {
                kind,
                file_name: file_name.to_string(),
            });
        }

        Ok(Self {
            library,
            platform,
            revision,
            entries,
        })
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, self.render()).map_err(|e| Error::Filesystem {
            message: format!(
                "Failed to write library manifest to '{}': {}",
                path.display(),
                e
            ),
        })?;
        info!(
            "Written manifest for {} at '{}'",
            self.library,
            path.display()
        );
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text, path)
    }
}
