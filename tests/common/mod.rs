//! Shared test utilities for E2E tests.
//!
//! This module provides a fixture that lays out a run root with a registry
//! file and pre-downloaded archives, so the full pipeline can run without
//! network access or native build tools.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new()
//!         .with_registry(registries::PREBUILT)
//!         .with_archive("squish-1.15.tgz", &[("squish.h", "")]);
//!     fixture.command().args(["clone", "deploy"]).assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::registries;
    pub use super::TestFixture;
}

/// Registry snippets for testing. Archive URLs point at a closed port, so
/// any attempt to download fails fast.
#[allow(dead_code)]
pub mod registries {
    /// One archive library with one header and one link library.
    pub const PREBUILT: &str = r#"
- name: squish
  archive: http://127.0.0.1:9/squish-1.15.tgz
  platforms: [linux]
  artifacts:
    - { kind: header, origin: source, files: [squish.h] }
    - { kind: library, origin: source, files: [lib/libsquish.a] }
"#;

    /// A dependency bound through a single variable to a library that
    /// produces two link libraries.
    pub const AMBIGUOUS: &str = r#"
- name: mbedtls
  archive: http://127.0.0.1:9/mbedtls.tgz
  platforms: [linux]
  artifacts:
    - { kind: library, origin: source, files: [lib/libmbedtls.a, lib/libmbedx509.a] }
- name: curl
  archive: http://127.0.0.1:9/curl.tgz
  platforms: [linux]
  build_tool: cmake
  config: -DBUILD_CURL_EXE=OFF
  dependencies:
    - { library: mbedtls, lib_var: MBEDTLS_LIBRARY }
"#;

    /// A header directory scan next to a non-header file.
    pub const HEADER_SCAN: &str = r#"
- name: freetype
  archive: http://127.0.0.1:9/freetype.tgz
  platforms: [linux]
  artifacts:
    - { kind: header, origin: source, dirs: [include] }
"#;
}

/// A run root with a registry file and a source root.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write the registry file the fixture's commands use.
    pub fn with_registry(self, content: &str) -> Self {
        self.temp_dir
            .child("libraries.yaml")
            .write_str(content)
            .expect("Failed to write registry file");
        self
    }

    /// Place a gzip-compressed tarball into the source root, as if it had
    /// been downloaded already.
    pub fn with_archive(self, file_name: &str, entries: &[(&str, &str)]) -> Self {
        let source_root = self.path().join(".src");
        std::fs::create_dir_all(&source_root).expect("Failed to create source root");
        write_tgz(&source_root.join(file_name), entries);
        self
    }

    /// Add a file with the given path and content.
    #[allow(dead_code)]
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path to the registry file.
    pub fn registry_path(&self) -> PathBuf {
        self.path().join("libraries.yaml")
    }

    /// Path of `relative` inside the output tree of `library`.
    pub fn output(&self, library: &str, relative: &str) -> PathBuf {
        self.path().join(".out").join(library).join(relative)
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command rooted at this fixture, for linux, without
    /// symbol stripping.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("native-deps");
        cmd.current_dir(self.path())
            .env_remove("RUST_LOG")
            .arg("--root")
            .arg(self.path())
            .arg("--registry")
            .arg(self.registry_path())
            .args(["-p", "linux", "--no-strip"]);
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Write a gzip-compressed tarball holding `entries`.
pub fn write_tgz(path: &Path, entries: &[(&str, &str)]) {
    let file = File::create(path).expect("Failed to create archive");
    let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, content) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, content.as_bytes())
            .expect("Failed to append archive entry");
    }
    builder
        .into_inner()
        .and_then(|encoder| encoder.finish())
        .expect("Failed to finish archive");
}
