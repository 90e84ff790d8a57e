//! End-to-end tests for CLI exit codes.
//!
//! Every fatal condition exits with its own negative code, documented in
//! [`native_deps::error::exit_codes`]. On unix a process only reports the low
//! eight bits of its exit code, so `-5` is observed as `251`.
//!
//! - Exit code 0: Success
//! - Exit code 1: Failure outside the pipeline
//! - Exit code 2: Invalid command-line usage (handled by clap)

mod common;
use common::prelude::*;
use native_deps::error::exit_codes;

/// The status a unix process reports for `code`.
#[cfg(unix)]
fn reported(code: i32) -> i32 {
    code & 0xff
}

/// Exit code 0 is returned for --help.
#[test]
fn test_exit_code_help() {
    let mut cmd = cargo_bin_cmd!("native-deps");

    cmd.arg("--help")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("--platform"));
}

/// Exit code 0 is returned for --version.
#[test]
fn test_exit_code_version() {
    let mut cmd = cargo_bin_cmd!("native-deps");

    cmd.arg("--version")
        .assert()
        .code(0)
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

/// Exit code 2 is returned when the platform is missing.
#[test]
fn test_exit_code_missing_platform() {
    let mut cmd = cargo_bin_cmd!("native-deps");

    cmd.arg("build")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--platform"));
}

/// Exit code 2 is returned for an unknown platform.
#[test]
fn test_exit_code_unknown_platform() {
    let mut cmd = cargo_bin_cmd!("native-deps");

    cmd.args(["-p", "amiga", "build"]).assert().code(2);
}

/// A single-variable binding to a library with two link libraries fails
/// before any build tool runs.
#[cfg(unix)]
#[test]
fn test_exit_code_ambiguous_dependency() {
    let fixture = TestFixture::new()
        .with_registry(registries::AMBIGUOUS)
        .with_archive(
            "mbedtls.tgz",
            &[("lib/libmbedtls.a", ""), ("lib/libmbedx509.a", "")],
        )
        .with_archive("curl.tgz", &[("CMakeLists.txt", "project(curl C)")]);

    fixture
        .command()
        .args(["clone", "configure", "build"])
        .assert()
        .code(reported(exit_codes::DEPENDENCY))
        .stderr(predicate::str::contains("emits 2 library artifacts"));

    // curl never reached its build tree
    assert!(!fixture.path().join(".build/curl").exists());
}

/// A declared artifact missing from the source tree aborts the deploy.
#[cfg(unix)]
#[test]
fn test_exit_code_missing_artifact() {
    let fixture = TestFixture::new()
        .with_registry(registries::PREBUILT)
        .with_archive("squish-1.15.tgz", &[("squish.h", "#pragma once")]);

    fixture
        .command()
        .args(["clone", "deploy"])
        .assert()
        .code(reported(exit_codes::MISSING_ARTIFACT))
        .stderr(predicate::str::contains("Missing artifact file"));

    assert!(!fixture.output("squish", "manifest.txt").exists());
    assert!(!fixture.output("squish", "include/squish.h").exists());
}

/// An archive that cannot be downloaded aborts the run.
#[cfg(unix)]
#[test]
fn test_exit_code_download_failure() {
    let fixture = TestFixture::new().with_registry(registries::PREBUILT);

    fixture
        .command()
        .arg("clone")
        .assert()
        .code(reported(exit_codes::DOWNLOAD));
}

/// An archive with an unknown extension cannot be unpacked.
#[cfg(unix)]
#[test]
fn test_exit_code_unsupported_archive() {
    let fixture = TestFixture::new()
        .with_registry(
            r#"
- name: dxc
  archive: http://127.0.0.1:9/dxc.7z
  platforms: [linux]
"#,
        )
        .with_file(".src/dxc.7z", "7z");

    fixture
        .command()
        .arg("pull")
        .assert()
        .code(reported(exit_codes::UNSUPPORTED_ARCHIVE));
}

/// A patched library without overrides is an environment error.
#[cfg(unix)]
#[test]
fn test_exit_code_missing_overrides() {
    let fixture = TestFixture::new()
        .with_registry(
            r#"
- name: lua
  archive: http://127.0.0.1:9/lua.tgz
  platforms: [linux]
  patched: true
"#,
        )
        .with_archive("lua.tgz", &[("lua.c", "int main;")]);

    fixture
        .command()
        .args(["clone", "configure"])
        .assert()
        .code(reported(exit_codes::FILESYSTEM))
        .stderr(predicate::str::contains("has no override directory"));
}

/// An invalid registry file is rejected before anything runs.
#[cfg(unix)]
#[test]
fn test_exit_code_invalid_registry() {
    let fixture = TestFixture::new().with_registry(
        r#"
- name: zlib
  repo: https://github.com/madler/zlib.git
  archive: https://example.com/zlib.tgz
  platforms: [linux]
"#,
    );

    fixture
        .command()
        .arg("clone")
        .assert()
        .code(reported(exit_codes::DESCRIPTOR))
        .stderr(predicate::str::contains("both 'repo' and 'archive'"));

    assert!(!fixture.path().join(".src").exists());
}
