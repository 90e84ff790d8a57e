//! # Error Handling
//!
//! This module defines the centralized error type for `native-deps`. Every
//! fatal condition the pipeline can hit is a variant of [`Error`], and every
//! variant belongs to one of three classes:
//!
//! - **Configuration** errors: the descriptors themselves are wrong
//!   (ambiguous or missing dependency bindings, a missing per-platform entry,
//!   a malformed artifact spec, an unreadable registry).
//! - **Environment** errors: the machine did not cooperate (an external
//!   command failed, a directory could not be created, an override set is
//!   missing, a download failed).
//! - **Integrity** errors: the produced tree is not what the descriptors
//!   promise (a declared artifact is missing, a copy did not land, a source
//!   tree has no usable revision).
//!
//! All classes are handled the same way: the first error aborts the run. The
//! binary maps each variant to a distinct negative process exit code through
//! [`Error::exit_code`].

use std::path::PathBuf;

use thiserror::Error;

/// The broad family an [`Error`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Configuration,
    Environment,
    Integrity,
}

/// Process exit codes, one per fatal condition class.
pub mod exit_codes {
    /// Directory creation or other filesystem failure.
    pub const FILESYSTEM: i32 = -1;
    /// A source tree is missing after cloning or has no valid revision.
    pub const SOURCE_VERIFICATION: i32 = -2;
    /// An external command returned non-zero or could not be started.
    pub const COMMAND: i32 = -3;
    /// A declared artifact is missing.
    pub const MISSING_ARTIFACT: i32 = -4;
    /// A dependency could not be resolved unambiguously.
    pub const DEPENDENCY: i32 = -5;
    /// An archive could not be downloaded.
    pub const DOWNLOAD: i32 = -6;
    /// A per-platform mapping has no entry for the target platform.
    pub const PLATFORM_MAPPING: i32 = -7;
    /// The registry or one of its descriptors is invalid.
    pub const DESCRIPTOR: i32 = -8;
    /// An archive has an extension we cannot unpack.
    pub const UNSUPPORTED_ARCHIVE: i32 = -9;
}

/// Main error type for native-deps operations
#[derive(Error, Debug)]
pub enum Error {
    /// A descriptor in the registry failed load-time validation.
    #[error("Invalid descriptor '{library}': {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    Descriptor {
        library: String,
        message: String,
        /// Optional hint for how to fix the descriptor
        hint: Option<String>,
    },

    /// Two descriptors enabled for the same platform share a name, which would
    /// make their per-run directories collide.
    #[error("Library '{name}' is declared more than once for platform '{platform}'")]
    DuplicateLibrary { name: String, platform: String },

    /// A dependency names a library that is not in the run's registry.
    #[error("Library '{library}' depends on '{dependency}', which is not available for this platform")]
    UnknownDependency { library: String, dependency: String },

    /// A single-variable binding did not find exactly one library artifact.
    #[error("Library '{dependency}' emits {count} library artifacts, but '{library}' binds it through a single variable{}", if *count > 1 { "; use per-file variables to pick the exact libraries" } else { "" })]
    AmbiguousDependency {
        library: String,
        dependency: String,
        count: usize,
    },

    /// A per-file binding names a file the dependency does not produce.
    #[error("Library '{dependency}' does not emit library artifact '{file}' required by '{library}'")]
    UnmatchedDependencyFile {
        library: String,
        dependency: String,
        file: String,
    },

    /// A per-file binding names a file the dependency emits more than once.
    #[error("Library '{dependency}' emits {count} library artifacts named '{file}' required by '{library}'; the name must be unique")]
    DuplicateDependencyFile {
        library: String,
        dependency: String,
        file: String,
        count: usize,
    },

    /// A per-platform mapping (build arguments, setup script) lacks the
    /// target platform.
    #[error("Missing {what} variant for platform '{platform}' in library '{library}'")]
    MissingPlatformEntry {
        library: String,
        what: String,
        platform: String,
    },

    /// A directory could not be created.
    #[error("Unable to create directory '{}': {source}", path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A library is marked as patched but its override set does not exist.
    #[error("Library '{library}' is marked as patched but has no override directory at '{}'", path.display())]
    MissingOverrides { library: String, path: PathBuf },

    /// A filesystem operation other than directory creation failed.
    #[error("Filesystem operation error: {message}")]
    Filesystem { message: String },

    /// An external command exited with a non-zero status.
    #[error("Command failed in '{}': {command} ({status})", dir.display())]
    Command {
        command: String,
        dir: PathBuf,
        status: String,
    },

    /// An external command could not be started at all.
    #[error("Unable to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A clone finished but the source tree is still absent.
    #[error("Cloning '{library}' failed: '{}' does not exist", path.display())]
    CloneVerification { library: String, path: PathBuf },

    /// The revision of a version-controlled source tree is not a full hash.
    #[error("Unable to verify revision of '{library}': {message}")]
    Revision { library: String, message: String },

    /// An archive could not be downloaded.
    #[error("Failed to download {url}: {message}")]
    Download { url: String, message: String },

    /// An archive has an extension we do not know how to unpack.
    #[error("Unsupported format of compressed file '{}'", path.display())]
    UnsupportedArchive { path: PathBuf },

    /// The root an artifact spec collects from does not exist.
    #[error("Artifact origin '{}' of library '{library}' does not exist", path.display())]
    MissingOrigin { library: String, path: PathBuf },

    /// A declared artifact is missing from the source or build tree.
    #[error("Missing artifact file '{}'", path.display())]
    MissingArtifact { path: PathBuf },

    /// A copied artifact is missing from the output tree after the copy.
    #[error("Missing deployed artifact file '{}'", path.display())]
    MissingDeployedArtifact { path: PathBuf },

    /// A manifest could not be parsed.
    #[error("Malformed manifest '{}': {message}", path.display())]
    Manifest { path: PathBuf, message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// A directory walk error, wrapped from `walkdir::Error`.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// A zip archive error, wrapped from `zip::result::ZipError`.
    #[error("Zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl Error {
    /// The family this error belongs to.
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::Descriptor { .. }
            | Error::DuplicateLibrary { .. }
            | Error::UnknownDependency { .. }
            | Error::AmbiguousDependency { .. }
            | Error::UnmatchedDependencyFile { .. }
            | Error::DuplicateDependencyFile { .. }
            | Error::MissingPlatformEntry { .. }
            | Error::Yaml(_)
            | Error::UrlParse(_) => ErrorClass::Configuration,
            Error::CreateDirectory { .. }
            | Error::MissingOverrides { .. }
            | Error::Filesystem { .. }
            | Error::Command { .. }
            | Error::Spawn { .. }
            | Error::Download { .. }
            | Error::UnsupportedArchive { .. }
            | Error::Io(_)
            | Error::Walk(_)
            | Error::Zip(_) => ErrorClass::Environment,
            Error::CloneVerification { .. }
            | Error::Revision { .. }
            | Error::MissingOrigin { .. }
            | Error::MissingArtifact { .. }
            | Error::MissingDeployedArtifact { .. }
            | Error::Manifest { .. } => ErrorClass::Integrity,
        }
    }

    /// The process exit code the binary terminates with for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::CreateDirectory { .. }
            | Error::MissingOverrides { .. }
            | Error::Filesystem { .. }
            | Error::Io(_)
            | Error::Walk(_) => exit_codes::FILESYSTEM,
            Error::CloneVerification { .. } | Error::Revision { .. } => {
                exit_codes::SOURCE_VERIFICATION
            }
            Error::Command { .. } | Error::Spawn { .. } => exit_codes::COMMAND,
            Error::MissingOrigin { .. }
            | Error::MissingArtifact { .. }
            | Error::MissingDeployedArtifact { .. }
            | Error::Manifest { .. } => exit_codes::MISSING_ARTIFACT,
            Error::UnknownDependency { .. }
            | Error::AmbiguousDependency { .. }
            | Error::UnmatchedDependencyFile { .. }
            | Error::DuplicateDependencyFile { .. } => exit_codes::DEPENDENCY,
            Error::Download { .. } => exit_codes::DOWNLOAD,
            Error::MissingPlatformEntry { .. } => exit_codes::PLATFORM_MAPPING,
            Error::Descriptor { .. }
            | Error::DuplicateLibrary { .. }
            | Error::Yaml(_)
            | Error::UrlParse(_) => exit_codes::DESCRIPTOR,
            Error::UnsupportedArchive { .. } | Error::Zip(_) => exit_codes::UNSUPPORTED_ARCHIVE,
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
