//! # Native Dependency Builder
//!
//! This library fetches, configures, builds and deploys the external native
//! libraries an engine links against. It is driven by the `native-deps`
//! command-line tool but can be used directly.
//!
//! ## Quick Example
//!
//! ```
//! use native_deps::platform::Platform;
//! use native_deps::registry::Registry;
//!
//! let registry = Registry::parse(r#"
//! - name: zlib
//!   repo: https://github.com/madler/zlib.git
//!   platforms: [windows, linux]
//!   build_tool: cmake
//!   config: ""
//!   build: --build . --config Release
//!   artifacts:
//!     - { kind: library, origin: build, platforms: [linux], files: [libz.a] }
//!     - { kind: header, origin: source, files: [zlib.h] }
//! "#).unwrap();
//!
//! assert_eq!(registry.len(), 1);
//! assert_eq!(registry.for_platform(Platform::Linux).count(), 1);
//! ```
//!
//! ## Core Concepts
//!
//! - **Descriptors (`descriptor`)**: the declarative, validated description of
//!   one library: where its sources come from, how it is built, what it
//!   depends on and which files it produces.
//! - **Registry (`registry`)**: the ordered list of descriptors. Declaration
//!   order is processing order and must respect dependencies.
//! - **Run context (`context`)**: the immutable per-run view of the registry
//!   for one platform, with resolved directories and muted libraries.
//! - **Phases (`phases`)**: the fetch, configure, build, deploy and clean
//!   stages, sequenced per library by the `orchestrator`.
//! - **Collaborators (`git`, `archive`, `process`)**: version control,
//!   archive download and extraction, and external tool invocation.
//!
//! ## Execution Flow
//!
//! 1.  **Resolve**: filter the registry by platform, derive directories and
//!     mute libraries excluded by the name filter.
//! 2.  **Fetch**: clone, pull or download and unpack sources.
//! 3.  **Verify**: record the source revision.
//! 4.  **Configure**: resolve dependency tokens and generate build files.
//! 5.  **Build**: run the native build tool.
//! 6.  **Deploy**: collect artifacts, copy them incrementally and write the
//!     manifest.
//!
//! The first error aborts the run; [`error::Error::exit_code`] gives the
//! process exit code for it.

pub mod archive;
pub mod artifacts;
pub mod context;
pub mod defaults;
pub mod dependencies;
pub mod descriptor;
pub mod error;
pub mod fsutil;
pub mod git;
pub mod manifest;
pub mod phases;
pub mod platform;
pub mod process;
pub mod registry;

#[cfg(test)]
mod artifacts_proptest;
