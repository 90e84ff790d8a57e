//! # Native Deps CLI
//!
//! This is the binary entry point for the `native-deps` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Initialising logging.
//! - Reporting the first error and exiting with the code that identifies it.
//!
//! The core application logic is defined in the `lib.rs` library crate, ensuring
//! that the binary is a thin wrapper around the reusable library functionality.

mod cli;

use clap::Parser;
use log::error;

use native_deps::error::Error;

/// Exit code for failures that are not a pipeline [`Error`].
const GENERAL_FAILURE: i32 = 1;

fn main() {
    let cli = cli::Cli::parse();
    cli.init_logging();

    if let Err(err) = cli.execute() {
        error!("{:#}", err);
        std::process::exit(exit_code(&err));
    }
}

fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<Error>()
        .map(Error::exit_code)
        .unwrap_or(GENERAL_FAILURE)
}
