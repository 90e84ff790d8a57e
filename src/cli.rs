//! CLI argument parsing and run setup

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use native_deps::context::{RunContext, RunOptions, RunRoots};
use native_deps::defaults;
use native_deps::phases::orchestrator;
use native_deps::phases::{Command, CommandSet};
use native_deps::platform::Platform;
use native_deps::registry::Registry;

/// Native dependency builder - fetch, build and deploy external libraries
#[derive(Parser, Debug)]
#[command(name = "native-deps")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Commands to run for every selected library
    #[arg(value_enum, required = true, value_name = "COMMAND")]
    commands: Vec<Command>,

    /// Platform to build for
    #[arg(short, long, value_enum)]
    platform: Platform,

    /// Only work on this library (repeatable); others stay available as dependencies
    #[arg(short = 'l', long = "lib", value_name = "NAME")]
    libs: Vec<String>,

    /// Root directory (defaults to the current directory)
    #[arg(long, value_name = "PATH", env = "NATIVE_DEPS_ROOT")]
    root: Option<PathBuf>,

    /// Source directory (defaults to <root>/.src)
    #[arg(long = "src", value_name = "PATH")]
    source: Option<PathBuf>,

    /// Build directory (defaults to <root>/.build)
    #[arg(long, value_name = "PATH")]
    build: Option<PathBuf>,

    /// Output directory (defaults to <root>/.out)
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Override files for patched libraries (defaults to <root>/hacks)
    #[arg(long, value_name = "PATH")]
    hacks: Option<PathBuf>,

    /// Registry file to use instead of the built-in one
    #[arg(long, value_name = "FILE", env = "NATIVE_DEPS_REGISTRY")]
    registry: Option<PathBuf>,

    /// Parallel build jobs (defaults to the number of CPUs)
    #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    jobs: Option<u16>,

    /// Do not strip debug symbols from deployed libraries
    #[arg(long)]
    no_strip: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: String,

    /// Shortcut for --log-level debug
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Initialise logging. `RUST_LOG` wins over the command line when set.
    pub fn init_logging(&self) {
        let level = if self.verbose {
            "debug"
        } else {
            self.log_level.as_str()
        };
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
            .format_target(false)
            .try_init();
    }

    /// Execute the selected commands
    pub fn execute(self) -> Result<()> {
        let start_time = Instant::now();

        let registry = match &self.registry {
            Some(path) => Registry::from_file(path)
                .with_context(|| format!("Failed to load registry '{}'", path.display()))?,
            None => Registry::builtin()?,
        };

        let roots = RunRoots::resolve(
            self.root.as_deref(),
            self.source.as_deref(),
            self.build.as_deref(),
            self.output.as_deref(),
            self.hacks.as_deref(),
        )?;
        let commands: CommandSet = self.commands.iter().copied().collect();

        info!("Platform: {}", self.platform);
        info!("Commands: {}", commands);
        info!("Root path: '{}'", roots.root.display());
        info!("Source path: '{}'", roots.source.display());
        info!("Build path: '{}'", roots.build.display());
        info!("Output path: '{}'", roots.output.display());
        if !self.libs.is_empty() {
            info!("Library filter: {}", self.libs.join(", "));
        }

        orchestrator::report_ordering(&registry, self.platform);
        roots.create_all()?;

        let options = RunOptions {
            jobs: self
                .jobs
                .map(usize::from)
                .unwrap_or_else(defaults::default_jobs),
            strip_symbols: !self.no_strip,
            ..RunOptions::default()
        };
        let ctx = RunContext::new(&registry, self.platform, roots, self.libs, options)?;

        orchestrator::execute(&ctx, &commands)?;

        info!("Finished in {:.2?}", start_time.elapsed());
        Ok(())
    }
}
