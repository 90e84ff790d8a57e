//! Orchestrator for a complete run
//!
//! Runs the selected commands over every active library of a [`RunContext`],
//! one library at a time in registry order. For each library the stages run
//! in a fixed order no matter how the commands were given:
//!
//! purge, clone or pull, revision check, clean, configure, build, deploy,
//! package.
//!
//! The first error stops the run. Nothing is rolled back; every stage is
//! idempotent, so re-running after a fix picks up where the run failed.

use log::{info, warn};

use super::{build, clean, configure, deploy, fetch, Command, CommandSet};
use crate::context::{LibraryRecord, RunContext};
use crate::error::Result;
use crate::platform::Platform;
use crate::registry::{OrderingIssue, Registry};

/// What the run did for one library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryOutcome {
    pub name: String,
    pub fetch: Option<fetch::FetchReport>,
    pub revision: Option<fetch::Revision>,
    pub deploy: Option<deploy::DeployReport>,
}

/// Execute `commands` for every active library of `ctx`.
pub fn execute(ctx: &RunContext, commands: &CommandSet) -> Result<Vec<LibraryOutcome>> {
    if commands.is_empty() {
        warn!("No commands given, nothing to do");
        return Ok(Vec::new());
    }

    let mut outcomes = Vec::new();
    for record in ctx.active() {
        info!("Processing library '{}'", record.name());
        outcomes.push(execute_library(ctx, record, commands)?);
    }

    info!("Processed {} libraries", outcomes.len());
    Ok(outcomes)
}

fn execute_library(
    ctx: &RunContext,
    record: &LibraryRecord,
    commands: &CommandSet,
) -> Result<LibraryOutcome> {
    let mut outcome = LibraryOutcome {
        name: record.name().to_string(),
        fetch: None,
        revision: None,
        deploy: None,
    };

    if commands.contains(Command::Purge) {
        clean::purge(ctx, record)?;
    }

    if commands.contains(Command::Clone) {
        outcome.fetch = Some(fetch::execute(ctx, record, fetch::FetchMode::CloneMissing)?);
    } else if commands.contains(Command::Pull) {
        outcome.fetch = Some(fetch::execute(ctx, record, fetch::FetchMode::Synchronize)?);
    }

    if commands.needs_sources() {
        outcome.revision = Some(fetch::verify(record)?);
    }

    if commands.contains(Command::Clean) {
        clean::clean(ctx, record)?;
    }
    if commands.contains(Command::Configure) {
        configure::execute(ctx, record)?;
    }
    if commands.contains(Command::Build) {
        build::execute(ctx, record)?;
    }

    if commands.contains(Command::Deploy) {
        if let Some(revision) = &outcome.revision {
            outcome.deploy = Some(deploy::execute(ctx, record, revision)?);
        }
    }

    if commands.contains(Command::Package) {
        warn!(
            "Command 'package' is not implemented, skipping library '{}'",
            record.name()
        );
    }

    Ok(outcome)
}

/// Log every dependency the declaration order does not satisfy on
/// `platform`. Returns the number of issues found.
pub fn report_ordering(registry: &Registry, platform: Platform) -> usize {
    let issues = registry.ordering_issues(platform);
    for issue in &issues {
        match issue {
            OrderingIssue::DeclaredLater {
                library,
                dependency,
            } => warn!(
                "Library '{}' depends on '{}', which is declared after it",
                library, dependency
            ),
            OrderingIssue::Unknown {
                library,
                dependency,
            } => warn!(
                "Library '{}' depends on '{}', which is not declared for '{}'",
                library, dependency, platform
            ),
        }
    }
    issues.len()
}
