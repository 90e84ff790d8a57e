//! Build stage: run a library's build tool.

use log::info;

use crate::context::{LibraryRecord, RunContext};
use crate::error::Result;
use crate::fsutil::make_directory;
use crate::process::{split_template, Invocation};

pub fn execute(ctx: &RunContext, record: &LibraryRecord) -> Result<()> {
    make_directory(&record.build_dir)?;

    match plan(ctx, record)? {
        Some(invocation) => invocation.run(),
        None => {
            info!("Library '{}' does not require building", record.name());
            Ok(())
        }
    }
}

/// The build command for `record`, or `None` when it has no build tool.
///
/// On platforms that need it, a parallelism flag for the configured job
/// count is appended to the declared build arguments.
pub fn plan(ctx: &RunContext, record: &LibraryRecord) -> Result<Option<Invocation>> {
    let Some(tool) = record.descriptor.build_tool else {
        return Ok(None);
    };

    let args = record.descriptor.build_args(ctx.platform)?;
    let invocation = Invocation::new(tool.program(), record.work_dir())
        .args(split_template(args, &[]))
        .args(tool.parallel_args(ctx.platform, ctx.options.jobs));
    Ok(Some(invocation))
}
