//! Direct OTA assignment command handler.
//!
//! Assigns a build id from an earlier `compile` run. This goes through
//! the backend client directly: a fresh CLI process has no in-memory
//! Build record for the workbench to validate against.

use twinforge_core::Workbench;

use crate::cli::{AssignArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    workbench: &Workbench,
    args: AssignArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let device_id = &workbench.config().device_id;

    workbench
        .client()
        .assign_build(device_id, &args.build_id)
        .await
        .map_err(|err| match err {
            twinforge_api::Error::AssignRejected { message } => {
                CliError::AssignmentFailed { reason: message }
            }
            other => other.into(),
        })?;

    output::print_output(
        &format!(
            "OTA assigned: {} -> {device_id}; device will poll shortly",
            args.build_id
        ),
        global.quiet,
    );
    Ok(())
}
