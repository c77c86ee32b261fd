//! Compile-and-assign command handler.

use std::time::Duration;

use twinforge_core::{AssignmentStatus, OtaEvent, Workbench};

use crate::cli::{DeployArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::compile;

pub async fn handle(
    workbench: &Workbench,
    args: DeployArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let source = compile::read_source(&args.source)?;
    let build_id = compile::run_compile(workbench, &source, global).await?;
    output::print_output(&format!("build {build_id}"), global.quiet);

    let device_id = workbench.config().device_id.clone();
    workbench.start_assignment(&device_id).await?;

    let assignment = workbench
        .snapshot()
        .assignment
        .clone()
        .ok_or_else(|| CliError::ApiError {
            message: "assignment record missing after request".into(),
        })?;

    match assignment.status {
        AssignmentStatus::Assigned => {
            output::print_output(
                &format!("OTA assigned: {build_id} -> {device_id}; device will poll shortly"),
                global.quiet,
            );
        }
        _ => {
            return Err(CliError::AssignmentFailed {
                reason: assignment
                    .reason
                    .unwrap_or_else(|| "assignment not accepted".into()),
            });
        }
    }

    if let Some(wait_secs) = args.wait {
        match wait_for_outcome(workbench, &build_id, wait_secs).await {
            Some(event) => output::print_output(
                &format!(
                    "device reported {} for {build_id}{}",
                    event.status,
                    event
                        .reason
                        .map_or_else(String::new, |r| format!(" ({r})"))
                ),
                global.quiet,
            ),
            None => output::print_output(
                &format!("no device-side event for {build_id} within {wait_secs}s"),
                global.quiet,
            ),
        }
    }
    Ok(())
}

/// Run the pollers until an OTA event for `build_id` shows up, or the
/// deadline passes.
async fn wait_for_outcome(
    workbench: &Workbench,
    build_id: &str,
    wait_secs: u64,
) -> Option<OtaEvent> {
    let mut rx = workbench.subscribe();
    workbench.start().await;

    let outcome = tokio::time::timeout(Duration::from_secs(wait_secs), async {
        loop {
            {
                let snapshot = rx.borrow_and_update();
                if let Some(event) = snapshot.events.iter().rev().find(|e| e.build_id == build_id)
                {
                    break event.clone();
                }
            }
            if rx.changed().await.is_err() {
                // Sender dropped; park until the timeout fires.
                std::future::pending::<()>().await;
            }
        }
    })
    .await
    .ok();

    workbench.shutdown().await;
    outcome
}
