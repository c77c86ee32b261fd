//! OTA event feed command handler.

use tabled::Tabled;

use twinforge_core::{OtaEvent, Workbench};

use crate::cli::{EventsArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct EventRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Build")]
    build: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

impl From<&OtaEvent> for EventRow {
    fn from(event: &OtaEvent) -> Self {
        Self {
            time: event.timestamp.to_rfc3339(),
            device: event.device_id.clone(),
            build: event.build_id.clone(),
            status: event.status.to_string(),
            reason: event.reason.clone().unwrap_or_default(),
        }
    }
}

fn plain_line(event: &OtaEvent) -> String {
    format!(
        "{} {} {} {}",
        event.timestamp.to_rfc3339(),
        event.build_id,
        event.status,
        event.reason.as_deref().unwrap_or("-")
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    workbench: &Workbench,
    args: EventsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    // Seed with one direct fetch so `events` works without the pollers.
    let records = workbench.client().list_ota_events().await?;
    workbench.ingest_events(records);

    let events = workbench.snapshot().events.clone();
    let rendered = output::render_list(&global.output, &events, |e| EventRow::from(e), plain_line);
    output::print_output(&rendered, global.quiet);

    if args.follow {
        follow(workbench, events.len(), global).await;
    }
    Ok(())
}

/// Keep the event poller running, printing events as they are observed,
/// until interrupted.
async fn follow(workbench: &Workbench, mut printed: usize, global: &GlobalOpts) {
    let mut rx = workbench.subscribe();
    workbench.start().await;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = rx.borrow_and_update().clone();
                for event in snapshot.events.iter().skip(printed) {
                    output::print_output(&plain_line(event), global.quiet);
                }
                printed = snapshot.events.len();
            }
        }
    }

    workbench.shutdown().await;
}
