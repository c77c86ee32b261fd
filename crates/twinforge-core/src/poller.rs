// ── Background pollers ──
//
// The backend has no push channel: device-side OTA outcomes and live
// telemetry only ever arrive by polling. Both tasks are best-effort --
// a failed fetch is logged at debug level and retried on the next tick,
// with no backoff, since an empty result and a transient failure are
// indistinguishable and both resolve by the next tick.
//
// Cancellation discipline: the token is checked before each tick AND
// raced against the in-flight fetch, so stopping a poller both prevents
// future ticks and discards the result of any request already on the
// wire.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::reconciler::Workbench;

/// Periodically fetch the OTA event feed and merge it into the observed
/// sequence.
pub(crate) async fn event_poll_task(
    workbench: Workbench,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    fetched = workbench.client().list_ota_events() => match fetched {
                        Ok(records) => {
                            let added = workbench.ingest_events(records);
                            if added > 0 {
                                debug!(added, "event_poll: merged new OTA events");
                            }
                        }
                        Err(e) => {
                            debug!(error = %e, "event_poll: fetch failed");
                        }
                    }
                }
            }
        }
    }
}

/// Periodically refresh the device status and the pin telemetry snapshot.
pub(crate) async fn status_poll_task(
    workbench: Workbench,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    refreshed = workbench.refresh_device() => {
                        if let Err(e) = refreshed {
                            debug!(error = %e, "status_poll: device fetch failed");
                        }
                    }
                }

                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    refreshed = workbench.refresh_pins() => {
                        if let Err(e) = refreshed {
                            debug!(error = %e, "status_poll: telemetry fetch failed");
                        }
                    }
                }
            }
        }
    }
}
