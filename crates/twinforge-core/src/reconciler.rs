// ── Workbench: the device/build/OTA reconciler ──
//
// Owns the Device, Build, and Assignment records plus the observed OTA
// event sequence, and applies user actions and server responses in a
// well-defined order. Single-writer discipline: clients and pollers
// return data, only this module mutates state. Every mutation is applied
// atomically under the state lock and republished as an immutable
// snapshot through a watch channel.

use std::collections::HashSet;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard};

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use twinforge_api::models::OtaEventRecord;
use twinforge_api::{BackendClient, CompileSuccess, TransportConfig};

use crate::config::WorkbenchConfig;
use crate::error::CoreError;
use crate::model::event::EventKey;
use crate::model::{
    AssignmentStatus, Build, BuildStatus, Device, OtaAssignment, OtaEvent, PinBoard,
};
use crate::poller;

// ── Snapshot ─────────────────────────────────────────────────────────

/// Immutable read model republished on every state change.
///
/// Presentation renders this; it never mutates it. `assignment` reflects
/// "request accepted by the server", `events` reflects "outcome observed
/// on the device" -- the two come from different trust/latency domains
/// and are never reconciled against each other.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Snapshot {
    pub device: Device,
    pub build: Build,
    pub assignment: Option<OtaAssignment>,
    pub events: Vec<OtaEvent>,
}

// ── Workbench ────────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<WorkbenchInner>`. [`start()`](Self::start)
/// spawns the background pollers; actions (`start_compile`,
/// `start_assignment`, `confirm_network`, the refresh calls) can be used
/// with or without them.
#[derive(Clone)]
pub struct Workbench {
    inner: Arc<WorkbenchInner>,
}

struct WorkbenchInner {
    config: WorkbenchConfig,
    client: BackendClient,
    state: StdMutex<WorkbenchState>,
    snapshot_tx: watch::Sender<Arc<Snapshot>>,
    pins_tx: watch::Sender<Arc<PinBoard>>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

struct WorkbenchState {
    device: Device,
    build: Build,
    assignment: Option<OtaAssignment>,
    events: Vec<OtaEvent>,
    seen_events: HashSet<EventKey>,
    pins: PinBoard,
    /// Issue counters for supersession: a resolution is applied only if
    /// its sequence number still matches the latest issued action of its
    /// kind. Arrival order is irrelevant.
    compile_seq: u64,
    assign_seq: u64,
}

impl WorkbenchState {
    fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            device: self.device.clone(),
            build: self.build.clone(),
            assignment: self.assignment.clone(),
            events: self.events.clone(),
        }
    }
}

impl Workbench {
    /// Create a workbench for the configured device. Does NOT poll --
    /// call [`start()`](Self::start) to spawn the background tasks.
    pub fn new(config: WorkbenchConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: config.tls.clone(),
            timeout: config.timeout,
        };
        let client = BackendClient::new(config.base_url.as_str(), &transport)?;
        if let Some(ref token) = config.token {
            client.set_token(token.clone());
        }

        let state = WorkbenchState {
            device: Device::unknown(config.device_id.clone()),
            build: Build::idle(),
            assignment: None,
            events: Vec::new(),
            seen_events: HashSet::new(),
            pins: PinBoard::new(),
            compile_seq: 0,
            assign_seq: 0,
        };
        let (snapshot_tx, _) = watch::channel(Arc::new(state.to_snapshot()));
        let (pins_tx, _) = watch::channel(Arc::new(state.pins.clone()));

        Ok(Self {
            inner: Arc::new(WorkbenchInner {
                config,
                client,
                state: StdMutex::new(state),
                snapshot_tx,
                pins_tx,
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        })
    }

    /// Access the workbench configuration.
    pub fn config(&self) -> &WorkbenchConfig {
        &self.inner.config
    }

    /// The underlying backend client (for out-of-band calls like `health`).
    pub fn client(&self) -> &BackendClient {
        &self.inner.client
    }

    // ── Read model ───────────────────────────────────────────────────

    /// The current snapshot (cheap `Arc` clone).
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.snapshot_tx.borrow().clone()
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.inner.snapshot_tx.subscribe()
    }

    /// The current pin board (cheap `Arc` clone).
    pub fn pins(&self) -> Arc<PinBoard> {
        self.inner.pins_tx.borrow().clone()
    }

    /// Subscribe to pin board changes.
    pub fn subscribe_pins(&self) -> watch::Receiver<Arc<PinBoard>> {
        self.inner.pins_tx.subscribe()
    }

    // ── Poller lifecycle ─────────────────────────────────────────────

    /// Spawn the OTA event poller and the status/telemetry poller.
    ///
    /// Intervals of zero disable the corresponding task.
    pub async fn start(&self) {
        let cancel = self.inner.cancel.child_token();
        let mut handles = self.inner.task_handles.lock().await;

        let ota_interval = self.inner.config.ota_poll_interval;
        if !ota_interval.is_zero() {
            handles.push(tokio::spawn(poller::event_poll_task(
                self.clone(),
                ota_interval,
                cancel.clone(),
            )));
        }

        let status_interval = self.inner.config.status_poll_interval;
        if !status_interval.is_zero() {
            handles.push(tokio::spawn(poller::status_poll_task(
                self.clone(),
                status_interval,
                cancel,
            )));
        }

        info!(device = %self.inner.config.device_id, "workbench pollers started");
    }

    /// Stop the pollers: no further tick fires, and any in-flight fetch
    /// has its result discarded.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("workbench pollers stopped");
    }

    // ── Actions ──────────────────────────────────────────────────────

    /// Compile `source` remotely and fold the outcome into Build state.
    ///
    /// Blank-after-trim input fails synchronously with
    /// [`CoreError::EmptyInput`]; nothing is sent and the current Build is
    /// untouched. Otherwise the prior Build is discarded, status becomes
    /// `Compiling`, and on resolution `Succeeded`/`Failed` is applied --
    /// unless a newer compile was issued meanwhile, in which case the
    /// stale resolution is dropped.
    pub async fn start_compile(&self, source: &str) -> Result<(), CoreError> {
        let seq = self.begin_compile(source)?;
        let outcome = self.inner.client.compile(source).await;
        self.apply_compile_outcome(seq, outcome);
        Ok(())
    }

    /// Guarded entry: validates, replaces the Build record, and returns
    /// the sequence number of this issuance.
    fn begin_compile(&self, source: &str) -> Result<u64, CoreError> {
        if source.trim().is_empty() {
            return Err(CoreError::EmptyInput);
        }

        let mut state = self.lock_state();
        state.compile_seq += 1;
        state.build = Build::compiling(source);
        debug!(seq = state.compile_seq, "compile issued");
        self.publish_snapshot(&state);
        Ok(state.compile_seq)
    }

    fn apply_compile_outcome(
        &self,
        seq: u64,
        outcome: Result<CompileSuccess, twinforge_api::Error>,
    ) {
        let mut state = self.lock_state();
        if state.compile_seq != seq {
            debug!(
                seq,
                latest = state.compile_seq,
                "dropping superseded compile resolution"
            );
            return;
        }

        match outcome {
            Ok(success) => {
                state.build.status = BuildStatus::Succeeded;
                state.build.id = Some(success.build_id);
                state.build.logs = success.logs;
            }
            Err(twinforge_api::Error::CompileRejected { logs }) => {
                state.build.status = BuildStatus::Failed;
                state.build.id = None;
                state.build.logs = logs;
            }
            Err(err) => {
                state.build.status = BuildStatus::Failed;
                state.build.id = None;
                state.build.logs = err.to_string();
            }
        }
        self.publish_snapshot(&state);
    }

    /// Request OTA delivery of the current build to `device_id`.
    ///
    /// Fails synchronously with [`CoreError::NoBuildAvailable`] (zero
    /// network calls) unless the current Build succeeded and carries a
    /// server-issued id. A newer assignment supersedes this one; stale
    /// resolutions are dropped, mirroring the compile path.
    pub async fn start_assignment(&self, device_id: &str) -> Result<(), CoreError> {
        let (seq, build_id) = self.begin_assignment(device_id)?;
        let outcome = self.inner.client.assign_build(device_id, &build_id).await;
        self.apply_assign_outcome(seq, outcome);
        Ok(())
    }

    fn begin_assignment(&self, device_id: &str) -> Result<(u64, String), CoreError> {
        let mut state = self.lock_state();
        let Some(build_id) = state.build.assignable_id().map(str::to_owned) else {
            return Err(CoreError::NoBuildAvailable);
        };

        state.assign_seq += 1;
        state.assignment = Some(OtaAssignment::requested(device_id, &build_id));
        debug!(seq = state.assign_seq, build_id = %build_id, "assignment issued");
        self.publish_snapshot(&state);
        Ok((state.assign_seq, build_id))
    }

    fn apply_assign_outcome(&self, seq: u64, outcome: Result<(), twinforge_api::Error>) {
        let mut state = self.lock_state();
        if state.assign_seq != seq {
            debug!(
                seq,
                latest = state.assign_seq,
                "dropping superseded assignment resolution"
            );
            return;
        }

        if let Some(assignment) = state.assignment.as_mut() {
            match outcome {
                Ok(()) => {
                    assignment.status = AssignmentStatus::Assigned;
                    assignment.reason = None;
                }
                Err(err) => {
                    assignment.status = AssignmentStatus::Failed;
                    assignment.reason = Some(match err {
                        twinforge_api::Error::AssignRejected { message } => message,
                        other => other.to_string(),
                    });
                }
            }
        }
        self.publish_snapshot(&state);
    }

    /// Tell the backend the operator verified the device shares our
    /// Wi-Fi network, and reflect the confirmation locally.
    pub async fn confirm_network(&self) -> Result<(), CoreError> {
        self.inner
            .client
            .confirm_network(&self.inner.config.device_id)
            .await?;

        let mut state = self.lock_state();
        state.device.network_confirmed = true;
        self.publish_snapshot(&state);
        Ok(())
    }

    // ── Refresh (fed by the status poller, callable directly) ────────

    /// Fetch the device status and fold it into the Device record.
    pub async fn refresh_device(&self) -> Result<Device, CoreError> {
        let status = self
            .inner
            .client
            .device_status(&self.inner.config.device_id)
            .await?;

        let mut state = self.lock_state();
        state.device.apply_status(&status);
        self.publish_snapshot(&state);
        Ok(state.device.clone())
    }

    /// Fetch the pin telemetry snapshot and recompute the pin board.
    ///
    /// Pin state is independent of the online flag: a device that just
    /// went offline keeps its last reported pins.
    pub async fn refresh_pins(&self) -> Result<Arc<PinBoard>, CoreError> {
        let twin = self
            .inner
            .client
            .digital_twin(&self.inner.config.device_id)
            .await?;

        let mut state = self.lock_state();
        state.pins.apply_snapshot(&twin.pins);
        let board = Arc::new(state.pins.clone());
        self.inner.pins_tx.send_modify(|p| *p = Arc::clone(&board));
        Ok(board)
    }

    // ── Event ingestion (fed by the event poller) ────────────────────

    /// Merge fetched OTA events into the observed sequence.
    ///
    /// Append-only and idempotent: records are keyed by
    /// `(device_id, build_id, timestamp)`, already-seen keys are skipped,
    /// and events a later fetch omits are never dropped. Assignment state
    /// is never touched here. Returns how many events were new.
    pub fn ingest_events(&self, records: Vec<OtaEventRecord>) -> usize {
        let mut state = self.lock_state();
        let mut added = 0;

        for record in records {
            let event = OtaEvent::from(record);
            if state.seen_events.insert(event.key()) {
                state.events.push(event);
                added += 1;
            }
        }

        if added > 0 {
            self.publish_snapshot(&state);
        }
        added
    }

    // ── Internals ────────────────────────────────────────────────────

    fn lock_state(&self) -> MutexGuard<'_, WorkbenchState> {
        self.inner.state.lock().expect("state lock poisoned")
    }

    /// Republish the read model. Called with the state lock held so the
    /// snapshot can never interleave with a concurrent mutation.
    fn publish_snapshot(&self, state: &WorkbenchState) {
        // `send_modify` updates unconditionally, even with zero receivers.
        let snapshot = Arc::new(state.to_snapshot());
        self.inner.snapshot_tx.send_modify(|s| *s = snapshot);
    }
}
