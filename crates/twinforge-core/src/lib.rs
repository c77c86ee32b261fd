//! Device/build/OTA reconciliation core for the twinforge workbench.
//!
//! This crate owns the business logic and domain model between
//! `twinforge-api` and UI consumers:
//!
//! - **[`Workbench`]** — Central facade owning the Device, Build, and
//!   Assignment records. Applies user actions (`start_compile`,
//!   `start_assignment`, `confirm_network`) and server responses in a
//!   well-defined order: per-entity sequence numbers guarantee that only
//!   the most recently issued action of each kind is ever reflected,
//!   regardless of network resolution order.
//!
//! - **Pollers** — Cancellable periodic tasks fetching the OTA event feed
//!   and the device status / pin telemetry. Best-effort: failures are
//!   swallowed and retried next tick; stopping a poller discards any
//!   in-flight result.
//!
//! - **[`Snapshot`]** — Immutable read model republished through a
//!   `watch` channel on every change. The pin board is published on a
//!   second channel. Presentation subscribes; it never mutates.
//!
//! - **Domain model** ([`model`]) — `Device`, `Build`, `OtaAssignment`,
//!   the append-only deduplicated `OtaEvent` sequence, and the 40-pin
//!   [`PinBoard`] digital twin with its pure tri-state derivation.

pub mod config;
pub mod error;
pub mod model;
pub mod reconciler;

mod poller;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::WorkbenchConfig;
pub use error::CoreError;
pub use reconciler::{Snapshot, Workbench};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    AssignmentStatus,
    Build,
    BuildStatus,
    Device,
    OtaAssignment,
    OtaEvent,
    OtaEventStatus,
    PIN_COUNT,
    PinBoard,
    PinDisplay,
    PinLegend,
    PinState,
};
