//! Canonical domain types for the workbench core.

pub mod assignment;
pub mod build;
pub mod device;
pub mod event;
pub mod pins;

pub use assignment::{AssignmentStatus, OtaAssignment};
pub use build::{Build, BuildStatus};
pub use device::Device;
pub use event::{OtaEvent, OtaEventStatus};
pub use pins::{PIN_COUNT, PinBoard, PinDisplay, PinLegend, PinState};
