// twinforge-api: Async Rust client for the twinforge workbench backend

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::{BackendClient, CompileSuccess};
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
