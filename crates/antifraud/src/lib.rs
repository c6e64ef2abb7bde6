//! EcoSort Anti-abuse Layer
//!
//! Guards trial-family credit grants against multi-account farming across
//! devices and IP addresses.
//!
//! ## Key Components
//!
//! - [`config::GatePolicy`] - Configurable thresholds (not hardcoded)
//! - [`state::AntifraudState`] - Per-user fraud-relevant account state
//! - [`device::DeviceRegistry`] - Per-device login history and trial claims
//! - [`ip::IpRegistry`] - Per-IP rolling 24-hour signup window
//! - [`gate::EligibilityGate`] - Four ordered barriers, first failure wins
//!
//! The registries are advisory signals for the gate, never the source of
//! truth for spendable value; their updates trail the ledger commit.

pub mod config;
pub mod device;
pub mod error;
pub mod gate;
pub mod ip;
pub mod state;

pub use config::GatePolicy;
pub use device::{DeviceRecord, DeviceRegistry};
pub use error::AntifraudError;
pub use gate::{EligibilityGate, GateDenial, GateLayer};
pub use ip::{IpRecord, IpRegistry};
pub use state::AntifraudState;
