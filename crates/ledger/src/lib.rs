//! EcoSort Credit Ledger
//!
//! Per-user balances made of three differently-expiring pools, consumed in
//! fixed priority order to pay for metered AI operations.
//!
//! ## Key Components
//!
//! - [`config::CreditPolicy`] - Grant amounts, expiry windows, thresholds
//! - [`balance::CreditBalance`] - Three pools plus the derived total
//! - [`grants::GrantEngine`] - The four grant kinds, each with its own
//!   precondition set doubling as an idempotency guard
//! - [`deduction`] - Priority consumption: trial, then monthly, then purchase
//! - [`store::BalanceStore`] - Per-user optimistic compare-and-swap seam,
//!   with in-memory and JSON-file implementations
//!
//! ## Invariant
//!
//! After every operation, `total == trial + monthly + purchase`. The total
//! is recomputed on every write and never drifts independently.

pub mod balance;
pub mod config;
pub mod deduction;
pub mod error;
pub mod grants;
pub mod json;
pub mod memory;
pub mod store;

pub use balance::{AdWatchBonus, CreditBalance, MonthlyPool, PurchasePool, TrialPool};
pub use config::CreditPolicy;
pub use deduction::{deduct, DeductionBreakdown};
pub use error::{DeductionError, GrantError, StoreError, StoreResult};
pub use grants::GrantEngine;
pub use json::JsonStore;
pub use memory::MemoryStore;
pub use store::{BalanceStore, UserRecord, SCHEMA_VERSION};
