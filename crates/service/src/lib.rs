//! EcoSort Credit Service
//!
//! The operation surface callers use: AI-feature handlers call
//! [`CreditService::deduct`], the billing webhook calls the monthly and
//! purchase grants, the ad-reward callback calls the ad-watch bonus, and
//! the trial grants run behind the four-layer eligibility gate.
//!
//! ## Commit discipline
//!
//! Every operation is one atomic read-modify-write against the user's
//! record (optimistic compare-and-swap with bounded retry). The journal
//! append and the device/IP registry updates happen strictly after the
//! ledger commit: losing them under-counts abuse signals, which is
//! tolerable; the reverse order could mint registry state for a commit
//! that never happened.

pub mod clock;
pub mod error;
pub mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::ServiceError;
pub use service::{CreditService, DeductOutcome, GrantOutcome};
