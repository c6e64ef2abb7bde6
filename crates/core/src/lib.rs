//! EcoSort Core - Domain types
//!
//! This crate contains the fundamental types used across the credit ledger:
//! - `Credits`: Non-negative integer wrapper for credit amounts
//! - `SubscriptionTier`: FREE/PRO/ULTRA subscription levels
//! - `CreditStatus`: Trial-grant progression state machine
//! - `PoolKind`: The three independently-tracked credit pools

pub mod credits;
pub mod pool;
pub mod status;
pub mod tier;

pub use credits::Credits;
pub use pool::PoolKind;
pub use status::CreditStatus;
pub use tier::SubscriptionTier;
