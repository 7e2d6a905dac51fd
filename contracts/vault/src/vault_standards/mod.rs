//! # Vault Standards Module
//!
//! Share/asset conversion math and NEP-621 style vault events.
//!
//! ## Module Organization
//!
//! - [`core`]: Conversion, preview and limit functions over a vault snapshot
//! - [`events`]: `EVENT_JSON` logging for deposits, withdrawals and approvals
//! - [`mul_div`]: Full-precision multiply-then-divide with explicit rounding

pub mod core;
pub mod events;
pub mod mul_div;

pub use core::*;
