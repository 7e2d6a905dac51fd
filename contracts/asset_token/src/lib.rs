//! # Asset Token Ledger
//!
//! A role-gated fungible token ledger used as the underlying asset of the
//! share vault. One [`TokenRegistry`] can hold several tokens, each keyed by
//! its own `AccountId`, so a vault can be shown tokens it must ignore.
//!
//! ## Modules
//!
//! - [`ledger`]: The [`AssetLedger`] trait consumed by the vault engine
//! - [`registry`]: [`TokenRegistry`], the storage-backed implementation
//! - [`roles`]: Role tags checked before privileged mutations
//! - [`errors`]: [`AssetError`]

pub mod errors;
pub mod ledger;
pub mod registry;
pub mod roles;

pub use errors::AssetError;
pub use ledger::AssetLedger;
pub use registry::TokenRegistry;
pub use roles::Role;
