//! # Vault Events
//!
//! NEP-297 event logging for vault operations.
//! Events are emitted as JSON logs prefixed with `EVENT_JSON:`.
//!
//! ## Event Types
//!
//! - `VaultDeposit`: Emitted when assets are deposited into the vault
//! - `VaultWithdraw`: Emitted when assets are withdrawn from the vault
//! - `ShareApproval`: Emitted when a share allowance is set
//!
//! Share mints, burns and transfers use the NEP-141 events from
//! `near-contract-standards` instead.
//!
//! ## Format
//!
//! ```json
//! {
//!   "standard": "nep621",
//!   "version": "1.0.0",
//!   "event": "vault_deposit",
//!   "data": [{ ... }]
//! }
//! ```

use near_sdk::json_types::U128;
use near_sdk::serde::Serialize;
use near_sdk::{env, AccountIdRef};

// ============================================================================
// Event Wrapper
// ============================================================================

/// Top-level event wrapper.
#[derive(Serialize, Debug)]
#[serde(crate = "near_sdk::serde")]
#[serde(tag = "standard")]
#[must_use = "don't forget to `.emit()` this event"]
#[serde(rename_all = "snake_case")]
pub(crate) enum NearEvent<'a> {
    /// NEP-621 vault event container.
    Nep621(Nep621Event<'a>),
}

impl<'a> NearEvent<'a> {
    fn to_json_string(&self) -> String {
        #[allow(clippy::redundant_closure)]
        serde_json::to_string(self)
            .ok()
            .unwrap_or_else(|| env::abort())
    }

    fn to_json_event_string(&self) -> String {
        format!("EVENT_JSON:{}", self.to_json_string())
    }

    /// Logs the event to the NEAR runtime.
    pub(crate) fn emit(self) {
        near_sdk::env::log_str(&self.to_json_event_string());
    }
}

// ============================================================================
// Vault Deposit Event
// ============================================================================

/// Event data for vault deposits.
///
/// Emitted by both `deposit` and `mint` once the assets are pulled and the
/// shares are minted.
#[must_use]
#[derive(Serialize, Debug, Clone)]
#[serde(crate = "near_sdk::serde")]
pub struct VaultDeposit<'a> {
    /// The account that supplied the assets.
    pub sender_id: &'a AccountIdRef,
    /// The account that received the shares.
    pub owner_id: &'a AccountIdRef,
    pub assets: U128,
    pub shares: U128,
}

impl VaultDeposit<'_> {
    pub fn emit(self) {
        Self::emit_many(&[self])
    }

    pub fn emit_many(data: &[VaultDeposit<'_>]) {
        new_621_v1(Nep621EventKind::VaultDeposit(data)).emit()
    }
}

// ============================================================================
// Vault Withdraw Event
// ============================================================================

/// Event data for vault withdrawals.
///
/// Emitted by both `withdraw` and `redeem` after the assets left the vault.
/// A rolled-back payout emits nothing.
#[must_use]
#[derive(Serialize, Debug, Clone)]
#[serde(crate = "near_sdk::serde")]
pub struct VaultWithdraw<'a> {
    /// The account that called the vault.
    pub sender_id: &'a AccountIdRef,
    /// The account that received the assets.
    pub receiver_id: &'a AccountIdRef,
    /// The account whose shares were burned.
    pub owner_id: &'a AccountIdRef,
    pub assets: U128,
    pub shares: U128,
}

impl VaultWithdraw<'_> {
    pub fn emit(self) {
        Self::emit_many(&[self])
    }

    pub fn emit_many(data: &[VaultWithdraw<'_>]) {
        new_621_v1(Nep621EventKind::VaultWithdraw(data)).emit()
    }
}

// ============================================================================
// Share Approval Event
// ============================================================================

/// Event data for share allowance updates.
#[must_use]
#[derive(Serialize, Debug, Clone)]
#[serde(crate = "near_sdk::serde")]
pub struct ShareApproval<'a> {
    pub owner_id: &'a AccountIdRef,
    pub spender_id: &'a AccountIdRef,
    /// The new allowance, replacing the previous one.
    pub amount: U128,
}

impl ShareApproval<'_> {
    pub fn emit(self) {
        new_621_v1(Nep621EventKind::ShareApproval(&[self])).emit()
    }
}

// ============================================================================
// Internal Event Structures
// ============================================================================

#[derive(Serialize, Debug)]
#[serde(crate = "near_sdk::serde")]
pub(crate) struct Nep621Event<'a> {
    version: &'static str,
    #[serde(flatten)]
    event_kind: Nep621EventKind<'a>,
}

#[derive(Serialize, Debug)]
#[serde(crate = "near_sdk::serde")]
#[serde(tag = "event", content = "data")]
#[serde(rename_all = "snake_case")]
#[allow(clippy::enum_variant_names)]
enum Nep621EventKind<'a> {
    VaultDeposit(&'a [VaultDeposit<'a>]),
    VaultWithdraw(&'a [VaultWithdraw<'a>]),
    ShareApproval(&'a [ShareApproval<'a>]),
}

fn new_621<'a>(version: &'static str, event_kind: Nep621EventKind<'a>) -> NearEvent<'a> {
    NearEvent::Nep621(Nep621Event {
        version,
        event_kind,
    })
}

fn new_621_v1(event_kind: Nep621EventKind) -> NearEvent {
    new_621("1.0.0", event_kind)
}
