//! # Asset Ledger Interface
//!
//! The narrow surface the vault engine needs from the underlying asset.
//! Calls are addressed by token id so the engine has to name the one token
//! it was configured with.

use near_sdk::AccountId;

use crate::errors::AssetError;

/// Balance queries and transfers on a fungible asset ledger.
///
/// Transfers return `Ok(true)` on success. A ledger for a non-standard token
/// may return `Ok(false)` instead of an error; callers must treat that as a
/// failed transfer. A transfer that returns `Err` or `Ok(false)` must not
/// have moved any tokens.
pub trait AssetLedger {
    /// Returns the balance of `account_id` in `token_id`, or 0 if unknown.
    fn balance_of(&self, token_id: &AccountId, account_id: &AccountId) -> u128;

    /// Moves `amount` from `sender_id` to `receiver_id`.
    fn transfer(
        &mut self,
        token_id: &AccountId,
        sender_id: &AccountId,
        receiver_id: &AccountId,
        amount: u128,
    ) -> Result<bool, AssetError>;

    /// Moves `amount` from `owner_id` to `receiver_id` on behalf of
    /// `spender_id`, consuming the allowance `owner_id` granted to it.
    fn transfer_from(
        &mut self,
        token_id: &AccountId,
        spender_id: &AccountId,
        owner_id: &AccountId,
        receiver_id: &AccountId,
        amount: u128,
    ) -> Result<bool, AssetError>;
}
