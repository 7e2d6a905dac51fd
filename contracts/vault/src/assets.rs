//! # Asset Ledger Methods
//!
//! Contract surface for the hosted [`asset_token::TokenRegistry`]. Every
//! call acts on behalf of the predecessor account; role checks happen inside
//! the registry. State-changing calls need at least 1 yoctoNEAR attached and
//! pay for any storage they add.

use asset_token::{AssetLedger, Role};
use near_sdk::json_types::U128;
use near_sdk::{env, near, AccountId};

use crate::{unwrap_or_panic, Contract, ContractExt};

#[near]
impl Contract {
    /// Registers a new asset token with its initial admin and minter.
    ///
    /// # Panics
    ///
    /// Panics if the caller is not the contract owner or the token exists.
    #[payable]
    pub fn create_asset(&mut self, token_id: AccountId, admin_id: AccountId, minter_id: AccountId) {
        self.require_owner();
        self.charge_storage(|this| {
            unwrap_or_panic(this.assets.create_token(token_id, &admin_id, &minter_id))
        });
    }

    /// Grants `role` on `token_id`. The caller must be an admin of the token.
    #[payable]
    pub fn grant_role(&mut self, token_id: AccountId, role: Role, account_id: AccountId) {
        let caller = env::predecessor_account_id();
        self.charge_storage(|this| {
            unwrap_or_panic(this.assets.grant_role(&token_id, &caller, role, &account_id))
        });
    }

    /// Revokes `role` on `token_id`. The caller must be an admin of the token.
    #[payable]
    pub fn revoke_role(&mut self, token_id: AccountId, role: Role, account_id: AccountId) {
        let caller = env::predecessor_account_id();
        self.charge_storage(|this| {
            unwrap_or_panic(this.assets.revoke_role(&token_id, &caller, role, &account_id))
        });
    }

    /// Mints `amount` of `token_id` to `account_id`. The caller must be a
    /// minter of the token.
    #[payable]
    pub fn asset_mint(&mut self, token_id: AccountId, account_id: AccountId, amount: U128) {
        let caller = env::predecessor_account_id();
        self.charge_storage(|this| {
            unwrap_or_panic(this.assets.mint(&token_id, &caller, &account_id, amount.0))
        });
    }

    /// Burns `amount` of `token_id` from the caller's own balance. The caller
    /// must be a minter of the token.
    #[payable]
    pub fn asset_burn(&mut self, token_id: AccountId, amount: U128) {
        let caller = env::predecessor_account_id();
        self.charge_storage(|this| unwrap_or_panic(this.assets.burn(&token_id, &caller, amount.0)));
    }

    #[payable]
    pub fn asset_transfer(&mut self, token_id: AccountId, receiver_id: AccountId, amount: U128) -> bool {
        let sender_id = env::predecessor_account_id();
        self.charge_storage(|this| {
            unwrap_or_panic(
                this.assets
                    .transfer(&token_id, &sender_id, &receiver_id, amount.0),
            )
        })
    }

    #[payable]
    pub fn asset_approve(&mut self, token_id: AccountId, spender_id: AccountId, amount: U128) {
        let owner_id = env::predecessor_account_id();
        self.charge_storage(|this| {
            unwrap_or_panic(
                this.assets
                    .approve(&token_id, &owner_id, &spender_id, amount.0),
            )
        });
    }

    /// Moves `amount` of `token_id` from `owner_id` to `receiver_id`,
    /// spending the caller's allowance.
    #[payable]
    pub fn asset_transfer_from(
        &mut self,
        token_id: AccountId,
        owner_id: AccountId,
        receiver_id: AccountId,
        amount: U128,
    ) -> bool {
        let spender_id = env::predecessor_account_id();
        self.charge_storage(|this| {
            unwrap_or_panic(this.assets.transfer_from(
                &token_id,
                &spender_id,
                &owner_id,
                &receiver_id,
                amount.0,
            ))
        })
    }

    // ==================== View Methods ====================

    pub fn asset_balance_of(&self, token_id: AccountId, account_id: AccountId) -> U128 {
        U128(self.assets.balance_of(&token_id, &account_id))
    }

    pub fn asset_allowance(&self, token_id: AccountId, owner_id: AccountId, spender_id: AccountId) -> U128 {
        U128(self.assets.allowance(&token_id, &owner_id, &spender_id))
    }

    pub fn asset_total_supply(&self, token_id: AccountId) -> U128 {
        U128(self.assets.total_supply(&token_id))
    }

    pub fn has_role(&self, token_id: AccountId, role: Role, account_id: AccountId) -> bool {
        self.assets.has_role(&token_id, role, &account_id)
    }
}
