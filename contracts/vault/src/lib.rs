//! # Tokenized Vault Contract
//!
//! A NEAR smart contract that pools one underlying asset and issues
//! transferable shares representing a proportional claim on it.
//!
//! - **Vault Operations**: `deposit`/`mint` exchange assets for shares,
//!   `withdraw`/`redeem` exchange shares back for assets
//! - **Share Ledger**: NEP-141 style balances plus ERC-20 style allowances
//! - **Asset Ledger**: role-gated fungible tokens hosted by the same contract,
//!   so every vault operation settles within a single receipt
//!
//! ## Architecture
//!
//! - [`vault`]: Conversion engine (pricing, rounding, CEI ordering)
//! - [`shares`]: NEP-141 share token, allowances, mint and burn
//! - [`assets`]: Contract methods for the hosted asset ledger
//! - [`storage`]: Storage charging for calls that allocate state
//! - [`errors`]: Error types for the vault engine
//! - [`vault_standards`]: Conversion math, previews and NEP-621 events

use asset_token::TokenRegistry;
use near_contract_standards::fungible_token::metadata::{
    FungibleTokenMetadata, FungibleTokenMetadataProvider,
};
use near_contract_standards::fungible_token::{core::FungibleTokenCore, FungibleTokenResolver};
use near_contract_standards::storage_management::{
    StorageBalance, StorageBalanceBounds, StorageManagement,
};
use near_sdk::serde::Serialize;
use near_sdk::{
    assert_one_yocto,
    borsh::{self, BorshDeserialize, BorshSerialize},
    env, json_types::U128, near, require, AccountId, BorshStorageKey, NearToken, PanicOnDefault,
    PromiseOrValue,
};
use schemars::JsonSchema;

pub mod assets;
pub mod errors;
pub mod shares;
pub mod storage;
pub mod vault;
pub mod vault_standards;

#[cfg(test)]
pub mod test_utils;

use vault::Vault;
use vault_standards::VaultCore;

/// Largest decimals for which `10^decimals` fits in a `u128`.
pub const MAX_DECIMALS: u8 = 38;

/// Storage keys for NEAR SDK collections.
#[derive(BorshSerialize, BorshDeserialize, BorshStorageKey)]
pub enum StorageKey {
    /// Storage prefix for the hosted asset ledger.
    Assets,
    /// Storage prefix for the share token and share allowances.
    Shares,
}

/// Main contract state.
#[near(contract_state)]
#[derive(PanicOnDefault)]
pub struct Contract {
    /// The account authorized to register new asset tokens.
    pub owner_id: AccountId,
    /// Metadata for the vault share token.
    pub metadata: FungibleTokenMetadata,
    /// Balances, allowances and roles of every hosted asset token.
    pub assets: TokenRegistry,
    /// Share accounting for the single underlying asset.
    pub vault: Vault,
}

/// Summary of the vault returned by `get_vault_info`.
#[derive(Serialize, JsonSchema, Clone, Debug, PartialEq)]
#[serde(crate = "near_sdk::serde")]
pub struct VaultView {
    pub asset: String,
    pub decimals: u8,
    pub total_assets: String,
    pub total_supply: String,
    pub share_price: String,
}

/// Unwraps a ledger or engine result, aborting the receipt on error.
pub(crate) fn unwrap_or_panic<T, E: std::fmt::Display>(result: Result<T, E>) -> T {
    result.unwrap_or_else(|err| env::panic_str(&err.to_string()))
}

#[near]
impl Contract {
    /// Initializes the contract and registers the underlying asset token.
    ///
    /// # Arguments
    ///
    /// * `owner_id` - Account authorized to register further asset tokens
    /// * `asset_id` - Token id of the underlying asset
    /// * `asset_admin_id` - Initial admin of the asset token
    /// * `asset_minter_id` - Initial minter of the asset token
    /// * `metadata` - Fungible token metadata for vault shares; its decimals
    ///   are also the asset's decimals
    ///
    /// # Panics
    ///
    /// Panics if the metadata is invalid or `decimals` exceeds [`MAX_DECIMALS`].
    #[init]
    #[private]
    pub fn init(
        owner_id: AccountId,
        asset_id: AccountId,
        asset_admin_id: AccountId,
        asset_minter_id: AccountId,
        metadata: FungibleTokenMetadata,
    ) -> Self {
        metadata.assert_valid();
        require!(
            metadata.decimals <= MAX_DECIMALS,
            "Decimals must not exceed 38"
        );

        let mut assets = TokenRegistry::new(StorageKey::Assets);
        unwrap_or_panic(assets.create_token(asset_id.clone(), &asset_admin_id, &asset_minter_id));

        let vault = Vault::new(
            StorageKey::Shares,
            env::current_account_id(),
            asset_id,
            metadata.decimals,
        );

        Self {
            owner_id,
            metadata,
            assets,
            vault,
        }
    }

    /// Asserts that the caller is the contract owner.
    ///
    /// # Panics
    ///
    /// Panics if the predecessor account is not the owner.
    pub fn require_owner(&self) {
        require!(
            env::predecessor_account_id() == self.owner_id,
            "Only the owner can call this method"
        );
    }

    // ==================== Vault Calls ====================

    /// Deposits exactly `assets` of the underlying token and mints shares to
    /// `receiver_id`. The caller must have approved this contract on the
    /// asset ledger beforehand, and `receiver_id` must be registered through
    /// `storage_deposit`.
    ///
    /// Requires at least 1 yoctoNEAR plus the cost of any storage added.
    ///
    /// # Returns
    ///
    /// The number of shares minted.
    #[payable]
    pub fn deposit(&mut self, assets: U128, receiver_id: AccountId) -> U128 {
        let caller = env::predecessor_account_id();
        let shares = self.charge_storage(|this| {
            unwrap_or_panic(this.vault.deposit(
                &mut this.assets,
                &caller,
                assets.0,
                &receiver_id,
            ))
        });
        U128(shares)
    }

    /// Mints exactly `shares` to `receiver_id`, pulling the required assets
    /// from the caller.
    ///
    /// # Returns
    ///
    /// The number of assets pulled.
    #[payable]
    pub fn mint(&mut self, shares: U128, receiver_id: AccountId) -> U128 {
        let caller = env::predecessor_account_id();
        let assets = self.charge_storage(|this| {
            unwrap_or_panic(this.vault.mint(
                &mut this.assets,
                &caller,
                shares.0,
                &receiver_id,
            ))
        });
        U128(assets)
    }

    /// Withdraws exactly `assets` to `receiver_id`, burning shares from
    /// `owner_id`. A caller other than the owner spends its share allowance.
    ///
    /// Requires at least 1 yoctoNEAR plus the cost of any storage added.
    ///
    /// # Returns
    ///
    /// The number of shares burned.
    #[payable]
    pub fn withdraw(&mut self, assets: U128, receiver_id: AccountId, owner_id: AccountId) -> U128 {
        let caller = env::predecessor_account_id();
        let shares = self.charge_storage(|this| {
            unwrap_or_panic(this.vault.withdraw(
                &mut this.assets,
                &caller,
                assets.0,
                &receiver_id,
                &owner_id,
            ))
        });
        U128(shares)
    }

    /// Redeems exactly `shares` from `owner_id`, paying the assets to
    /// `receiver_id`.
    ///
    /// # Returns
    ///
    /// The number of assets paid out.
    #[payable]
    pub fn redeem(&mut self, shares: U128, receiver_id: AccountId, owner_id: AccountId) -> U128 {
        let caller = env::predecessor_account_id();
        let assets = self.charge_storage(|this| {
            unwrap_or_panic(this.vault.redeem(
                &mut this.assets,
                &caller,
                shares.0,
                &receiver_id,
                &owner_id,
            ))
        });
        U128(assets)
    }

    // ==================== Vault Views ====================

    /// Token id of the underlying asset.
    pub fn asset(&self) -> AccountId {
        self.vault.asset().clone()
    }

    /// The vault's current balance of the underlying asset.
    pub fn total_assets(&self) -> U128 {
        U128(self.vault.total_assets(&self.assets))
    }

    /// Assets per share scaled by `10^decimals`, saturating at `u128::MAX`.
    pub fn get_share_price(&self) -> U128 {
        U128(self.snapshot().share_price())
    }

    pub fn convert_to_shares(&self, assets: U128) -> U128 {
        U128(unwrap_or_panic(self.snapshot().convert_to_shares(assets.0)))
    }

    pub fn convert_to_assets(&self, shares: U128) -> U128 {
        U128(unwrap_or_panic(self.snapshot().convert_to_assets(shares.0)))
    }

    pub fn preview_deposit(&self, assets: U128) -> U128 {
        U128(unwrap_or_panic(self.snapshot().preview_deposit(assets.0)))
    }

    pub fn preview_mint(&self, shares: U128) -> U128 {
        U128(unwrap_or_panic(self.snapshot().preview_mint(shares.0)))
    }

    pub fn preview_withdraw(&self, assets: U128) -> U128 {
        U128(unwrap_or_panic(self.snapshot().preview_withdraw(assets.0)))
    }

    pub fn preview_redeem(&self, shares: U128) -> U128 {
        U128(unwrap_or_panic(self.snapshot().preview_redeem(shares.0)))
    }

    pub fn get_vault_info(&self) -> VaultView {
        let snapshot = self.snapshot();
        VaultView {
            asset: self.vault.asset().to_string(),
            decimals: snapshot.decimals,
            total_assets: snapshot.total_assets.to_string(),
            total_supply: snapshot.total_supply.to_string(),
            share_price: snapshot.share_price().to_string(),
        }
    }

    #[allow(unused_variables)]
    pub fn max_deposit(&self, receiver_id: AccountId) -> U128 {
        U128(self.snapshot().max_deposit())
    }

    #[allow(unused_variables)]
    pub fn max_mint(&self, receiver_id: AccountId) -> U128 {
        U128(self.snapshot().max_mint())
    }

    pub fn max_withdraw(&self, owner_id: AccountId) -> U128 {
        U128(unwrap_or_panic(
            self.vault.max_withdraw(&self.assets, &owner_id),
        ))
    }

    pub fn max_redeem(&self, owner_id: AccountId) -> U128 {
        U128(self.vault.max_redeem(&owner_id))
    }

    // ==================== Share Allowances ====================

    pub fn ft_allowance(&self, owner_id: AccountId, spender_id: AccountId) -> U128 {
        U128(self.vault.shares().allowance(&owner_id, &spender_id))
    }

    /// Sets the caller's share allowance for `spender_id` to `amount`.
    ///
    /// Requires at least 1 yoctoNEAR plus the cost of a new allowance entry.
    #[payable]
    pub fn ft_approve(&mut self, spender_id: AccountId, amount: U128) {
        let owner_id = env::predecessor_account_id();
        self.charge_storage(|this| {
            this.vault
                .shares_mut()
                .approve(&owner_id, &spender_id, amount.0)
        });
    }

    /// Moves shares from `owner_id` to `receiver_id`, spending the caller's
    /// allowance. Requires exactly 1 yoctoNEAR.
    #[payable]
    pub fn ft_transfer_from(
        &mut self,
        owner_id: AccountId,
        receiver_id: AccountId,
        amount: U128,
        memo: Option<String>,
    ) {
        assert_one_yocto();
        let spender_id = env::predecessor_account_id();
        unwrap_or_panic(self.vault.shares_mut().transfer_from(
            &spender_id,
            &owner_id,
            &receiver_id,
            amount.0,
            memo.as_deref(),
        ));
    }
}

impl Contract {
    fn snapshot(&self) -> vault_standards::VaultSnapshot {
        self.vault.snapshot(&self.assets)
    }
}

// ===== Fungible Token Traits for Vault Shares =====
#[near]
impl FungibleTokenCore for Contract {
    #[payable]
    fn ft_transfer(&mut self, receiver_id: AccountId, amount: U128, memo: Option<String>) {
        assert_one_yocto();
        let sender_id = env::predecessor_account_id();
        unwrap_or_panic(self.vault.shares_mut().transfer(
            &sender_id,
            &receiver_id,
            amount.0,
            memo.as_deref(),
        ));
    }

    #[payable]
    fn ft_transfer_call(
        &mut self,
        receiver_id: AccountId,
        amount: U128,
        memo: Option<String>,
        msg: String,
    ) -> PromiseOrValue<U128> {
        self.vault
            .shares_mut()
            .token_mut()
            .ft_transfer_call(receiver_id, amount, memo, msg)
    }

    fn ft_total_supply(&self) -> U128 {
        self.vault.shares().token().ft_total_supply()
    }

    fn ft_balance_of(&self, account_id: AccountId) -> U128 {
        self.vault.shares().token().ft_balance_of(account_id)
    }
}

#[near]
impl FungibleTokenResolver for Contract {
    #[private]
    fn ft_resolve_transfer(
        &mut self,
        sender_id: AccountId,
        receiver_id: AccountId,
        amount: U128,
    ) -> U128 {
        self.vault
            .shares_mut()
            .token_mut()
            .ft_resolve_transfer(sender_id, receiver_id, amount)
    }
}

#[near]
impl StorageManagement for Contract {
    #[payable]
    fn storage_deposit(
        &mut self,
        account_id: Option<AccountId>,
        registration_only: Option<bool>,
    ) -> StorageBalance {
        self.vault
            .shares_mut()
            .token_mut()
            .storage_deposit(account_id, registration_only)
    }

    #[payable]
    fn storage_withdraw(&mut self, amount: Option<NearToken>) -> StorageBalance {
        self.vault.shares_mut().token_mut().storage_withdraw(amount)
    }

    fn storage_balance_bounds(&self) -> StorageBalanceBounds {
        self.vault.shares().token().storage_balance_bounds()
    }

    fn storage_balance_of(&self, account_id: AccountId) -> Option<StorageBalance> {
        self.vault.shares().token().storage_balance_of(account_id)
    }

    #[payable]
    fn storage_unregister(&mut self, force: Option<bool>) -> bool {
        self.vault.shares_mut().token_mut().storage_unregister(force)
    }
}

#[near]
impl FungibleTokenMetadataProvider for Contract {
    fn ft_metadata(&self) -> FungibleTokenMetadata {
        self.metadata.clone()
    }
}
