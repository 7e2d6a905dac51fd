//! # Test Helpers Module
//!
//! Common infrastructure for contract-level scenario tests. The contract is
//! driven in-process through the mocked NEAR VM; every call first switches
//! the predecessor account with [`set_caller`].
//!
//! ## Modules
//!
//! - [`test_builder`]: Builder pattern for constructing test scenarios
//!
//! ## Key Functions
//!
//! - [`set_caller`]: Sets the predecessor for the next contract call
//! - [`init_vault_contract`]: Initializes the contract with the USDC asset
//! - [`fund_and_approve`]: Mints asset tokens to a user and approves the vault
//! - [`register_shares`]: Pays the share token's storage registration

#![allow(dead_code)]

use near_contract_standards::fungible_token::metadata::FungibleTokenMetadata;
use near_sdk::json_types::U128;
use near_sdk::test_utils::VMContextBuilder;
use near_sdk::{testing_env, AccountId, NearToken};
use vault::Contract;

pub use near_contract_standards::fungible_token::core::FungibleTokenCore;
pub use near_contract_standards::storage_management::StorageManagement;

pub mod test_builder;

// ============================================================================
// Constants
// ============================================================================

/// The vault contract's own account.
pub const VAULT_ID: &str = "vault.test";
pub const OWNER_ID: &str = "owner.test";
/// Token id of the underlying asset.
pub const ASSET_ID: &str = "usdc.test";
pub const ADMIN_ID: &str = "admin.test";
pub const MINTER_ID: &str = "minter.test";

/// Decimals of both the asset and the shares.
pub const DECIMALS: u8 = 18;

/// One whole token at [`DECIMALS`].
pub const ONE: u128 = 1_000_000_000_000_000_000;

/// Deposit attached by [`set_caller`], 0.1 NEAR. Unused storage is refunded.
pub const STORAGE_DEPOSIT: u128 = 100_000_000_000_000_000_000_000;

/// The exact deposit share transfers require.
pub const ONE_YOCTO: u128 = 1;

// ============================================================================
// Helper Functions
// ============================================================================

pub fn account(id: &str) -> AccountId {
    id.parse().unwrap()
}

/// Sets `caller` as the predecessor for subsequent contract calls, with
/// [`STORAGE_DEPOSIT`] attached.
///
/// Storage persists across calls; logs are reset.
pub fn set_caller(caller: &str) {
    set_caller_with_deposit(caller, STORAGE_DEPOSIT);
}

/// Like [`set_caller`], attaching exactly `deposit_yocto`.
pub fn set_caller_with_deposit(caller: &str, deposit_yocto: u128) {
    let mut builder = VMContextBuilder::new();
    builder
        .current_account_id(account(VAULT_ID))
        .signer_account_id(account(caller))
        .predecessor_account_id(account(caller))
        .attached_deposit(NearToken::from_yoctonear(deposit_yocto));
    testing_env!(builder.build());
}

/// Initializes the vault contract over [`ASSET_ID`].
pub fn init_vault_contract() -> Contract {
    set_caller(VAULT_ID);
    Contract::init(
        account(OWNER_ID),
        account(ASSET_ID),
        account(ADMIN_ID),
        account(MINTER_ID),
        FungibleTokenMetadata {
            spec: "ft-1.0.0".to_string(),
            name: "USDC Vault Shares".to_string(),
            symbol: "vUSDC".to_string(),
            icon: None,
            reference: None,
            reference_hash: None,
            decimals: DECIMALS,
        },
    )
}

/// Mints `amount` of the asset to `user` and approves the vault to pull it.
pub fn fund_and_approve(contract: &mut Contract, user: &str, amount: u128) {
    set_caller(MINTER_ID);
    contract.asset_mint(account(ASSET_ID), account(user), U128(amount));

    set_caller(user);
    contract.asset_approve(account(ASSET_ID), account(VAULT_ID), U128(amount));
}

/// Registers `user` on the share token, paying the minimum storage balance.
pub fn register_shares(contract: &mut Contract, user: &str) {
    let min = contract.storage_balance_bounds().min;
    set_caller_with_deposit(user, min.as_yoctonear());
    contract.storage_deposit(None, Some(true));
}

/// Asserts that `actual` is within `tolerance` whole tokens of `expected`.
pub fn assert_close(actual: u128, expected: f64, tolerance: f64) {
    let actual = actual as f64 / ONE as f64;
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {} ± {}, got {}",
        expected,
        tolerance,
        actual
    );
}
