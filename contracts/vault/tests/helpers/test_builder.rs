//! Test builder pattern for scenario tests.
//! Wraps the contract and switches the caller before every call.

use near_sdk::json_types::U128;
use vault::Contract;

use super::*;

pub struct TestScenarioBuilder {
    contract: Contract,
}

impl TestScenarioBuilder {
    pub fn new() -> Self {
        Self {
            contract: init_vault_contract(),
        }
    }

    /// Gives `user` `amount` of the asset, approved for the vault, and
    /// registers `user` as a share holder.
    pub fn fund(mut self, user: &str, amount: u128) -> Self {
        fund_and_approve(&mut self.contract, user, amount);
        register_shares(&mut self.contract, user);
        self
    }

    /// Registers `user` as a share holder without funding it.
    pub fn register(mut self, user: &str) -> Self {
        register_shares(&mut self.contract, user);
        self
    }

    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    /// Switches the caller to `user` and returns the contract for one call.
    pub fn as_user(&mut self, user: &str) -> &mut Contract {
        set_caller(user);
        &mut self.contract
    }

    /// Switches the caller to `user` with exactly `deposit_yocto` attached.
    pub fn as_user_with_deposit(&mut self, user: &str, deposit_yocto: u128) -> &mut Contract {
        set_caller_with_deposit(user, deposit_yocto);
        &mut self.contract
    }

    // ==================== Vault Calls ====================

    pub fn deposit(&mut self, user: &str, assets: u128, receiver: &str) -> u128 {
        self.as_user(user).deposit(U128(assets), account(receiver)).0
    }

    pub fn mint(&mut self, user: &str, shares: u128, receiver: &str) -> u128 {
        self.as_user(user).mint(U128(shares), account(receiver)).0
    }

    pub fn withdraw(&mut self, user: &str, assets: u128, receiver: &str, owner: &str) -> u128 {
        self.as_user(user)
            .withdraw(U128(assets), account(receiver), account(owner))
            .0
    }

    pub fn redeem(&mut self, user: &str, shares: u128, receiver: &str, owner: &str) -> u128 {
        self.as_user(user)
            .redeem(U128(shares), account(receiver), account(owner))
            .0
    }

    // ==================== Share Transfers ====================

    pub fn transfer_shares(&mut self, user: &str, receiver: &str, amount: u128) {
        self.as_user_with_deposit(user, ONE_YOCTO)
            .ft_transfer(account(receiver), U128(amount), None);
    }

    pub fn transfer_shares_from(
        &mut self,
        spender: &str,
        owner: &str,
        receiver: &str,
        amount: u128,
        memo: Option<&str>,
    ) {
        self.as_user_with_deposit(spender, ONE_YOCTO).ft_transfer_from(
            account(owner),
            account(receiver),
            U128(amount),
            memo.map(String::from),
        );
    }

    /// Sends `amount` of `token_id` straight to the vault account.
    pub fn donate(&mut self, user: &str, token_id: &str, amount: u128) {
        self.as_user(user)
            .asset_transfer(account(token_id), account(VAULT_ID), U128(amount));
    }

    // ==================== Views ====================

    pub fn shares_of(&self, user: &str) -> u128 {
        self.contract.ft_balance_of(account(user)).0
    }

    pub fn assets_of(&self, user: &str) -> u128 {
        self.contract
            .asset_balance_of(account(ASSET_ID), account(user))
            .0
    }

    pub fn total_supply(&self) -> u128 {
        self.contract.ft_total_supply().0
    }

    pub fn total_assets(&self) -> u128 {
        self.contract.total_assets().0
    }

    pub fn share_price(&self) -> u128 {
        self.contract.get_share_price().0
    }
}
