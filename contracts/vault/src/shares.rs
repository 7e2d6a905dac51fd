//! # Share Ledger
//!
//! Vault shares are a NEP-141 token: balances and total supply live in a
//! [`FungibleToken`], and holders register through NEP-145 storage
//! management before they can receive shares. ERC-20 style allowances,
//! which NEP-141 lacks, are kept in a separate map beside it.
//!
//! Supply changes only through the crate-internal [`ShareLedger::mint`] and
//! [`ShareLedger::burn`], which the vault engine calls. Transfers move
//! balances and never touch the share price.
//!
//! ## Invariants
//!
//! - The sum of all balances equals `total_supply`
//! - Only registered accounts hold shares
//! - Zero allowances are removed from storage

use near_contract_standards::fungible_token::core::FungibleTokenCore;
use near_contract_standards::fungible_token::events::{FtBurn, FtMint};
use near_contract_standards::fungible_token::FungibleToken;
use near_contract_standards::storage_management::StorageManagement;
use near_sdk::json_types::U128;
use near_sdk::store::LookupMap;
use near_sdk::{near, AccountId, IntoStorageKey};

use crate::errors::VaultError;
use crate::vault_standards::events::ShareApproval;

#[near(serializers = [borsh])]
pub struct ShareLedger {
    token: FungibleToken,
    /// `(owner, spender) -> remaining allowance`.
    allowances: LookupMap<(AccountId, AccountId), u128>,
}

impl ShareLedger {
    pub fn new<S: IntoStorageKey>(prefix: S) -> Self {
        let prefix = prefix.into_storage_key();
        let mut balances_prefix = prefix.clone();
        balances_prefix.push(b'b');
        let mut allowances_prefix = prefix;
        allowances_prefix.push(b'a');

        Self {
            token: FungibleToken::new(balances_prefix),
            allowances: LookupMap::new(allowances_prefix),
        }
    }

    /// The underlying NEP-141 token, for the standard contract surface.
    pub fn token(&self) -> &FungibleToken {
        &self.token
    }

    pub fn token_mut(&mut self) -> &mut FungibleToken {
        &mut self.token
    }

    pub fn total_supply(&self) -> u128 {
        self.token.ft_total_supply().0
    }

    /// Returns the share balance of `account_id`, 0 if unregistered.
    pub fn balance_of(&self, account_id: &AccountId) -> u128 {
        self.token.ft_balance_of(account_id.clone()).0
    }

    pub fn is_registered(&self, account_id: &AccountId) -> bool {
        self.token.storage_balance_of(account_id.clone()).is_some()
    }

    /// Registers `account_id` without a storage payment. Already registered
    /// accounts are left as they are.
    pub fn register(&mut self, account_id: &AccountId) {
        if !self.is_registered(account_id) {
            self.token.internal_register_account(account_id);
        }
    }

    pub fn allowance(&self, owner_id: &AccountId, spender_id: &AccountId) -> u128 {
        self.allowances
            .get(&(owner_id.clone(), spender_id.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// Moves `amount` shares from `sender_id` to `receiver_id`.
    ///
    /// # Errors
    ///
    /// - [`VaultError::ZeroAmount`] for a zero amount
    /// - [`VaultError::SelfTransfer`] if sender and receiver are the same
    /// - [`VaultError::NotRegistered`] if the receiver has no storage registration
    /// - [`VaultError::InsufficientBalance`] if the sender holds too few shares
    pub fn transfer(
        &mut self,
        sender_id: &AccountId,
        receiver_id: &AccountId,
        amount: u128,
        memo: Option<&str>,
    ) -> Result<(), VaultError> {
        if amount == 0 {
            return Err(VaultError::ZeroAmount);
        }
        if sender_id == receiver_id {
            return Err(VaultError::SelfTransfer);
        }
        if !self.is_registered(receiver_id) {
            return Err(VaultError::NotRegistered(receiver_id.clone()));
        }

        let sender_balance = self.balance_of(sender_id);
        if sender_balance < amount {
            return Err(VaultError::InsufficientBalance {
                available: sender_balance,
                required: amount,
            });
        }

        // Emits `ft_transfer`.
        self.token
            .internal_transfer(sender_id, receiver_id, amount, memo.map(String::from));
        Ok(())
    }

    /// Sets the allowance `owner_id` grants to `spender_id`, replacing any
    /// previous value.
    pub fn approve(&mut self, owner_id: &AccountId, spender_id: &AccountId, amount: u128) {
        self.set_allowance(owner_id, spender_id, amount);

        ShareApproval {
            owner_id,
            spender_id,
            amount: U128(amount),
        }
        .emit();
    }

    /// Moves `amount` shares from `owner_id` to `receiver_id` on behalf of
    /// `spender_id`, consuming its allowance.
    ///
    /// The allowance is only consumed if the transfer succeeds.
    pub fn transfer_from(
        &mut self,
        spender_id: &AccountId,
        owner_id: &AccountId,
        receiver_id: &AccountId,
        amount: u128,
        memo: Option<&str>,
    ) -> Result<(), VaultError> {
        let remaining = self.check_allowance(owner_id, spender_id, amount)?;
        self.transfer(owner_id, receiver_id, amount, memo)?;
        self.set_allowance(owner_id, spender_id, remaining);
        Ok(())
    }

    /// Returns the allowance left after spending `amount`, without writing it.
    pub(crate) fn check_allowance(
        &self,
        owner_id: &AccountId,
        spender_id: &AccountId,
        amount: u128,
    ) -> Result<u128, VaultError> {
        let allowance = self.allowance(owner_id, spender_id);
        allowance
            .checked_sub(amount)
            .ok_or(VaultError::InsufficientAllowance {
                available: allowance,
                required: amount,
            })
    }

    pub(crate) fn set_allowance(
        &mut self,
        owner_id: &AccountId,
        spender_id: &AccountId,
        amount: u128,
    ) {
        let key = (owner_id.clone(), spender_id.clone());
        if amount == 0 {
            self.allowances.remove(&key);
        } else {
            self.allowances.insert(key, amount);
        }
    }

    /// Issues `amount` new shares to the registered `account_id`.
    pub(crate) fn mint(
        &mut self,
        account_id: &AccountId,
        amount: u128,
        memo: Option<&str>,
    ) -> Result<(), VaultError> {
        if !self.is_registered(account_id) {
            return Err(VaultError::NotRegistered(account_id.clone()));
        }
        self.total_supply()
            .checked_add(amount)
            .ok_or(VaultError::MathOverflow)?;

        self.token.internal_deposit(account_id, amount);

        FtMint {
            owner_id: account_id,
            amount: U128(amount),
            memo,
        }
        .emit();
        Ok(())
    }

    /// Destroys `amount` shares held by `account_id`.
    pub(crate) fn burn(
        &mut self,
        account_id: &AccountId,
        amount: u128,
        memo: Option<&str>,
    ) -> Result<(), VaultError> {
        let balance = self.balance_of(account_id);
        if balance < amount {
            return Err(VaultError::InsufficientBalance {
                available: balance,
                required: amount,
            });
        }

        self.token.internal_withdraw(account_id, amount);

        FtBurn {
            owner_id: account_id,
            amount: U128(amount),
            memo,
        }
        .emit();
        Ok(())
    }

    /// Writes cached allowance changes to storage.
    pub fn flush(&mut self) {
        self.allowances.flush();
    }
}
