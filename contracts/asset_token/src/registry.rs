//! # Token Registry
//!
//! Storage-backed ledger for one or more role-gated fungible tokens.
//!
//! Each token carries its own balances, allowances and role assignments.
//! Supply is managed only through [`TokenRegistry::mint`] and
//! [`TokenRegistry::burn`], both of which require [`Role::Minter`].
//!
//! ## Storage Layout
//!
//! All collections share the prefix passed to [`TokenRegistry::new`],
//! suffixed with a single tag byte per collection.

use near_sdk::store::{LookupMap, LookupSet};
use near_sdk::{env, near, AccountId, IntoStorageKey};

use crate::errors::AssetError;
use crate::ledger::AssetLedger;
use crate::roles::Role;

type BalanceKey = (AccountId, AccountId);
type AllowanceKey = (AccountId, AccountId, AccountId);
type RoleKey = (AccountId, Role, AccountId);

/// Ledger of every registered token.
#[near(serializers = [borsh])]
pub struct TokenRegistry {
    /// Total supply per registered token. Presence marks the token as registered.
    supplies: LookupMap<AccountId, u128>,
    /// `(token, holder) -> balance`. Zero balances are not stored.
    balances: LookupMap<BalanceKey, u128>,
    /// `(token, owner, spender) -> remaining allowance`.
    allowances: LookupMap<AllowanceKey, u128>,
    /// `(token, role, account)` membership.
    roles: LookupSet<RoleKey>,
}

impl TokenRegistry {
    /// Creates an empty registry under the given storage prefix.
    pub fn new<S: IntoStorageKey>(prefix: S) -> Self {
        let prefix = prefix.into_storage_key();
        let sub = |tag: u8| {
            let mut key = prefix.clone();
            key.push(tag);
            key
        };

        Self {
            supplies: LookupMap::new(sub(b's')),
            balances: LookupMap::new(sub(b'b')),
            allowances: LookupMap::new(sub(b'a')),
            roles: LookupSet::new(sub(b'r')),
        }
    }

    /// Registers a new token with zero supply.
    ///
    /// `admin_id` receives [`Role::Admin`] and `minter_id` receives
    /// [`Role::Minter`]. The same account may be passed for both.
    ///
    /// # Errors
    ///
    /// [`AssetError::TokenExists`] if `token_id` is already registered.
    pub fn create_token(
        &mut self,
        token_id: AccountId,
        admin_id: &AccountId,
        minter_id: &AccountId,
    ) -> Result<(), AssetError> {
        if self.supplies.contains_key(&token_id) {
            return Err(AssetError::TokenExists(token_id));
        }

        self.supplies.insert(token_id.clone(), 0);
        self.roles
            .insert((token_id.clone(), Role::Admin, admin_id.clone()));
        self.roles
            .insert((token_id.clone(), Role::Minter, minter_id.clone()));

        env::log_str(&format!(
            "asset_created token={} admin={} minter={}",
            token_id, admin_id, minter_id
        ));
        Ok(())
    }

    pub fn is_registered(&self, token_id: &AccountId) -> bool {
        self.supplies.contains_key(token_id)
    }

    /// Returns the total supply of `token_id`, or 0 if it is not registered.
    pub fn total_supply(&self, token_id: &AccountId) -> u128 {
        self.supplies.get(token_id).copied().unwrap_or(0)
    }

    pub fn allowance(
        &self,
        token_id: &AccountId,
        owner_id: &AccountId,
        spender_id: &AccountId,
    ) -> u128 {
        self.allowances
            .get(&(token_id.clone(), owner_id.clone(), spender_id.clone()))
            .copied()
            .unwrap_or(0)
    }

    pub fn has_role(&self, token_id: &AccountId, role: Role, account_id: &AccountId) -> bool {
        self.roles
            .contains(&(token_id.clone(), role, account_id.clone()))
    }

    /// Writes cached balance, supply and allowance changes to storage.
    ///
    /// Role membership is written through immediately and needs no flush.
    pub fn flush(&mut self) {
        self.supplies.flush();
        self.balances.flush();
        self.allowances.flush();
    }

    /// Grants `role` on `token_id` to `account_id`.
    ///
    /// # Errors
    ///
    /// [`AssetError::MissingRole`] unless `caller_id` is an admin of the token.
    pub fn grant_role(
        &mut self,
        token_id: &AccountId,
        caller_id: &AccountId,
        role: Role,
        account_id: &AccountId,
    ) -> Result<(), AssetError> {
        self.require_role(token_id, Role::Admin, caller_id)?;
        self.roles
            .insert((token_id.clone(), role, account_id.clone()));

        env::log_str(&format!(
            "role_granted token={} role={:?} account={} by={}",
            token_id, role, account_id, caller_id
        ));
        Ok(())
    }

    /// Revokes `role` on `token_id` from `account_id`. Takes effect for the
    /// very next privileged call.
    ///
    /// # Errors
    ///
    /// [`AssetError::MissingRole`] unless `caller_id` is an admin of the token.
    pub fn revoke_role(
        &mut self,
        token_id: &AccountId,
        caller_id: &AccountId,
        role: Role,
        account_id: &AccountId,
    ) -> Result<(), AssetError> {
        self.require_role(token_id, Role::Admin, caller_id)?;
        self.roles
            .remove(&(token_id.clone(), role, account_id.clone()));

        env::log_str(&format!(
            "role_revoked token={} role={:?} account={} by={}",
            token_id, role, account_id, caller_id
        ));
        Ok(())
    }

    /// Mints `amount` new tokens to `account_id`.
    ///
    /// # Errors
    ///
    /// - [`AssetError::MissingRole`] unless `caller_id` holds [`Role::Minter`]
    /// - [`AssetError::ZeroAmount`] for a zero amount
    /// - [`AssetError::Overflow`] if the supply would exceed `u128::MAX`
    pub fn mint(
        &mut self,
        token_id: &AccountId,
        caller_id: &AccountId,
        account_id: &AccountId,
        amount: u128,
    ) -> Result<(), AssetError> {
        self.require_role(token_id, Role::Minter, caller_id)?;
        if amount == 0 {
            return Err(AssetError::ZeroAmount);
        }

        let supply = self
            .total_supply(token_id)
            .checked_add(amount)
            .ok_or(AssetError::Overflow)?;
        // Balance <= supply, so this cannot overflow once the supply fits.
        let balance = self.balance_of(token_id, account_id) + amount;

        self.supplies.insert(token_id.clone(), supply);
        self.set_balance(token_id, account_id, balance);

        env::log_str(&format!(
            "asset_mint token={} account={} amount={}",
            token_id, account_id, amount
        ));
        Ok(())
    }

    /// Burns `amount` from the caller's own balance.
    ///
    /// # Errors
    ///
    /// - [`AssetError::MissingRole`] unless `caller_id` holds [`Role::Minter`]
    /// - [`AssetError::InsufficientBalance`] if the caller holds less than `amount`
    pub fn burn(
        &mut self,
        token_id: &AccountId,
        caller_id: &AccountId,
        amount: u128,
    ) -> Result<(), AssetError> {
        self.require_role(token_id, Role::Minter, caller_id)?;
        if amount == 0 {
            return Err(AssetError::ZeroAmount);
        }

        let balance = self.balance_of(token_id, caller_id);
        if balance < amount {
            return Err(AssetError::InsufficientBalance {
                available: balance,
                required: amount,
            });
        }

        let supply = self.total_supply(token_id) - amount;
        self.supplies.insert(token_id.clone(), supply);
        self.set_balance(token_id, caller_id, balance - amount);

        env::log_str(&format!(
            "asset_burn token={} account={} amount={}",
            token_id, caller_id, amount
        ));
        Ok(())
    }

    /// Sets the allowance `owner_id` grants to `spender_id`, replacing any
    /// previous value.
    pub fn approve(
        &mut self,
        token_id: &AccountId,
        owner_id: &AccountId,
        spender_id: &AccountId,
        amount: u128,
    ) -> Result<(), AssetError> {
        self.require_token(token_id)?;
        self.set_allowance(token_id, owner_id, spender_id, amount);

        env::log_str(&format!(
            "asset_approve token={} owner={} spender={} amount={}",
            token_id, owner_id, spender_id, amount
        ));
        Ok(())
    }

    fn require_token(&self, token_id: &AccountId) -> Result<(), AssetError> {
        if self.is_registered(token_id) {
            Ok(())
        } else {
            Err(AssetError::UnknownToken(token_id.clone()))
        }
    }

    fn require_role(
        &self,
        token_id: &AccountId,
        role: Role,
        account_id: &AccountId,
    ) -> Result<(), AssetError> {
        self.require_token(token_id)?;
        if self.has_role(token_id, role, account_id) {
            Ok(())
        } else {
            Err(AssetError::MissingRole {
                account_id: account_id.clone(),
                role,
            })
        }
    }

    fn set_balance(&mut self, token_id: &AccountId, account_id: &AccountId, amount: u128) {
        let key = (token_id.clone(), account_id.clone());
        if amount == 0 {
            self.balances.remove(&key);
        } else {
            self.balances.insert(key, amount);
        }
    }

    fn set_allowance(
        &mut self,
        token_id: &AccountId,
        owner_id: &AccountId,
        spender_id: &AccountId,
        amount: u128,
    ) {
        let key = (token_id.clone(), owner_id.clone(), spender_id.clone());
        if amount == 0 {
            self.allowances.remove(&key);
        } else {
            self.allowances.insert(key, amount);
        }
    }

    /// Validates and applies a balance move. Nothing is written unless every
    /// check passes.
    fn internal_transfer(
        &mut self,
        token_id: &AccountId,
        sender_id: &AccountId,
        receiver_id: &AccountId,
        amount: u128,
    ) -> Result<(), AssetError> {
        self.require_token(token_id)?;
        if amount == 0 {
            return Err(AssetError::ZeroAmount);
        }

        let sender_balance = self.balance_of(token_id, sender_id);
        if sender_balance < amount {
            return Err(AssetError::InsufficientBalance {
                available: sender_balance,
                required: amount,
            });
        }

        if sender_id != receiver_id {
            let receiver_balance = self
                .balance_of(token_id, receiver_id)
                .checked_add(amount)
                .ok_or(AssetError::Overflow)?;
            self.set_balance(token_id, sender_id, sender_balance - amount);
            self.set_balance(token_id, receiver_id, receiver_balance);
        }

        env::log_str(&format!(
            "asset_transfer token={} from={} to={} amount={}",
            token_id, sender_id, receiver_id, amount
        ));
        Ok(())
    }
}

impl AssetLedger for TokenRegistry {
    fn balance_of(&self, token_id: &AccountId, account_id: &AccountId) -> u128 {
        self.balances
            .get(&(token_id.clone(), account_id.clone()))
            .copied()
            .unwrap_or(0)
    }

    fn transfer(
        &mut self,
        token_id: &AccountId,
        sender_id: &AccountId,
        receiver_id: &AccountId,
        amount: u128,
    ) -> Result<bool, AssetError> {
        self.internal_transfer(token_id, sender_id, receiver_id, amount)?;
        Ok(true)
    }

    fn transfer_from(
        &mut self,
        token_id: &AccountId,
        spender_id: &AccountId,
        owner_id: &AccountId,
        receiver_id: &AccountId,
        amount: u128,
    ) -> Result<bool, AssetError> {
        self.require_token(token_id)?;

        let allowance = self.allowance(token_id, owner_id, spender_id);
        if allowance < amount {
            return Err(AssetError::InsufficientAllowance {
                available: allowance,
                required: amount,
            });
        }

        self.internal_transfer(token_id, owner_id, receiver_id, amount)?;
        self.set_allowance(token_id, owner_id, spender_id, allowance - amount);
        Ok(true)
    }
}
