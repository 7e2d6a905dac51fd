//! # Conversion Engine
//!
//! The [`Vault`] aggregate and its four entry points: `deposit`, `mint`,
//! `withdraw` and `redeem`.
//!
//! `totalAssets` is never stored. It is the vault's live balance of the one
//! configured asset, read from the [`AssetLedger`] at the start of each
//! operation. Direct transfers of that asset into the vault therefore raise
//! the share price, while transfers of any other token are invisible.
//!
//! ## Ordering
//!
//! - Inflows: the share/asset amount is computed from a snapshot taken
//!   before the pull, the pull happens next, shares are minted last
//! - Outflows: allowance spend and share burn are recorded before the push;
//!   a failed push restores both before returning the error
//!
//! Entry points borrow the vault mutably for their whole duration, so a
//! ledger callback cannot re-enter the same vault mid-operation.

use asset_token::AssetLedger;
use near_sdk::json_types::U128;
use near_sdk::{env, near, AccountId, IntoStorageKey};

use crate::errors::VaultError;
use crate::shares::ShareLedger;
use crate::vault_standards::events::{VaultDeposit, VaultWithdraw};
use crate::vault_standards::{VaultCore, VaultSnapshot};

#[near(serializers = [borsh])]
pub struct Vault {
    /// The vault's own address on the asset ledger.
    account_id: AccountId,
    /// Token id of the underlying asset. Fixed at construction.
    asset: AccountId,
    /// Decimals of the underlying asset.
    decimals: u8,
    shares: ShareLedger,
}

impl Vault {
    pub fn new<S: IntoStorageKey>(
        prefix: S,
        account_id: AccountId,
        asset: AccountId,
        decimals: u8,
    ) -> Self {
        Self {
            account_id,
            asset,
            decimals,
            shares: ShareLedger::new(prefix),
        }
    }

    pub fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    pub fn asset(&self) -> &AccountId {
        &self.asset
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn shares(&self) -> &ShareLedger {
        &self.shares
    }

    /// Mutable access for share transfers and approvals. Minting and burning
    /// stay crate-internal.
    pub fn shares_mut(&mut self) -> &mut ShareLedger {
        &mut self.shares
    }

    /// The vault's current balance of its underlying asset.
    pub fn total_assets<L: AssetLedger + ?Sized>(&self, ledger: &L) -> u128 {
        ledger.balance_of(&self.asset, &self.account_id)
    }

    /// Captures the conversion inputs as they stand right now.
    pub fn snapshot<L: AssetLedger + ?Sized>(&self, ledger: &L) -> VaultSnapshot {
        VaultSnapshot {
            total_assets: self.total_assets(ledger),
            total_supply: self.shares.total_supply(),
            decimals: self.decimals,
        }
    }

    /// Largest amount `owner_id` can withdraw, valued at the current price.
    pub fn max_withdraw<L: AssetLedger + ?Sized>(
        &self,
        ledger: &L,
        owner_id: &AccountId,
    ) -> Result<u128, VaultError> {
        let snapshot = self.snapshot(ledger);
        let assets = snapshot.convert_to_assets(self.shares.balance_of(owner_id))?;
        Ok(assets.min(snapshot.total_assets))
    }

    pub fn max_redeem(&self, owner_id: &AccountId) -> u128 {
        self.shares.balance_of(owner_id)
    }

    /// Deposits exactly `assets` from `caller` and mints shares to `receiver`.
    ///
    /// Shares are rounded down. The caller must have approved the vault on
    /// the asset ledger for at least `assets`.
    ///
    /// # Errors
    ///
    /// - [`VaultError::ZeroAmount`] / [`VaultError::ZeroShares`]
    /// - [`VaultError::NotRegistered`] if `receiver` cannot hold shares
    /// - [`VaultError::InsufficientBalance`] / [`VaultError::InsufficientAllowance`]
    ///   from the asset pull
    /// - [`VaultError::AssetTransferFailure`] if the ledger reports failure
    pub fn deposit<L: AssetLedger + ?Sized>(
        &mut self,
        ledger: &mut L,
        caller: &AccountId,
        assets: u128,
        receiver: &AccountId,
    ) -> Result<u128, VaultError> {
        if assets == 0 {
            return Err(VaultError::ZeroAmount);
        }

        let snapshot = self.snapshot(ledger);
        let shares = snapshot.preview_deposit(assets)?;
        if shares == 0 {
            return Err(VaultError::ZeroShares);
        }

        self.internal_issue(ledger, caller, receiver, assets, shares)?;
        Ok(shares)
    }

    /// Mints exactly `shares` to `receiver`, charging `caller` the asset
    /// amount rounded up.
    ///
    /// # Errors
    ///
    /// Same as [`Vault::deposit`], with [`VaultError::ZeroAssets`] when the
    /// shares would cost nothing.
    pub fn mint<L: AssetLedger + ?Sized>(
        &mut self,
        ledger: &mut L,
        caller: &AccountId,
        shares: u128,
        receiver: &AccountId,
    ) -> Result<u128, VaultError> {
        if shares == 0 {
            return Err(VaultError::ZeroAmount);
        }

        let snapshot = self.snapshot(ledger);
        let assets = snapshot.preview_mint(shares)?;
        if assets == 0 {
            return Err(VaultError::ZeroAssets);
        }

        self.internal_issue(ledger, caller, receiver, assets, shares)?;
        Ok(assets)
    }

    /// Pays exactly `assets` to `receiver`, burning the share amount rounded
    /// up from `owner`.
    ///
    /// When `caller != owner` the caller's share allowance from `owner` is
    /// reduced by the burned amount.
    ///
    /// # Errors
    ///
    /// - [`VaultError::ZeroAmount`]
    /// - [`VaultError::InsufficientVaultAssets`] if the vault cannot cover `assets`
    /// - [`VaultError::InsufficientBalance`] / [`VaultError::InsufficientAllowance`]
    ///   on the owner's shares
    /// - [`VaultError::AssetTransferFailure`] if the payout fails; the burn is undone
    pub fn withdraw<L: AssetLedger + ?Sized>(
        &mut self,
        ledger: &mut L,
        caller: &AccountId,
        assets: u128,
        receiver: &AccountId,
        owner: &AccountId,
    ) -> Result<u128, VaultError> {
        if assets == 0 {
            return Err(VaultError::ZeroAmount);
        }

        let snapshot = self.snapshot(ledger);
        if assets > snapshot.total_assets {
            return Err(VaultError::InsufficientVaultAssets {
                available: snapshot.total_assets,
                required: assets,
            });
        }

        let shares = snapshot.preview_withdraw(assets)?;
        self.internal_execute_withdrawal(ledger, caller, receiver, owner, shares, assets)?;
        Ok(shares)
    }

    /// Burns exactly `shares` from `owner` and pays the asset amount rounded
    /// down to `receiver`.
    ///
    /// # Errors
    ///
    /// Same as [`Vault::withdraw`], with [`VaultError::ZeroAssets`] when the
    /// shares are worth less than one asset unit.
    pub fn redeem<L: AssetLedger + ?Sized>(
        &mut self,
        ledger: &mut L,
        caller: &AccountId,
        shares: u128,
        receiver: &AccountId,
        owner: &AccountId,
    ) -> Result<u128, VaultError> {
        if shares == 0 {
            return Err(VaultError::ZeroAmount);
        }

        let balance = self.shares.balance_of(owner);
        if balance < shares {
            return Err(VaultError::InsufficientBalance {
                available: balance,
                required: shares,
            });
        }

        let snapshot = self.snapshot(ledger);
        let assets = snapshot.preview_redeem(shares)?;
        if assets == 0 {
            return Err(VaultError::ZeroAssets);
        }
        if assets > snapshot.total_assets {
            return Err(VaultError::InsufficientVaultAssets {
                available: snapshot.total_assets,
                required: assets,
            });
        }

        self.internal_execute_withdrawal(ledger, caller, receiver, owner, shares, assets)?;
        Ok(assets)
    }

    /// Pulls `assets` from `caller` and mints `shares` to `receiver`.
    ///
    /// Receiver registration and the supply bound are checked before the
    /// pull, so once assets arrive the mint cannot fail.
    fn internal_issue<L: AssetLedger + ?Sized>(
        &mut self,
        ledger: &mut L,
        caller: &AccountId,
        receiver: &AccountId,
        assets: u128,
        shares: u128,
    ) -> Result<(), VaultError> {
        if !self.shares.is_registered(receiver) {
            return Err(VaultError::NotRegistered(receiver.clone()));
        }
        self.shares
            .total_supply()
            .checked_add(shares)
            .ok_or(VaultError::MathOverflow)?;

        match ledger.transfer_from(&self.asset, &self.account_id, caller, &self.account_id, assets) {
            Ok(true) => {}
            Ok(false) => {
                return Err(VaultError::AssetTransferFailure(
                    "ledger reported a failed pull".to_string(),
                ))
            }
            Err(err) => return Err(err.into()),
        }

        self.shares.mint(receiver, shares, Some("Deposit"))?;

        VaultDeposit {
            sender_id: caller,
            owner_id: receiver,
            assets: U128(assets),
            shares: U128(shares),
        }
        .emit();
        Ok(())
    }

    /// Executes a withdrawal following the CEI (Checks-Effects-Interactions) pattern.
    ///
    /// 1. **Checks**: owner balance and, for third-party callers, allowance
    /// 2. **Effects**: spends the allowance and burns the shares
    /// 3. **Interactions**: pushes the assets to the receiver
    ///
    /// If the push fails the effects are reverted before the error returns.
    fn internal_execute_withdrawal<L: AssetLedger + ?Sized>(
        &mut self,
        ledger: &mut L,
        caller: &AccountId,
        receiver: &AccountId,
        owner: &AccountId,
        shares: u128,
        assets: u128,
    ) -> Result<(), VaultError> {
        // Checks
        let balance = self.shares.balance_of(owner);
        if balance < shares {
            return Err(VaultError::InsufficientBalance {
                available: balance,
                required: shares,
            });
        }
        let spent_allowance = if caller != owner {
            let allowance = self.shares.allowance(owner, caller);
            let remaining = self.shares.check_allowance(owner, caller, shares)?;
            Some((allowance, remaining))
        } else {
            None
        };

        // Effects
        if let Some((_, remaining)) = spent_allowance {
            self.shares.set_allowance(owner, caller, remaining);
        }
        self.shares.burn(owner, shares, Some("Withdrawal"))?;

        // Interactions
        let failure = match ledger.transfer(&self.asset, &self.account_id, receiver, assets) {
            Ok(true) => None,
            Ok(false) => Some(VaultError::AssetTransferFailure(
                "ledger reported a failed payout".to_string(),
            )),
            Err(err) => Some(VaultError::AssetTransferFailure(err.to_string())),
        };

        if let Some(err) = failure {
            // Payout failed - restore the burned shares and the allowance
            self.shares.mint(owner, shares, Some("Withdrawal rollback"))?;
            if let Some((allowance, _)) = spent_allowance {
                self.shares.set_allowance(owner, caller, allowance);
            }
            env::log_str(&format!(
                "withdrawal_rolled_back owner={} receiver={} shares={} assets={}",
                owner, receiver, shares, assets
            ));
            return Err(err);
        }

        VaultWithdraw {
            sender_id: caller,
            receiver_id: receiver,
            owner_id: owner,
            assets: U128(assets),
            shares: U128(shares),
        }
        .emit();
        Ok(())
    }
}
