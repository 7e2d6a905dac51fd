//! # Vault Conversion Core
//!
//! Share/asset conversions, previews and limits expressed over two numbers:
//! the vault's measured asset balance and the outstanding share supply.
//!
//! Implementors only provide those inputs. Every conversion is integer
//! arithmetic with an explicit [`Rounding`] direction.

use super::mul_div::{mul_div, Rounding};
use crate::errors::VaultError;

pub trait VaultCore {
    /// Underlying assets held by the vault.
    fn total_assets(&self) -> u128;

    /// Shares outstanding.
    fn total_supply(&self) -> u128;

    /// Decimals of the underlying asset; sets the fixed-point scale of
    /// [`VaultCore::share_price`].
    fn decimals(&self) -> u8;

    /// Assets worth exactly one share at the genesis rate, i.e. `10^decimals`.
    fn price_unit(&self) -> u128 {
        10u128.pow(self.decimals() as u32)
    }

    /// Converts assets to shares with the given rounding.
    ///
    /// With no shares outstanding the genesis 1:1 rate applies. If shares
    /// exist but the vault holds no assets, the denominator is clamped to 1.
    fn convert_to_shares_rounded(
        &self,
        assets: u128,
        rounding: Rounding,
    ) -> Result<u128, VaultError> {
        let total_supply = self.total_supply();
        if total_supply == 0 {
            return Ok(assets);
        }

        let denominator = self.total_assets().max(1);
        mul_div(assets, total_supply, denominator, rounding).ok_or(VaultError::MathOverflow)
    }

    /// Converts shares to assets with the given rounding.
    fn convert_to_assets_rounded(
        &self,
        shares: u128,
        rounding: Rounding,
    ) -> Result<u128, VaultError> {
        let total_supply = self.total_supply();
        if total_supply == 0 {
            return Ok(shares);
        }

        mul_div(shares, self.total_assets(), total_supply, rounding)
            .ok_or(VaultError::MathOverflow)
    }

    fn convert_to_shares(&self, assets: u128) -> Result<u128, VaultError> {
        self.convert_to_shares_rounded(assets, Rounding::Down)
    }

    fn convert_to_assets(&self, shares: u128) -> Result<u128, VaultError> {
        self.convert_to_assets_rounded(shares, Rounding::Down)
    }

    /// Assets per share, scaled by [`VaultCore::price_unit`] and rounded down.
    ///
    /// Returns the unit itself (a price of 1) while no shares exist. A price
    /// too large for `u128` saturates at `u128::MAX`, so this read never fails.
    fn share_price(&self) -> u128 {
        let total_supply = self.total_supply();
        if total_supply == 0 {
            return self.price_unit();
        }

        mul_div(
            self.total_assets(),
            self.price_unit(),
            total_supply,
            Rounding::Down,
        )
        .unwrap_or(u128::MAX)
    }

    /// Shares a deposit of `assets` would mint. Rounds down.
    fn preview_deposit(&self, assets: u128) -> Result<u128, VaultError> {
        self.convert_to_shares_rounded(assets, Rounding::Down)
    }

    /// Assets a mint of `shares` would charge. Rounds up.
    fn preview_mint(&self, shares: u128) -> Result<u128, VaultError> {
        self.convert_to_assets_rounded(shares, Rounding::Up)
    }

    /// Shares a withdrawal of `assets` would burn. Rounds up.
    fn preview_withdraw(&self, assets: u128) -> Result<u128, VaultError> {
        self.convert_to_shares_rounded(assets, Rounding::Up)
    }

    /// Assets a redemption of `shares` would pay. Rounds down.
    fn preview_redeem(&self, shares: u128) -> Result<u128, VaultError> {
        self.convert_to_assets_rounded(shares, Rounding::Down)
    }

    /// Largest deposit that keeps both total assets and total supply
    /// within `u128`.
    fn max_deposit(&self) -> u128 {
        let max_assets = u128::MAX - self.total_assets();
        let max_assets_from_shares = self
            .convert_to_assets(u128::MAX - self.total_supply())
            .unwrap_or(u128::MAX);

        max_assets.min(max_assets_from_shares)
    }

    /// Largest mint that keeps both total supply and total assets within
    /// `u128`.
    fn max_mint(&self) -> u128 {
        let max_shares = u128::MAX - self.total_supply();
        let max_shares_from_assets = self
            .convert_to_shares(u128::MAX - self.total_assets())
            .unwrap_or(u128::MAX);

        max_shares.min(max_shares_from_assets)
    }
}

/// Point-in-time view of the vault's conversion inputs.
///
/// Taken once per operation, before any asset moves, so a caller's own
/// incoming transfer can never feed back into its own price.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VaultSnapshot {
    pub total_assets: u128,
    pub total_supply: u128,
    pub decimals: u8,
}

impl VaultCore for VaultSnapshot {
    fn total_assets(&self) -> u128 {
        self.total_assets
    }

    fn total_supply(&self) -> u128 {
        self.total_supply
    }

    fn decimals(&self) -> u8 {
        self.decimals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE: u128 = 1_000_000_000_000_000_000;

    fn snapshot(total_assets: u128, total_supply: u128) -> VaultSnapshot {
        VaultSnapshot {
            total_assets,
            total_supply,
            decimals: 18,
        }
    }

    #[test]
    fn test_genesis_rate_is_one_to_one() {
        let empty = snapshot(0, 0);
        assert_eq!(empty.share_price(), ONE);
        assert_eq!(empty.convert_to_shares(123).unwrap(), 123);
        assert_eq!(empty.convert_to_assets(123).unwrap(), 123);
        assert_eq!(empty.preview_mint(123).unwrap(), 123);
    }

    #[test]
    fn test_genesis_rate_ignores_stray_assets() {
        // Assets sitting in a vault with no shares do not move the rate.
        let donated = snapshot(500, 0);
        assert_eq!(donated.share_price(), ONE);
        assert_eq!(donated.preview_deposit(100).unwrap(), 100);
    }

    #[test]
    fn test_share_price_reflects_assets() {
        let vault = snapshot(105 * ONE, 100 * ONE);
        assert_eq!(vault.share_price(), 1_050_000_000_000_000_000);
    }

    #[test]
    fn test_rounding_favors_vault() {
        // 3 shares backed by 10 assets.
        let vault = snapshot(10, 3);
        assert_eq!(vault.preview_deposit(5).unwrap(), 1);
        assert_eq!(vault.preview_withdraw(5).unwrap(), 2);
        assert_eq!(vault.preview_redeem(2).unwrap(), 6);
        assert_eq!(vault.preview_mint(2).unwrap(), 7);
    }

    #[test]
    fn test_drained_vault_does_not_divide_by_zero() {
        let drained = snapshot(0, 1_000);
        assert_eq!(drained.share_price(), 0);
        assert_eq!(drained.convert_to_assets(1_000).unwrap(), 0);
        assert_eq!(drained.convert_to_shares(1).unwrap(), 1_000);
    }

    #[test]
    fn test_inflated_price_saturates() {
        // One base-unit share backing 1000 whole tokens.
        let inflated = snapshot(1_000 * ONE + 1, 1);
        assert_eq!(inflated.share_price(), u128::MAX);

        let wnear = VaultSnapshot {
            total_assets: 340 * 10u128.pow(24),
            total_supply: 1,
            decimals: 24,
        };
        assert_eq!(wnear.share_price(), u128::MAX);
    }

    #[test]
    fn test_max_limits_stay_within_u128() {
        let vault = snapshot(100, 100);
        assert_eq!(vault.max_deposit(), u128::MAX - 100);
        assert_eq!(vault.max_mint(), u128::MAX - 100);
        assert!(vault.preview_deposit(u128::MAX).is_ok());
    }

    #[test]
    fn test_overflowing_conversion_is_an_error() {
        let vault = snapshot(1, u128::MAX);
        assert_eq!(vault.convert_to_shares(2), Err(VaultError::MathOverflow));
    }
}
