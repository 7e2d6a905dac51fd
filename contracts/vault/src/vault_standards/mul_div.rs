//! # Safe Multiplication and Division
//!
//! Provides overflow-safe multiplication and division operations using
//! 256-bit intermediate arithmetic. This is essential for share/asset
//! conversions where naive multiplication could overflow.
//!
//! ## Rounding Modes
//!
//! - `Down`: Round towards zero (floor)
//! - `Up`: Round away from zero (ceiling)
//!
//! The rounding mode always favors the vault:
//! - `Down` for shares minted on deposit and assets paid on redeem
//! - `Up` for assets charged on mint and shares burned on withdraw

use uint::construct_uint;

construct_uint! {
    pub struct U256(4);
}

/// Rounding direction for division operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rounding {
    /// Round towards zero (floor division).
    Down,
    /// Round away from zero (ceiling division).
    Up,
}

/// Performs `(x * y) / denominator` with configurable rounding.
///
/// Uses 256-bit intermediate arithmetic so the multiplication step never
/// overflows.
///
/// # Returns
///
/// `None` if `denominator` is zero or the rounded result does not fit in
/// a `u128`.
///
/// # Example
///
/// ```ignore
/// // Calculate shares = (assets * supply) / total_assets, rounded down
/// let shares = mul_div(100_000, 1_000_000, 500_000, Rounding::Down);
/// assert_eq!(shares, Some(200_000));
/// ```
pub fn mul_div(x: u128, y: u128, denominator: u128, rounding: Rounding) -> Option<u128> {
    if denominator == 0 {
        return None;
    }

    let numerator = U256::from(x) * U256::from(y);
    let denominator = U256::from(denominator);
    let mut result = numerator / denominator;

    if rounding == Rounding::Up && !(numerator % denominator).is_zero() {
        result = result + U256::one();
    }

    if result > U256::from(u128::MAX) {
        return None;
    }
    Some(result.as_u128())
}
