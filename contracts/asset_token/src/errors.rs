//! Error types for the asset ledger.

use near_sdk::AccountId;
use thiserror::Error;

use crate::roles::Role;

/// Failures raised by [`crate::TokenRegistry`] operations.
///
/// Every failing operation leaves the ledger untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssetError {
    /// The debited account does not hold enough tokens.
    #[error("insufficient balance: available {available}, required {required}")]
    InsufficientBalance {
        /// Current balance of the debited account.
        available: u128,
        /// Amount the operation needed.
        required: u128,
    },

    /// The spender's approved allowance is too small.
    #[error("insufficient allowance: available {available}, required {required}")]
    InsufficientAllowance {
        /// Remaining allowance for the spender.
        available: u128,
        /// Amount the operation needed.
        required: u128,
    },

    /// The caller lacks the role required for a privileged operation.
    #[error("account {account_id} is missing role {role:?}")]
    MissingRole {
        /// The account that attempted the operation.
        account_id: AccountId,
        /// The role the operation requires.
        role: Role,
    },

    /// No token is registered under this id.
    #[error("unknown token {0}")]
    UnknownToken(AccountId),

    /// A token is already registered under this id.
    #[error("token {0} already exists")]
    TokenExists(AccountId),

    #[error("amount must be positive")]
    ZeroAmount,

    /// A balance or the total supply would exceed `u128::MAX`.
    #[error("token supply overflow")]
    Overflow,
}
