//! # Vault Errors
//!
//! Every failing vault or share-ledger operation returns a [`VaultError`]
//! and leaves no state change behind. The contract surface turns these into
//! panics so the runtime reverts the whole receipt.

use asset_token::AssetError;
use near_sdk::AccountId;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VaultError {
    /// The caller or owner lacks the asset or share balance the operation needs.
    #[error("insufficient balance: available {available}, required {required}")]
    InsufficientBalance {
        /// Balance held at the time of the call.
        available: u128,
        /// Amount the operation needed.
        required: u128,
    },

    /// A third-party spender lacks the approved allowance.
    #[error("insufficient allowance: available {available}, required {required}")]
    InsufficientAllowance {
        /// Remaining allowance at the time of the call.
        available: u128,
        /// Amount the operation needed.
        required: u128,
    },

    /// The vault does not hold enough of the underlying asset to pay out.
    #[error("insufficient vault assets: available {available}, required {required}")]
    InsufficientVaultAssets {
        /// Vault asset balance at the time of the call.
        available: u128,
        /// Amount requested.
        required: u128,
    },

    /// The asset ledger rejected or reported failure for a transfer.
    #[error("asset transfer failed: {0}")]
    AssetTransferFailure(String),

    /// A conversion result or running total does not fit in `u128`.
    #[error("math overflow")]
    MathOverflow,

    #[error("amount must be positive")]
    ZeroAmount,

    /// The deposit is too small to mint a single share at the current price.
    #[error("deposit would mint zero shares")]
    ZeroShares,

    /// The request is too small to be worth a single unit of the asset.
    #[error("operation would move zero assets")]
    ZeroAssets,

    #[error("sender and receiver must differ")]
    SelfTransfer,

    /// Share balances can only be credited to accounts that paid for their
    /// storage through `storage_deposit`.
    #[error("account {0} is not registered")]
    NotRegistered(AccountId),
}

impl From<AssetError> for VaultError {
    fn from(err: AssetError) -> Self {
        match err {
            AssetError::InsufficientBalance {
                available,
                required,
            } => VaultError::InsufficientBalance {
                available,
                required,
            },
            AssetError::InsufficientAllowance {
                available,
                required,
            } => VaultError::InsufficientAllowance {
                available,
                required,
            },
            AssetError::ZeroAmount => VaultError::ZeroAmount,
            other => VaultError::AssetTransferFailure(other.to_string()),
        }
    }
}
