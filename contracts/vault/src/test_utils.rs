//! # Test Utilities
//!
//! Helper functions and builders for unit testing the vault engine and the
//! contract. They handle NEAR SDK context setup and seed the asset ledger
//! with funded, pre-approved holders.
//!
//! ## Modules
//!
//! - [`helpers`]: Context initialization, account constants and amounts
//! - [`builders`]: Builders for a bare [`Vault`](crate::vault::Vault) and a full `Contract`

/// Helper functions for test context and amounts.
#[cfg(test)]
pub mod helpers {
    use near_sdk::test_utils::VMContextBuilder;
    use near_sdk::{testing_env, AccountId, NearToken};

    /// The contract's own account, which holds the vault's assets.
    pub const VAULT: &str = "vault.test";
    pub const OWNER: &str = "owner.test";
    /// Token id of the underlying asset.
    pub const ASSET: &str = "usdc.test";
    pub const ADMIN: &str = "admin.test";
    pub const MINTER: &str = "minter.test";
    pub const ALICE: &str = "alice.test";

    /// Deposit attached by [`init_ctx`], 0.1 NEAR. Covers the storage any
    /// single test call adds; the rest is refunded.
    pub const STORAGE_DEPOSIT: u128 = 100_000_000_000_000_000_000_000;

    pub fn account(id: &str) -> AccountId {
        id.parse().unwrap()
    }

    /// `n` whole tokens at 18 decimals.
    pub fn units(n: u128) -> u128 {
        n * 1_000_000_000_000_000_000
    }

    /// Initializes the NEAR VM context for testing with
    /// [`STORAGE_DEPOSIT`] attached.
    ///
    /// The current account is always [`VAULT`]; `predecessor` is the caller
    /// of the subsequent contract calls. Storage carries over between calls,
    /// logs do not.
    ///
    /// # Example
    ///
    /// ```ignore
    /// init_ctx("alice.test"); // Alice calls next
    /// contract.deposit(U128(100), account("alice.test"));
    /// ```
    pub fn init_ctx(predecessor: &str) {
        init_ctx_with_deposit(predecessor, STORAGE_DEPOSIT);
    }

    /// Like [`init_ctx`], attaching exactly `deposit_yocto`.
    ///
    /// ```ignore
    /// init_ctx_with_deposit("alice.test", 1); // share transfers
    /// ```
    pub fn init_ctx_with_deposit(predecessor: &str, deposit_yocto: u128) {
        let mut builder = VMContextBuilder::new();
        builder
            .current_account_id(account(VAULT))
            .predecessor_account_id(account(predecessor))
            .attached_deposit(NearToken::from_yoctonear(deposit_yocto));
        testing_env!(builder.build());
    }

    /// Asserts that an 18-decimal amount is within `tolerance` whole tokens
    /// of `expected`.
    pub fn assert_close(actual: u128, expected: f64, tolerance: f64) {
        let actual = actual as f64 / 1e18;
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected} ± {tolerance}, got {actual}"
        );
    }
}

/// Builders for test vaults and contracts.
#[cfg(test)]
pub mod builders {
    use crate::test_utils::helpers::{account, init_ctx, ADMIN, ASSET, MINTER, OWNER, VAULT};
    use crate::vault::Vault;
    use crate::Contract;
    use asset_token::TokenRegistry;
    use near_contract_standards::fungible_token::metadata::FungibleTokenMetadata;

    fn share_metadata(decimals: u8) -> FungibleTokenMetadata {
        FungibleTokenMetadata {
            spec: "ft-1.0.0".into(),
            name: "USDC Vault Shares".into(),
            symbol: "vUSDC".into(),
            icon: None,
            reference: None,
            reference_hash: None,
            decimals,
        }
    }

    /// Mints `amount` to `holder` and approves the vault for all of it.
    fn fund_holder(registry: &mut TokenRegistry, holder: &str, amount: u128) {
        let token = account(ASSET);
        registry
            .mint(&token, &account(MINTER), &account(holder), amount)
            .unwrap();
        registry
            .approve(&token, &account(holder), &account(VAULT), amount)
            .unwrap();
    }

    /// Builder for a bare [`Vault`] with its own [`TokenRegistry`].
    ///
    /// # Example
    ///
    /// ```ignore
    /// let (mut vault, mut ledger) = VaultBuilder::new()
    ///     .fund("alice.test", units(100))
    ///     .build();
    /// ```
    pub struct VaultBuilder {
        decimals: u8,
        funded: Vec<(String, u128)>,
        registered: Vec<String>,
        other_tokens: Vec<String>,
    }

    impl VaultBuilder {
        pub fn new() -> Self {
            Self {
                decimals: 18,
                funded: Vec::new(),
                registered: Vec::new(),
                other_tokens: Vec::new(),
            }
        }

        pub fn decimals(mut self, decimals: u8) -> Self {
            self.decimals = decimals;
            self
        }

        /// Gives `holder` `amount` of the asset, pre-approved for the vault,
        /// and registers it as a share holder.
        pub fn fund(mut self, holder: &str, amount: u128) -> Self {
            self.funded.push((holder.to_string(), amount));
            self
        }

        /// Registers `holder` on the share token without funding it.
        pub fn register(mut self, holder: &str) -> Self {
            self.registered.push(holder.to_string());
            self
        }

        /// Registers an extra token sharing the asset's admin and minter.
        pub fn other_token(mut self, token_id: &str) -> Self {
            self.other_tokens.push(token_id.to_string());
            self
        }

        pub fn build(self) -> (Vault, TokenRegistry) {
            init_ctx(VAULT);
            let (admin, minter) = (account(ADMIN), account(MINTER));

            let mut registry = TokenRegistry::new(b"a".to_vec());
            registry.create_token(account(ASSET), &admin, &minter).unwrap();
            for token_id in &self.other_tokens {
                registry.create_token(account(token_id), &admin, &minter).unwrap();
            }
            for (holder, amount) in &self.funded {
                fund_holder(&mut registry, holder, *amount);
            }

            let mut vault = Vault::new(b"v".to_vec(), account(VAULT), account(ASSET), self.decimals);
            let holders = self.funded.iter().map(|(holder, _)| holder).chain(&self.registered);
            for holder in holders {
                vault.shares_mut().register(&account(holder));
            }
            (vault, registry)
        }
    }

    /// Builder for a fully initialized `Contract`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let contract = ContractBuilder::new()
    ///     .fund("alice.test", units(10))
    ///     .build();
    /// ```
    pub struct ContractBuilder {
        decimals: u8,
        funded: Vec<(String, u128)>,
        registered: Vec<String>,
    }

    impl ContractBuilder {
        pub fn new() -> Self {
            Self {
                decimals: 18,
                funded: Vec::new(),
                registered: Vec::new(),
            }
        }

        /// Sets the share (and asset) decimals.
        pub fn decimals(mut self, decimals: u8) -> Self {
            self.decimals = decimals;
            self
        }

        /// Gives `holder` `amount` of the asset, pre-approved for the
        /// contract, and registers it as a share holder.
        pub fn fund(mut self, holder: &str, amount: u128) -> Self {
            self.funded.push((holder.to_string(), amount));
            self
        }

        /// Registers `holder` on the share token without funding it.
        pub fn register(mut self, holder: &str) -> Self {
            self.registered.push(holder.to_string());
            self
        }

        pub fn build(self) -> Contract {
            init_ctx(VAULT);
            let mut contract = Contract::init(
                account(OWNER),
                account(ASSET),
                account(ADMIN),
                account(MINTER),
                share_metadata(self.decimals),
            );
            for (holder, amount) in &self.funded {
                fund_holder(&mut contract.assets, holder, *amount);
            }
            let holders = self.funded.iter().map(|(holder, _)| holder).chain(&self.registered);
            for holder in holders {
                contract.vault.shares_mut().register(&account(holder));
            }
            contract
        }
    }
}
