//! # Storage Charging
//!
//! State-changing calls that can allocate storage run through
//! [`Contract::charge_storage`]. The caller must attach at least one
//! yoctoNEAR, so a function-call access key cannot make them. Bytes the
//! call adds are paid from the attached deposit and the rest is refunded to
//! the caller.
//!
//! Share balances are the exception: they are paid once per holder through
//! NEP-145 `storage_deposit`.

use near_sdk::{env, NearToken, Promise, StorageUsage};

use crate::Contract;

impl Contract {
    /// Runs `call` and charges the caller for the storage it adds.
    ///
    /// # Panics
    ///
    /// - If no deposit is attached
    /// - If the attached deposit does not cover the added bytes
    pub(crate) fn charge_storage<T>(&mut self, call: impl FnOnce(&mut Self) -> T) -> T {
        let deposit = env::attached_deposit();
        if deposit.as_yoctonear() == 0 {
            env::panic_str("Requires attached deposit of at least 1 yoctoNEAR");
        }

        self.flush_collections();
        let initial_usage = env::storage_usage();

        let result = call(self);

        self.flush_collections();
        settle_storage(initial_usage, deposit);
        result
    }

    /// Writes every cached collection change so `env::storage_usage` is exact.
    fn flush_collections(&mut self) {
        self.assets.flush();
        self.vault.shares_mut().flush();
    }
}

fn settle_storage(initial_usage: StorageUsage, deposit: NearToken) {
    let added_bytes = env::storage_usage().saturating_sub(initial_usage);
    let cost = env::storage_byte_cost().saturating_mul(u128::from(added_bytes));

    if deposit < cost {
        env::panic_str(&format!(
            "Insufficient storage deposit: {} bytes cost {} yoctoNEAR, attached {}",
            added_bytes,
            cost.as_yoctonear(),
            deposit.as_yoctonear()
        ));
    }

    let refund = deposit.saturating_sub(cost);
    if refund.as_yoctonear() > 0 {
        Promise::new(env::predecessor_account_id())
            .transfer(refund)
            .detach();
    }
}
