use near_sdk::near;

/// Privileges a token can grant to an account.
///
/// Roles are scoped per token: holding `Minter` on one token says nothing
/// about another token in the same registry.
#[near(serializers = [borsh, json])]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    /// May grant and revoke roles on the token.
    Admin,
    /// May mint new supply and burn its own holdings.
    Minter,
}
