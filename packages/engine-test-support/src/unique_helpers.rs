//! Unique test identities backed by ULIDs, so parallel tests never share a
//! wallet or nonce by accident.

use ulid::Ulid;

/// `{prefix}-{ulid}`
///
/// ```
/// use engine_test_support::unique_helpers::unique_str;
///
/// let a = unique_str("room");
/// let b = unique_str("room");
/// assert_ne!(a, b);
/// assert!(a.starts_with("room-"));
/// ```
pub fn unique_str(prefix: &str) -> String {
    format!("{}-{}", prefix, Ulid::new())
}

/// A wallet-looking identifier: `wallet_{prefix}_{ulid}` in lowercase.
///
/// ```
/// use engine_test_support::unique_helpers::unique_wallet;
///
/// let wallet = unique_wallet("alice");
/// assert!(wallet.starts_with("wallet_alice_"));
/// assert_ne!(wallet, unique_wallet("alice"));
/// ```
pub fn unique_wallet(prefix: &str) -> String {
    format!("wallet_{}_{}", prefix, Ulid::new().to_string().to_lowercase())
}

/// A fresh reveal nonce.
pub fn unique_nonce() -> String {
    Ulid::new().to_string()
}
