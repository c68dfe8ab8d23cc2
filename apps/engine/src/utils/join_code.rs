//! Join code generation for rooms.
//!
//! Join codes are 6-character strings using Crockford's Base32 alphabet so
//! they can be typed by hand without ambiguity.

use rand::rngs::OsRng;
use rand::{Rng, TryRngCore};

const CROCKFORD: &[u8] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ"; // no I, L, O, U

pub const JOIN_CODE_LEN: usize = 6;

/// Generate a join code from the OS's cryptographically secure RNG.
///
/// # Example
/// ```
/// use beat_engine::utils::join_code::{generate_join_code, JOIN_CODE_LEN};
///
/// let code = generate_join_code();
/// assert_eq!(code.len(), JOIN_CODE_LEN);
/// ```
pub fn generate_join_code() -> String {
    let mut rng = OsRng.unwrap_err();
    (0..JOIN_CODE_LEN)
        .map(|_| CROCKFORD[rng.random_range(0..CROCKFORD.len())] as char)
        .collect()
}

/// Canonical form of a hand-typed code: uppercase, with the Crockford
/// look-alikes folded (`O` -> `0`, `I`/`L` -> `1`).
pub fn normalize_join_code(input: &str) -> String {
    input
        .trim()
        .chars()
        .map(|c| match c.to_ascii_uppercase() {
            'O' => '0',
            'I' | 'L' => '1',
            other => other,
        })
        .collect()
}
