//! Initial credential generation for new accounts.
//!
//! Uses `OsRng` directly. The generated value is sent once in the create
//! payload and never logged or returned.

use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::Rng;

pub const PASSWORD_LENGTH: usize = 12;
pub const PASSWORD_DIGITS: usize = 2;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";

/// Generate a password of [`PASSWORD_LENGTH`] characters with exactly
/// [`PASSWORD_DIGITS`] digits, the rest mixed-case letters, no symbols.
#[must_use]
pub fn generate_password() -> String {
    let mut rng = OsRng;
    let mut chars: Vec<u8> = Vec::with_capacity(PASSWORD_LENGTH);
    for _ in 0..PASSWORD_DIGITS {
        chars.push(DIGITS[rng.gen_range(0..DIGITS.len())]);
    }
    for _ in PASSWORD_DIGITS..PASSWORD_LENGTH {
        chars.push(LETTERS[rng.gen_range(0..LETTERS.len())]);
    }
    chars.shuffle(&mut rng);
    chars.into_iter().map(char::from).collect()
}
