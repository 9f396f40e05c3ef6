//! Game code and seat token generation.
//!
//! Game codes are 6 characters from an alphabet without look-alikes
//! (no I, O, 0, 1). Tokens are 20 lowercase alphanumerics; they identify a
//! seat for resuming and are not secrets.

use rand::Rng;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const TOKEN_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

pub const GAME_CODE_LEN: usize = 6;
pub const TOKEN_LEN: usize = 20;

fn pick<R: Rng + ?Sized>(rng: &mut R, alphabet: &[u8], len: usize) -> String {
    (0..len)
        .map(|_| alphabet[rng.random_range(0..alphabet.len())] as char)
        .collect()
}

pub fn generate_game_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    pick(rng, CODE_ALPHABET, GAME_CODE_LEN)
}

pub fn generate_token<R: Rng + ?Sized>(rng: &mut R) -> String {
    pick(rng, TOKEN_ALPHABET, TOKEN_LEN)
}

/// Only characters a generated code can contain.
pub fn is_game_code(code: &str) -> bool {
    !code.is_empty() && code.bytes().all(|b| CODE_ALPHABET.contains(&b))
}

/// Trim and upper-case a user-typed code.
pub fn normalize_game_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}
