//! Cryptographically secure random generation.
//!
//! Uses the operating system's CSPRNG for all random number generation.

use rand::{rngs::OsRng, Rng, RngCore};

use crate::cipher::IV_SIZE;
use crate::codec::b64::{encode_url_safe_base64, URL_SAFE_PAD};
use crate::error::CryptoError;
use crate::keys::InitVector;

/// Digit alphabet.
pub const DIGITS: &[u8; 10] = b"0123456789";

/// Readable symbol alphabet: no `l`, `I` or `O`.
pub const SYMBOLS: &[u8; 63] = b"0123456789\
abcdefghijkmnopqrstuvwxyz\
ABCDEFGHJKLMNPQRSTUVWXYZ\
!.-*";

const POWER_OF_TEN: [u32; 10] = [
    1,
    10,
    100,
    1_000,
    10_000,
    100_000,
    1_000_000,
    10_000_000,
    100_000_000,
    1_000_000_000,
];

/// Number of bytes behind [`gen_secret_default`].
pub const DEFAULT_SECRET_BYTES: usize = 4;

/// Generates cryptographically secure random bytes.
pub fn generate_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Generates a fresh random CBC initialization vector.
pub fn generate_iv() -> InitVector {
    let mut iv = [0u8; IV_SIZE];
    OsRng.fill_bytes(&mut iv);
    InitVector::new(iv)
}

/// Generates a string of `len` random ASCII digits.
///
/// For `1 < len < 10` a single number is sampled in `[0, 10^len)`; a sample
/// below `10^(len-1)` has `10^(len-1)` added to it instead of being redrawn,
/// so the result always has exactly `len` significant digits. This skews the
/// distribution towards `[10^(len-1), 2 * 10^(len-1))` and is kept as-is for
/// output compatibility. `len == 1` is uniform over `0..=9`. Longer strings
/// are sampled digit by digit and may start with `0`.
///
/// # Errors
///
/// Returns [`CryptoError::IllegalArgument`] if `len` is zero.
pub fn random_digits(len: usize) -> Result<String, CryptoError> {
    if len < 1 {
        return Err(CryptoError::IllegalArgument(format!(
            "digit count must be at least 1, got {len}"
        )));
    }

    Ok(digits_of_len(len))
}

/// Generates a digit string of random length in `4..12`.
pub fn random_digits_any() -> String {
    digits_of_len(OsRng.gen_range(4..12))
}

/// Generates a string of `len` characters drawn from [`SYMBOLS`].
///
/// # Errors
///
/// Returns [`CryptoError::IllegalArgument`] if `len` is zero.
pub fn random_symbols(len: usize) -> Result<String, CryptoError> {
    if len < 1 {
        return Err(CryptoError::IllegalArgument(format!(
            "symbol count must be at least 1, got {len}"
        )));
    }
    Ok(sample(len, SYMBOLS))
}

/// Generates a symbol string of random length in `4..16`.
pub fn random_symbols_any() -> String {
    let len = OsRng.gen_range(4..16);
    sample(len, SYMBOLS)
}

/// Generates a URL-safe secret from `len` random bytes.
///
/// The output is cut at the first `.` so the padding run is dropped:
/// 4 bytes give 6 characters.
pub fn gen_secret(len: usize) -> String {
    let mut secret = encode_url_safe_base64(&generate_bytes(len));
    if let Some(pad) = secret.find(URL_SAFE_PAD) {
        secret.truncate(pad);
    }
    secret
}

/// Generates a URL-safe secret from 4 random bytes.
pub fn gen_secret_default() -> String {
    gen_secret(DEFAULT_SECRET_BYTES)
}

/// `len` must be at least 1.
fn digits_of_len(len: usize) -> String {
    if len < POWER_OF_TEN.len() {
        let mut n = OsRng.gen_range(0..POWER_OF_TEN[len]);
        let base = POWER_OF_TEN[len - 1];
        if len > 1 && n < base {
            n += base;
        }
        n.to_string()
    } else {
        sample(len, DIGITS)
    }
}

fn sample(len: usize, alphabet: &[u8]) -> String {
    (0..len)
        .map(|_| alphabet[OsRng.gen_range(0..alphabet.len())] as char)
        .collect()
}
