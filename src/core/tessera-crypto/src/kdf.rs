//! Key derivation functions.
//!
//! Turns a passphrase (and optionally a salt) into AES key material. Three
//! derivation modes exist:
//!
//! - [`DerivationMode::EmbeddedIv`]: key is the first 32 bytes of
//!   SHA-384(passphrase), IV is fresh random and travels with the ciphertext.
//! - [`DerivationMode::SaltDerivedIv`]: key is SHA-256(passphrase), IV is the
//!   first 16 bytes of SHA-1(salt) and is never transmitted.
//! - [`DerivationMode::LegacyPbkdf`]: PBKDF2-HMAC-SHA1 over a passphrase
//!   normalized to 16 characters, 1024 iterations.
//!
//! Payloads from older deployments were keyed with the normalized passphrase
//! bytes directly; [`legacy_raw_key`] reproduces those keys.

use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384};
use zeroize::Zeroizing;

use crate::cipher::{IV_SIZE, KEY_SIZE};
use crate::error::CryptoError;
use crate::keys::{DerivedKey, InitVector};
use crate::random::generate_iv;

/// Length the legacy mode pads or truncates passphrases to, in characters.
pub const LEGACY_PASSPHRASE_LEN: usize = 16;

/// PBKDF2 iteration count of the legacy mode.
pub const LEGACY_ITERATIONS: u32 = 1024;

/// The closed set of supported derivation modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivationMode {
    /// Hash-derived key, random IV embedded in the payload.
    EmbeddedIv,
    /// Hash-derived key, IV derived from the salt.
    SaltDerivedIv,
    /// PBKDF2 key over a 16-character normalized passphrase; no IV.
    LegacyPbkdf,
}

/// Output of a derivation: a key and, for the CBC protocols, an IV.
#[derive(Debug, Clone)]
pub struct KeyMaterial {
    /// The AES-256 key.
    pub key: DerivedKey,
    /// The IV, absent for [`DerivationMode::LegacyPbkdf`].
    pub iv: Option<InitVector>,
}

/// Derives key material for `mode`.
///
/// # Errors
///
/// [`DerivationMode::SaltDerivedIv`] requires a salt; `None` is rejected with
/// [`CryptoError::IllegalArgument`]. An empty salt is accepted.
pub fn derive(
    mode: DerivationMode,
    passphrase: &str,
    salt: Option<&str>,
) -> Result<KeyMaterial, CryptoError> {
    match mode {
        DerivationMode::EmbeddedIv => Ok(KeyMaterial {
            key: derive_embedded_iv_key(passphrase),
            iv: Some(generate_iv()),
        }),
        DerivationMode::SaltDerivedIv => {
            let salt = salt.ok_or_else(|| {
                CryptoError::IllegalArgument("salt-derived IV mode requires a salt".into())
            })?;
            Ok(KeyMaterial {
                key: derive_salted_key(passphrase),
                iv: Some(derive_salt_iv(salt)),
            })
        }
        DerivationMode::LegacyPbkdf => Ok(KeyMaterial {
            key: derive_legacy_key(passphrase, salt),
            iv: None,
        }),
    }
}

/// Key for the embedded-IV protocol: the first 32 bytes of SHA-384.
pub fn derive_embedded_iv_key(passphrase: &str) -> DerivedKey {
    let mut key = DerivedKey::from_array([0u8; KEY_SIZE]);
    key.as_mut_bytes()
        .copy_from_slice(&Sha384::digest(passphrase.as_bytes())[..KEY_SIZE]);
    key
}

/// Key for the salt-derived-IV protocol: SHA-256 of the passphrase.
pub fn derive_salted_key(passphrase: &str) -> DerivedKey {
    let mut key = DerivedKey::from_array([0u8; KEY_SIZE]);
    key.as_mut_bytes()
        .copy_from_slice(&Sha256::digest(passphrase.as_bytes()));
    key
}

/// IV for the salt-derived-IV protocol: the first 16 bytes of SHA-1(salt).
pub fn derive_salt_iv(salt: &str) -> InitVector {
    let mut iv = [0u8; IV_SIZE];
    iv.copy_from_slice(&Sha1::digest(salt.as_bytes())[..IV_SIZE]);
    InitVector::new(iv)
}

/// Pads `passphrase` with spaces or truncates it to exactly 16 characters.
pub fn normalize_legacy_passphrase(passphrase: &str) -> Zeroizing<String> {
    Zeroizing::new(
        passphrase
            .chars()
            .chain(std::iter::repeat(' '))
            .take(LEGACY_PASSPHRASE_LEN)
            .collect(),
    )
}

/// Derives a key the legacy way: PBKDF2-HMAC-SHA1, 1024 iterations.
///
/// A missing or empty salt defaults to the normalized passphrase.
pub fn derive_legacy_key(passphrase: &str, salt: Option<&str>) -> DerivedKey {
    legacy_pbkdf2(passphrase, salt, LEGACY_ITERATIONS)
}

/// Like [`derive_legacy_key`] with a caller-chosen iteration count.
///
/// # Errors
///
/// Returns [`CryptoError::IllegalArgument`] if `iterations` is zero.
pub fn derive_legacy_key_with_iterations(
    passphrase: &str,
    salt: Option<&str>,
    iterations: u32,
) -> Result<DerivedKey, CryptoError> {
    if iterations == 0 {
        return Err(CryptoError::IllegalArgument(
            "PBKDF2 iteration count must be > 0".into(),
        ));
    }
    Ok(legacy_pbkdf2(passphrase, salt, iterations))
}

/// Key bytes used by older payloads: the normalized passphrase itself.
///
/// Each of the 16 characters becomes one byte. Salt and iteration count do
/// not take part.
///
/// # Errors
///
/// Returns [`CryptoError::IllegalArgument`] if the passphrase contains a
/// character outside printable ASCII.
pub fn legacy_raw_key(
    passphrase: &str,
) -> Result<Zeroizing<[u8; LEGACY_PASSPHRASE_LEN]>, CryptoError> {
    let normalized = normalize_legacy_passphrase(passphrase);
    let mut key = Zeroizing::new([0u8; LEGACY_PASSPHRASE_LEN]);
    for (slot, c) in key.iter_mut().zip(normalized.chars()) {
        if !(' '..='~').contains(&c) {
            return Err(CryptoError::IllegalArgument(
                "legacy passphrase must be printable ASCII".into(),
            ));
        }
        *slot = c as u8;
    }
    Ok(key)
}

fn legacy_pbkdf2(passphrase: &str, salt: Option<&str>, iterations: u32) -> DerivedKey {
    let normalized = normalize_legacy_passphrase(passphrase);
    let salt = match salt {
        Some(salt) if !salt.is_empty() => salt.as_bytes(),
        _ => normalized.as_bytes(),
    };

    let mut key = DerivedKey::from_array([0u8; KEY_SIZE]);
    pbkdf2::pbkdf2_hmac::<Sha1>(normalized.as_bytes(), salt, iterations, key.as_mut_bytes());
    key
}
