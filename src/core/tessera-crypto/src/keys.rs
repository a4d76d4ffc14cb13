//! Key material types.
//!
//! Derived keys implement `Zeroize` and `ZeroizeOnDrop` so they are erased
//! from memory as soon as an encrypt or decrypt call finishes.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::cipher::{IV_SIZE, KEY_SIZE};
use crate::error::CryptoError;

/// A 256-bit AES key derived from a passphrase.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    bytes: [u8; KEY_SIZE],
}

impl DerivedKey {
    /// Creates a key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not exactly 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let bytes: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| {
            CryptoError::IllegalArgument(format!(
                "key must be {} bytes, got {}",
                KEY_SIZE,
                bytes.len()
            ))
        })?;
        Ok(Self { bytes })
    }

    pub(crate) fn from_array(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Returns the raw key bytes.
    ///
    /// Use with caution - the returned slice is not zeroized automatically.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }

    pub(crate) fn as_mut_bytes(&mut self) -> &mut [u8; KEY_SIZE] {
        &mut self.bytes
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

impl PartialEq for DerivedKey {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for DerivedKey {}

/// A 16-byte CBC initialization vector. Not secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitVector([u8; IV_SIZE]);

impl InitVector {
    /// Wraps raw IV bytes.
    pub fn new(bytes: [u8; IV_SIZE]) -> Self {
        Self(bytes)
    }

    /// Takes the first 16 bytes of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than 16 bytes are supplied.
    pub fn from_prefix(bytes: &[u8]) -> Result<Self, CryptoError> {
        bytes
            .get(..IV_SIZE)
            .and_then(|prefix| prefix.try_into().ok())
            .map(Self)
            .ok_or_else(|| {
                CryptoError::InvalidPayload(format!(
                    "need at least {} bytes for an IV, got {}",
                    IV_SIZE,
                    bytes.len()
                ))
            })
    }

    /// Returns the raw IV bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; IV_SIZE] {
        &self.0
    }
}
