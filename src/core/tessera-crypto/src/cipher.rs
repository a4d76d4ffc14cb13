//! AES-256-CBC passphrase encryption.
//!
//! Two wire protocols, selected by whether a salt is supplied:
//!
//! - **Embedded IV** (no salt): `hex(ciphertext || iv)`, a fresh random IV per
//!   call travels in the last 16 bytes.
//! - **Salt-derived IV** (salt): `hex(ciphertext)`; both sides re-derive the IV
//!   from the salt, so equal inputs encrypt identically.
//!
//! Padding is PKCS#7.

use std::sync::Arc;

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use tracing::debug;

use crate::backend::{installed_backend, CipherBackend};
use crate::codec::hex::{bytes_to_hex, hex_to_bytes};
use crate::error::CryptoError;
use crate::kdf::{derive, derive_embedded_iv_key, DerivationMode};
use crate::keys::{DerivedKey, InitVector};

/// Size of an AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;

/// Size of a CBC initialization vector in bytes.
pub const IV_SIZE: usize = 16;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// The two passphrase protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherProtocol {
    /// Random IV appended to the ciphertext.
    EmbeddedIv,
    /// IV derived from a caller-supplied salt.
    SaltDerivedIv,
}

impl CipherProtocol {
    /// Protocol selected by the presence of a salt.
    pub fn for_salt(salt: Option<&str>) -> Self {
        match salt {
            Some(_) => Self::SaltDerivedIv,
            None => Self::EmbeddedIv,
        }
    }

    fn derivation_mode(self) -> DerivationMode {
        match self {
            Self::EmbeddedIv => DerivationMode::EmbeddedIv,
            Self::SaltDerivedIv => DerivationMode::SaltDerivedIv,
        }
    }
}

/// Encrypts `plaintext` with AES-256-CBC and PKCS#7 padding.
pub fn aes_cbc_encrypt(
    key: &DerivedKey,
    iv: &InitVector,
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = Aes256CbcEnc::new_from_slices(key.as_bytes(), iv.as_bytes())
        .map_err(|e| CryptoError::unexpected("aes-cbc encrypt", e))?;
    Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

/// Decrypts AES-256-CBC ciphertext and strips PKCS#7 padding.
///
/// # Errors
///
/// A wrong key or corrupted ciphertext normally surfaces as a padding
/// failure, reported as [`CryptoError::Unexpected`].
pub fn aes_cbc_decrypt(
    key: &DerivedKey,
    iv: &InitVector,
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = Aes256CbcDec::new_from_slices(key.as_bytes(), iv.as_bytes())
        .map_err(|e| CryptoError::unexpected("aes-cbc decrypt", e))?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|e| CryptoError::unexpected("aes-cbc decrypt", e))
}

/// The built-in backend: AES-256-CBC with hex payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct AesCbcBackend;

impl CipherBackend for AesCbcBackend {
    fn encrypt(
        &self,
        plaintext: &str,
        passphrase: &str,
        salt: Option<&str>,
    ) -> Result<String, CryptoError> {
        let protocol = CipherProtocol::for_salt(salt);
        let material = derive(protocol.derivation_mode(), passphrase, salt)?;
        let iv = require_iv(material.iv)?;

        let mut payload = aes_cbc_encrypt(&material.key, &iv, plaintext.as_bytes())?;
        if protocol == CipherProtocol::EmbeddedIv {
            payload.extend_from_slice(iv.as_bytes());
        }

        debug!(?protocol, payload_len = payload.len(), "Encrypted payload");
        Ok(bytes_to_hex(&payload))
    }

    fn decrypt(
        &self,
        payload: &str,
        passphrase: &str,
        salt: Option<&str>,
    ) -> Result<String, CryptoError> {
        let protocol = CipherProtocol::for_salt(salt);
        let bytes = hex_to_bytes(payload)?;

        let (ciphertext, key, iv) = match protocol {
            CipherProtocol::EmbeddedIv => {
                if bytes.len() < IV_SIZE {
                    return Err(CryptoError::InvalidPayload(format!(
                        "payload is {} bytes, shorter than the {}-byte embedded IV",
                        bytes.len(),
                        IV_SIZE
                    )));
                }
                let (ciphertext, iv_bytes) = bytes.split_at(bytes.len() - IV_SIZE);
                let key = derive_embedded_iv_key(passphrase);
                (ciphertext, key, InitVector::from_prefix(iv_bytes)?)
            }
            CipherProtocol::SaltDerivedIv => {
                let material = derive(protocol.derivation_mode(), passphrase, salt)?;
                let iv = require_iv(material.iv)?;
                (bytes.as_slice(), material.key, iv)
            }
        };

        debug!(?protocol, payload_len = bytes.len(), "Decrypting payload");
        let plaintext = aes_cbc_decrypt(&key, &iv, ciphertext)?;
        String::from_utf8(plaintext)
            .map_err(|e| CryptoError::unexpected("plaintext decoding", e))
    }

    fn name(&self) -> &'static str {
        "aes-256-cbc"
    }
}

fn require_iv(iv: Option<InitVector>) -> Result<InitVector, CryptoError> {
    iv.ok_or_else(|| CryptoError::unexpected("key derivation", "derivation produced no IV"))
}

/// Passphrase encryption service.
///
/// Delegates to the process-wide override when one is installed, otherwise
/// to the backend it was constructed with.
#[derive(Clone)]
pub struct CipherService {
    backend: Arc<dyn CipherBackend>,
}

impl CipherService {
    /// Creates a service backed by [`AesCbcBackend`].
    pub fn new() -> Self {
        Self::with_backend(Arc::new(AesCbcBackend))
    }

    /// Creates a service backed by `backend`.
    pub fn with_backend(backend: Arc<dyn CipherBackend>) -> Self {
        Self { backend }
    }

    /// Returns the backend calls are currently routed to.
    pub fn active_backend(&self) -> &dyn CipherBackend {
        match installed_backend() {
            Some(installed) => installed.as_ref(),
            None => self.backend.as_ref(),
        }
    }

    /// Encrypts `plaintext` into a hex payload.
    ///
    /// Without a salt the embedded-IV protocol is used; with a salt the
    /// salt-derived-IV protocol.
    pub fn encrypt(
        &self,
        plaintext: &str,
        passphrase: &str,
        salt: Option<&str>,
    ) -> Result<String, CryptoError> {
        self.active_backend().encrypt(plaintext, passphrase, salt)
    }

    /// Decrypts a payload produced by [`CipherService::encrypt`] with the
    /// same passphrase and salt.
    ///
    /// # Errors
    ///
    /// - [`CryptoError::Decode`] if the payload is not valid hex
    /// - [`CryptoError::InvalidPayload`] if an embedded-IV payload is shorter
    ///   than 16 bytes
    /// - [`CryptoError::Unexpected`] for a wrong passphrase/salt (bad padding)
    ///   or non-UTF-8 plaintext
    pub fn decrypt(
        &self,
        payload: &str,
        passphrase: &str,
        salt: Option<&str>,
    ) -> Result<String, CryptoError> {
        self.active_backend().decrypt(payload, passphrase, salt)
    }
}

impl Default for CipherService {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CipherService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherService")
            .field("backend", &self.backend.name())
            .finish()
    }
}
