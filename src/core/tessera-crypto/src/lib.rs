//! # Tessera Crypto
//!
//! Passphrase-based cryptographic utilities for Tessera.
//!
//! This crate provides:
//! - Passphrase encryption (AES-256-CBC, hex payloads) behind a pluggable backend
//! - Key derivation from passphrases, including a legacy PBKDF2 mode
//! - HMAC-SHA1 message signing
//! - Message digests and password hashing
//! - Hex and Base64 codecs
//! - Random digit strings, symbol strings and short secrets

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod cipher;
pub mod codec;
pub mod digest;
pub mod error;
pub mod kdf;
pub mod keys;
pub mod mac;
pub mod random;

pub use backend::{
    authorize_override, configure_override_gate, install_backend, CipherBackend,
    InstallCapability,
};
pub use cipher::{AesCbcBackend, CipherProtocol, CipherService};
pub use codec::Charset;
pub use digest::HashType;
pub use error::CryptoError;
pub use kdf::{DerivationMode, KeyMaterial};
pub use keys::{DerivedKey, InitVector};
