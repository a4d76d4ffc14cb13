//! Message digests and one-way password hashing.

use std::str::FromStr;

use md5::Md5;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::codec::b64::encode_base64;
use crate::error::CryptoError;

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HashType {
    /// MD5 (default for password hashes).
    #[default]
    Md5,
    /// SHA-1.
    Sha1,
    /// SHA-256.
    Sha256,
    /// SHA-384.
    Sha384,
    /// SHA-512.
    Sha512,
}

impl HashType {
    /// Digest length in bytes.
    pub fn output_len(self) -> usize {
        match self {
            Self::Md5 => 16,
            Self::Sha1 => 20,
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }
}

impl std::fmt::Display for HashType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Md5 => write!(f, "MD5"),
            Self::Sha1 => write!(f, "SHA-1"),
            Self::Sha256 => write!(f, "SHA-256"),
            Self::Sha384 => write!(f, "SHA-384"),
            Self::Sha512 => write!(f, "SHA-512"),
        }
    }
}

impl FromStr for HashType {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "").as_str() {
            "MD5" => Ok(Self::Md5),
            "SHA1" => Ok(Self::Sha1),
            "SHA256" => Ok(Self::Sha256),
            "SHA384" => Ok(Self::Sha384),
            "SHA512" => Ok(Self::Sha512),
            _ => Err(CryptoError::unexpected(
                "digest lookup",
                format!("unsupported digest algorithm: {s}"),
            )),
        }
    }
}

/// Computes the digest of `data`.
pub fn digest(hash_type: HashType, data: &[u8]) -> Vec<u8> {
    match hash_type {
        HashType::Md5 => Md5::digest(data).to_vec(),
        HashType::Sha1 => Sha1::digest(data).to_vec(),
        HashType::Sha256 => Sha256::digest(data).to_vec(),
        HashType::Sha384 => Sha384::digest(data).to_vec(),
        HashType::Sha512 => Sha512::digest(data).to_vec(),
    }
}

/// Computes the digest of `data` with an algorithm given by name
/// (`"SHA-256"`, `"sha256"`, ...).
pub fn digest_by_name(algorithm: &str, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let hash_type: HashType = algorithm.parse()?;
    Ok(digest(hash_type, data))
}

/// Hashes a password with the default algorithm (MD5), base64 encoded.
pub fn password_hash(input: &str) -> String {
    password_hash_with(input, HashType::default())
}

/// Hashes a password with the given algorithm, base64 encoded.
pub fn password_hash_with(input: &str, hash_type: HashType) -> String {
    encode_base64(&digest(hash_type, input.as_bytes()))
}
