//! Hexadecimal codec.
//!
//! Both directions stream through a fixed 512-byte scratch buffer so peak
//! working memory stays bounded regardless of payload size. The buffer is
//! zeroized after every flush and only the filled prefix is ever emitted.

use zeroize::{Zeroize, Zeroizing};

use super::charset::Charset;
use crate::error::CryptoError;

/// Size of the scratch buffer in bytes.
pub const SCRATCH_SIZE: usize = 512;

const HEX_CHARS: &[u8; 16] = b"0123456789abcdef";

/// Encodes bytes as a lowercase hex string of length `2 * bytes.len()`.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut hex = String::with_capacity(bytes.len() * 2);
    let mut scratch = Zeroizing::new([0u8; SCRATCH_SIZE]);

    for chunk in bytes.chunks(SCRATCH_SIZE / 2) {
        for (i, byte) in chunk.iter().enumerate() {
            scratch[2 * i] = HEX_CHARS[(byte >> 4) as usize];
            scratch[2 * i + 1] = HEX_CHARS[(byte & 0x0F) as usize];
        }
        hex.extend(scratch[..chunk.len() * 2].iter().map(|&c| c as char));
        scratch.zeroize();
    }

    hex
}

/// Decodes a hex string (either case) into bytes.
///
/// # Errors
///
/// Returns [`CryptoError::Decode`] for odd-length input or any character
/// that is not a hex digit.
pub fn hex_to_bytes(hex: &str) -> Result<Vec<u8>, CryptoError> {
    let digits = hex.as_bytes();
    if digits.len() % 2 != 0 {
        return Err(CryptoError::decode(
            digits.len(),
            format!("odd-length hex string ({} chars)", digits.len()),
        ));
    }

    let mut bytes = Vec::with_capacity(digits.len() / 2);
    let mut scratch = Zeroizing::new([0u8; SCRATCH_SIZE]);
    let mut filled = 0;

    for (pair_index, pair) in digits.chunks_exact(2).enumerate() {
        let offset = pair_index * 2;
        let high = nibble(hex, offset, pair[0])?;
        let low = nibble(hex, offset + 1, pair[1])?;
        scratch[filled] = (high << 4) | low;
        filled += 1;

        if filled == SCRATCH_SIZE {
            bytes.extend_from_slice(&scratch[..filled]);
            scratch.zeroize();
            filled = 0;
        }
    }

    if filled > 0 {
        bytes.extend_from_slice(&scratch[..filled]);
    }

    Ok(bytes)
}

/// Encodes UTF-8 text as hex.
pub fn string_to_hex(text: &str) -> String {
    bytes_to_hex(text.as_bytes())
}

/// Encodes text in the named encoding, then as hex.
pub fn string_to_hex_with(text: &str, encoding: &str) -> Result<String, CryptoError> {
    let charset: Charset = encoding.parse()?;
    Ok(bytes_to_hex(&charset.encode(text)))
}

/// Decodes hex into bytes and interprets them as UTF-8 text.
pub fn hex_to_string(hex: &str) -> Result<String, CryptoError> {
    Charset::Utf8.decode(&hex_to_bytes(hex)?)
}

/// Decodes hex into bytes and interprets them in the named encoding.
pub fn hex_to_string_with(hex: &str, encoding: &str) -> Result<String, CryptoError> {
    let charset: Charset = encoding.parse()?;
    charset.decode(&hex_to_bytes(hex)?)
}

fn nibble(hex: &str, offset: usize, digit: u8) -> Result<u8, CryptoError> {
    match digit {
        b'0'..=b'9' => Ok(digit - b'0'),
        b'a'..=b'f' => Ok(digit - b'a' + 10),
        b'A'..=b'F' => Ok(digit - b'A' + 10),
        _ => {
            // Every byte before `offset` was an ASCII hex digit, so this is a char boundary.
            let found = hex
                .get(offset..)
                .and_then(|rest| rest.chars().next())
                .unwrap_or(char::REPLACEMENT_CHARACTER);
            Err(CryptoError::decode(
                offset,
                format!("invalid hex digit {found:?}"),
            ))
        }
    }
}
