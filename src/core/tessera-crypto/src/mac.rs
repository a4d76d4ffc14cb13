//! HMAC-SHA1 message signing.

use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::error::CryptoError;

type HmacSha1 = Hmac<Sha1>;

const SIGNATURE_LEN: usize = 20;

const HEX_CHARS: &[u8; 16] = b"0123456789abcdef";

/// Signs `message` with `key`, returning the HMAC-SHA1 as 40 lowercase hex chars.
///
/// An empty key disables signing: the message is returned unchanged.
pub fn sign(message: &str, key: &[u8]) -> Result<String, CryptoError> {
    if key.is_empty() {
        return Ok(message.to_owned());
    }

    let mut mac = HmacSha1::new_from_slice(key)
        .map_err(|e| CryptoError::unexpected("hmac-sha1 sign", e))?;
    mac.update(message.as_bytes());
    let tag = mac.finalize().into_bytes();

    let mut rendered = [0u8; SIGNATURE_LEN * 2];
    for (i, byte) in tag.iter().enumerate() {
        rendered[2 * i] = HEX_CHARS[(byte >> 4) as usize];
        rendered[2 * i + 1] = HEX_CHARS[(byte & 0x0F) as usize];
    }
    Ok(rendered.iter().map(|&c| c as char).collect())
}
