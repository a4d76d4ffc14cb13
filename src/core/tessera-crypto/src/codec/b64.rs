//! Base64 codecs.
//!
//! The standard flavour uses `=` padding. The URL-safe flavour uses the
//! `-`/`_` alphabet and pads with `.`, which survives unescaped in URLs and
//! cookies and is easy to cut off.

use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    DecodeError, Engine,
};

use crate::error::CryptoError;

/// Padding character of the URL-safe flavour.
pub const URL_SAFE_PAD: char = '.';

/// Encodes bytes as standard base64.
pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Encodes UTF-8 text as standard base64.
pub fn encode_base64_str(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

/// Decodes standard base64.
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>, CryptoError> {
    STANDARD.decode(encoded).map_err(decode_error)
}

/// Encodes bytes as URL-safe base64 padded with `.`.
pub fn encode_url_safe_base64(bytes: &[u8]) -> String {
    let mut encoded = URL_SAFE_NO_PAD.encode(bytes);
    let padding = (4 - encoded.len() % 4) % 4;
    encoded.extend(std::iter::repeat(URL_SAFE_PAD).take(padding));
    encoded
}

/// Decodes URL-safe base64, either unpadded or with exactly the `.` padding
/// that completes the last group.
pub fn decode_url_safe_base64(encoded: &str) -> Result<Vec<u8>, CryptoError> {
    let trimmed = encoded.trim_end_matches(URL_SAFE_PAD);
    let padding = encoded.len() - trimmed.len();
    let expected = (4 - trimmed.len() % 4) % 4;
    if padding != 0 && padding != expected {
        return Err(CryptoError::decode(
            trimmed.len(),
            format!("expected {expected} padding characters, found {padding}"),
        ));
    }
    URL_SAFE_NO_PAD.decode(trimmed).map_err(decode_error)
}

fn decode_error(err: DecodeError) -> CryptoError {
    match err {
        DecodeError::InvalidByte(offset, byte) => CryptoError::decode(
            offset,
            format!("invalid base64 character {:?}", char::from(byte)),
        ),
        DecodeError::InvalidLastSymbol(offset, byte) => CryptoError::decode(
            offset,
            format!("invalid trailing base64 symbol {:?}", char::from(byte)),
        ),
        DecodeError::InvalidLength(length) => {
            CryptoError::decode(length, format!("invalid base64 length {length}"))
        }
        DecodeError::InvalidPadding => CryptoError::decode(0, "invalid base64 padding"),
    }
}
