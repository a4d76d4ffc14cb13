//! Binary-to-text codecs.

pub mod b64;
pub mod charset;
pub mod hex;

pub use b64::{
    decode_base64, decode_url_safe_base64, encode_base64, encode_base64_str,
    encode_url_safe_base64,
};
pub use charset::Charset;
pub use self::hex::{
    bytes_to_hex, hex_to_bytes, hex_to_string, hex_to_string_with, string_to_hex,
    string_to_hex_with,
};
