//! Named text encodings for the codec functions that take an encoding name.

use std::str::FromStr;

use crate::error::CryptoError;

/// A text encoding selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Charset {
    /// UTF-8 (default).
    #[default]
    Utf8,
    /// 7-bit US-ASCII.
    UsAscii,
    /// ISO-8859-1 (Latin-1).
    Iso8859_1,
    /// UTF-16, big endian, no BOM.
    Utf16Be,
    /// UTF-16, little endian, no BOM.
    Utf16Le,
}

impl Charset {
    /// Encodes text into bytes.
    ///
    /// Characters the 8-bit charsets cannot represent become `?`.
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            Self::Utf8 => text.as_bytes().to_vec(),
            Self::UsAscii => text
                .chars()
                .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
                .collect(),
            Self::Iso8859_1 => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
                .collect(),
            Self::Utf16Be => text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
            Self::Utf16Le => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
        }
    }

    /// Decodes bytes into text, rejecting byte sequences invalid for the charset.
    pub fn decode(self, bytes: &[u8]) -> Result<String, CryptoError> {
        match self {
            Self::Utf8 => std::str::from_utf8(bytes)
                .map(str::to_owned)
                .map_err(|e| CryptoError::decode(e.valid_up_to(), "invalid UTF-8 sequence")),
            Self::UsAscii => match bytes.iter().position(|b| !b.is_ascii()) {
                Some(pos) => Err(CryptoError::decode(
                    pos,
                    format!("byte 0x{:02x} is not US-ASCII", bytes[pos]),
                )),
                None => Ok(bytes.iter().map(|&b| b as char).collect()),
            },
            Self::Iso8859_1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            Self::Utf16Be | Self::Utf16Le => {
                if bytes.len() % 2 != 0 {
                    return Err(CryptoError::decode(
                        bytes.len(),
                        "UTF-16 input has an odd number of bytes",
                    ));
                }
                let units = bytes.chunks_exact(2).map(|pair| {
                    let pair = [pair[0], pair[1]];
                    if self == Self::Utf16Be {
                        u16::from_be_bytes(pair)
                    } else {
                        u16::from_le_bytes(pair)
                    }
                });
                let mut text = String::with_capacity(bytes.len() / 2);
                let mut consumed = 0;
                for decoded in char::decode_utf16(units) {
                    match decoded {
                        Ok(c) => {
                            consumed += c.len_utf16();
                            text.push(c);
                        }
                        Err(e) => {
                            return Err(CryptoError::decode(
                                consumed * 2,
                                format!("unpaired UTF-16 surrogate 0x{:04x}", e.unpaired_surrogate()),
                            ));
                        }
                    }
                }
                Ok(text)
            }
        }
    }
}

impl std::fmt::Display for Charset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Utf8 => write!(f, "UTF-8"),
            Self::UsAscii => write!(f, "US-ASCII"),
            Self::Iso8859_1 => write!(f, "ISO-8859-1"),
            Self::Utf16Be => write!(f, "UTF-16BE"),
            Self::Utf16Le => write!(f, "UTF-16LE"),
        }
    }
}

impl FromStr for Charset {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "us-ascii" | "ascii" => Ok(Self::UsAscii),
            "iso-8859-1" | "iso8859-1" | "latin1" => Ok(Self::Iso8859_1),
            "utf-16be" | "utf16be" => Ok(Self::Utf16Be),
            "utf-16le" | "utf16le" => Ok(Self::Utf16Le),
            _ => Err(CryptoError::unexpected(
                "charset lookup",
                format!("unsupported encoding: {s}"),
            )),
        }
    }
}
