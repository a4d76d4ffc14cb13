//! CLI configuration file.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tessera_crypto::random::DEFAULT_SECRET_BYTES;
use tessera_crypto::HashType;

/// Settings read from the optional JSON file given with `--config`.
///
/// Every field is optional in the file; missing fields take their defaults.
/// Command-line arguments override anything set here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Digest used by `tessera hash` when `--algorithm` is not given.
    pub password_hash: HashType,
    /// Random bytes behind `tessera secret` when `--bytes` is not given.
    pub secret_bytes: usize,
    /// Log filter directive, used when neither `--log-level` nor `RUST_LOG` is set.
    pub log_level: Option<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            password_hash: HashType::default(),
            secret_bytes: DEFAULT_SECRET_BYTES,
            log_level: None,
        }
    }
}

impl CliConfig {
    /// Loads the configuration from `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_json(&raw)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parses and validates a JSON configuration document.
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw).context("Failed to parse JSON")?;
        if config.secret_bytes == 0 {
            bail!("secret_bytes must be at least 1");
        }
        Ok(config)
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CliConfig::load(None).unwrap();
        assert_eq!(config.password_hash, HashType::Md5);
        assert_eq!(config.secret_bytes, DEFAULT_SECRET_BYTES);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let config = CliConfig::from_json(r#"{ "password_hash": "sha256" }"#).unwrap();
        assert_eq!(config.password_hash, HashType::Sha256);
        assert_eq!(config.secret_bytes, DEFAULT_SECRET_BYTES);
    }

    #[test]
    fn test_full_document() {
        let config = CliConfig::from_json(
            r#"{ "password_hash": "sha1", "secret_bytes": 12, "log_level": "debug" }"#,
        )
        .unwrap();
        assert_eq!(config.password_hash, HashType::Sha1);
        assert_eq!(config.secret_bytes, 12);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_rejects_unknown_fields() {
        assert!(CliConfig::from_json(r#"{ "pasword_hash": "sha1" }"#).is_err());
    }

    #[test]
    fn test_rejects_zero_secret_bytes() {
        assert!(CliConfig::from_json(r#"{ "secret_bytes": 0 }"#).is_err());
    }

    #[test]
    fn test_missing_file() {
        let result = CliConfig::load(Some(Path::new("/nonexistent/tessera.json")));
        assert!(result.is_err());
    }
}
