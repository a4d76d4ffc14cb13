//! Integration tests for Tessera.
//!
//! These tests drive the `tessera` binary end to end and exercise the
//! process-wide cipher backend override in-process.

// Allow unwrap() in tests - panics are acceptable for test assertions
#![allow(clippy::disallowed_methods)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use anyhow::{bail, Context, Result};

// ============================================================================
// CLI Runner
// ============================================================================

/// Result of one `tessera` invocation.
#[derive(Debug)]
pub struct CliOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl From<Output> for CliOutput {
    fn from(output: Output) -> Self {
        Self {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).trim_end().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Runs the CLI binary with a clean `TESSERA_*` environment.
pub struct TesseraCli {
    binary: PathBuf,
    envs: Vec<(String, String)>,
}

impl TesseraCli {
    /// Locate the built binary.
    pub fn new() -> Result<Self> {
        Ok(Self {
            binary: find_cli_binary()?,
            envs: Vec::new(),
        })
    }

    /// Set an environment variable for every invocation.
    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.envs.push((key.to_string(), value.to_string()));
        self
    }

    /// Run with `args` and return the captured output.
    pub fn run(&self, args: &[&str]) -> Result<CliOutput> {
        let mut command = Command::new(&self.binary);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .env_remove("RUST_LOG");
        for key in ["TESSERA_CONFIG", "TESSERA_LOG", "TESSERA_PASSPHRASE", "TESSERA_SIGNING_KEY"] {
            command.env_remove(key);
        }
        for (key, value) in &self.envs {
            command.env(key, value);
        }

        let output = command
            .output()
            .with_context(|| format!("Failed to run CLI: {:?}", self.binary))?;
        Ok(output.into())
    }

    /// Run with `args`, fail unless it exits successfully, and return stdout.
    pub fn run_ok(&self, args: &[&str]) -> Result<String> {
        let output = self.run(args)?;
        if !output.success {
            bail!("tessera {:?} failed: {}", args, output.stderr);
        }
        Ok(output.stdout)
    }
}

/// Find the CLI binary in the target directory.
fn find_cli_binary() -> Result<PathBuf> {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());

    // Try debug build first, then release
    let candidates = [
        Path::new(&manifest_dir).join("../../target/debug/tessera"),
        Path::new(&manifest_dir).join("../../target/debug/tessera.exe"),
        Path::new(&manifest_dir).join("../../target/release/tessera"),
        Path::new(&manifest_dir).join("../../target/release/tessera.exe"),
    ];

    for candidate in &candidates {
        if candidate.exists() {
            return Ok(candidate.canonicalize()?);
        }
    }

    bail!(
        "Could not find tessera binary. Run 'cargo build -p tessera-cli' first. Searched in: {:?}",
        candidates
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tessera_crypto::backend::installed_backend;
    use tessera_crypto::{
        authorize_override, configure_override_gate, install_backend, CipherBackend,
        CipherService, CryptoError,
    };

    use super::*;

    fn cli() -> TesseraCli {
        TesseraCli::new().unwrap()
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let cli = cli().env("TESSERA_PASSPHRASE", "correct horse");

        let payload = cli.run_ok(&["encrypt", "Attack at dawn"]).unwrap();
        // 16 bytes of ciphertext plus the 16-byte embedded IV, hex encoded
        assert_eq!(payload.len(), 64);

        let plaintext = cli.run_ok(&["decrypt", &payload]).unwrap();
        assert_eq!(plaintext, "Attack at dawn");
    }

    #[test]
    fn test_salted_encryption_is_deterministic() {
        let cli = cli();
        let args = [
            "encrypt",
            "Hello world!",
            "--passphrase",
            "secret",
            "--salt",
            "salt",
        ];
        let payload = cli.run_ok(&args).unwrap();
        assert_eq!(payload, "69ae632d80aa2bbf514cdd161ea34422");
        assert_eq!(cli.run_ok(&args).unwrap(), payload);

        let plaintext = cli
            .run_ok(&["decrypt", &payload, "--passphrase", "secret", "--salt", "salt"])
            .unwrap();
        assert_eq!(plaintext, "Hello world!");
    }

    #[test]
    fn test_decrypt_rejects_bad_payloads() {
        let cli = cli().env("TESSERA_PASSPHRASE", "secret");

        let short = cli.run(&["decrypt", "00112233"]).unwrap();
        assert!(!short.success);
        assert!(short.stderr.contains("invalid payload"), "{}", short.stderr);

        let not_hex = cli.run(&["decrypt", "zz"]).unwrap();
        assert!(!not_hex.success);
        assert!(not_hex.stderr.contains("decode error"), "{}", not_hex.stderr);
    }

    #[test]
    fn test_decrypt_with_wrong_passphrase_fails() {
        let payload = cli()
            .run_ok(&["encrypt", "top secret", "--passphrase", "right"])
            .unwrap();
        let output = cli()
            .run(&["decrypt", &payload, "--passphrase", "wrong"])
            .unwrap();
        // A wrong key almost always breaks PKCS#7 padding; if it happens to
        // yield valid padding the plaintext still differs.
        assert!(!output.success || output.stdout != "top secret");
    }

    #[test]
    fn test_sign() {
        let signature = cli()
            .run_ok(&["sign", "what do ya want for nothing?", "--key", "Jefe"])
            .unwrap();
        assert_eq!(signature, "effcdf6ae5eb2fa2d27416d5f184df9c259a7c79");

        let echoed = cli().run_ok(&["sign", "unsigned", "--key", ""]).unwrap();
        assert_eq!(echoed, "unsigned");
    }

    #[test]
    fn test_hash_uses_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let config_path = dir.path().join("tessera.json");
        std::fs::write(
            &config_path,
            serde_json::json!({ "password_hash": "sha1" }).to_string(),
        )
        .unwrap();
        let config = config_path.to_str().unwrap();

        assert_eq!(
            cli().run_ok(&["hash", ""]).unwrap(),
            "1B2M2Y8AsgTpgAmY7PhCfg=="
        );
        assert_eq!(
            cli().run_ok(&["--config", config, "hash", "abc"]).unwrap(),
            "qZk+NkcGgWq6PiVxeFDCbJzQ2J0="
        );
        // --algorithm wins over the file
        assert_eq!(
            cli()
                .run_ok(&["--config", config, "hash", "", "--algorithm", "md5"])
                .unwrap(),
            "1B2M2Y8AsgTpgAmY7PhCfg=="
        );
    }

    #[test]
    fn test_invalid_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let config_path = dir.path().join("tessera.json");
        std::fs::write(&config_path, "{ not json").unwrap();

        let output = cli()
            .run(&["--config", config_path.to_str().unwrap(), "secret"])
            .unwrap();
        assert!(!output.success);
        assert!(output.stderr.contains("Invalid config file"), "{}", output.stderr);
    }

    #[test]
    fn test_random_generators() {
        let digits = cli().run_ok(&["digits", "--length", "6"]).unwrap();
        assert_eq!(digits.len(), 6);
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
        assert_ne!(digits.as_bytes()[0], b'0');

        let symbols = cli().run_ok(&["symbols"]).unwrap();
        assert!((4..16).contains(&symbols.len()));

        let secret = cli().run_ok(&["secret"]).unwrap();
        assert_eq!(secret.len(), 6);

        let output = cli().run(&["digits", "--length", "0"]).unwrap();
        assert!(!output.success);
        assert!(output.stderr.contains("illegal argument"), "{}", output.stderr);
    }

    #[test]
    fn test_hex_and_base64() {
        assert_eq!(cli().run_ok(&["hex", "encode", "Hi!"]).unwrap(), "486921");
        assert_eq!(
            cli().run_ok(&["hex", "decode", "486921"]).unwrap(),
            "Hi!"
        );
        assert_eq!(
            cli()
                .run_ok(&["hex", "encode", "é", "--encoding", "ISO-8859-1"])
                .unwrap(),
            "e9"
        );

        assert_eq!(cli().run_ok(&["base64", "encode", "abc"]).unwrap(), "YWJj");
        assert_eq!(
            cli().run_ok(&["base64", "encode", "a", "--url-safe"]).unwrap(),
            "YQ.."
        );
        assert_eq!(
            cli()
                .run_ok(&["base64", "decode", "YQ..", "--url-safe"])
                .unwrap(),
            "a"
        );
    }

    #[test]
    fn test_legacy_key() {
        let key = cli()
            .run_ok(&["legacy-key", "--passphrase", "password"])
            .unwrap();
        assert_eq!(
            key,
            "015f5520e4e66b2293cc11201b9b516958b5716a809f3dac3ddb2325c8fc28dd"
        );

        let raw = cli()
            .run_ok(&["legacy-key", "--passphrase", "password", "--raw"])
            .unwrap();
        assert_eq!(raw, "70617373776f72642020202020202020");

        let output = cli()
            .run(&["legacy-key", "--passphrase", "password", "--iterations", "0"])
            .unwrap();
        assert!(!output.success);
    }

    #[test]
    fn test_log_level_goes_to_stderr() {
        let output = cli()
            .run(&[
                "--log-level",
                "debug",
                "encrypt",
                "x",
                "--passphrase",
                "p",
                "--salt",
                "s",
            ])
            .unwrap();
        assert!(output.success);
        assert_eq!(output.stdout.len(), 32);
        assert!(output.stderr.contains("Encrypted payload"), "{}", output.stderr);
    }

    /// Reverses the plaintext; never touches the passphrase.
    struct ReversingBackend;

    impl CipherBackend for ReversingBackend {
        fn encrypt(
            &self,
            plaintext: &str,
            _passphrase: &str,
            _salt: Option<&str>,
        ) -> Result<String, CryptoError> {
            Ok(plaintext.chars().rev().collect())
        }

        fn decrypt(
            &self,
            payload: &str,
            _passphrase: &str,
            _salt: Option<&str>,
        ) -> Result<String, CryptoError> {
            Ok(payload.chars().rev().collect())
        }

        fn name(&self) -> &'static str {
            "reversing"
        }
    }

    // The override is process-wide and write-once, so the whole lifecycle is
    // checked in a single test. No other test in this crate calls
    // CipherService in-process.
    #[test]
    fn test_backend_override_lifecycle() {
        let service = CipherService::new();
        assert!(installed_backend().is_none());
        assert_eq!(service.active_backend().name(), "aes-256-cbc");

        // Nothing can be authorized before startup registers a token.
        assert!(matches!(
            authorize_override("operator-token"),
            Err(CryptoError::PermissionDenied(_))
        ));

        configure_override_gate("operator-token").unwrap();

        // A caller that does not know the registered token can neither
        // register its own nor get a capability with it.
        assert!(matches!(
            configure_override_gate("caller-chosen"),
            Err(CryptoError::AlreadyConfigured)
        ));
        assert!(matches!(
            authorize_override("caller-chosen"),
            Err(CryptoError::PermissionDenied(_))
        ));
        assert!(installed_backend().is_none());
        assert_ne!(service.encrypt("card=4111", "pass", None).unwrap(), "1114=drac");

        let capability = authorize_override("operator-token").unwrap();
        install_backend(capability, Arc::new(ReversingBackend)).unwrap();

        // Existing services are rerouted too.
        assert_eq!(service.active_backend().name(), "reversing");
        assert_eq!(service.encrypt("abc", "secret", None).unwrap(), "cba");
        assert_eq!(
            service.decrypt("cba", "secret", Some("salt")).unwrap(),
            "abc"
        );

        let second = authorize_override("operator-token").unwrap();
        assert!(matches!(
            install_backend(second, Arc::new(ReversingBackend)),
            Err(CryptoError::AlreadyConfigured)
        ));
        assert_eq!(installed_backend().unwrap().name(), "reversing");
    }
}
