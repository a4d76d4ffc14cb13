//! Pluggable cipher backends and the process-wide override.
//!
//! A [`CipherService`](crate::CipherService) delegates every call to a
//! [`CipherBackend`]. Besides the backend injected at construction, a single
//! process-wide override can be installed once, for example to route all
//! encryption through a hardware-backed service. The override always wins.
//!
//! Installing is privileged. The embedding application registers an
//! authorization token once at startup with [`configure_override_gate`].
//! Afterwards only a caller presenting that token gets an
//! [`InstallCapability`] from [`authorize_override`], and
//! [`install_backend`] consumes it. Both the gate and the override slot are
//! write-once, so reads need no locking.

use std::sync::{Arc, OnceLock};

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{debug, info, warn};

use crate::error::CryptoError;

type HmacSha256 = Hmac<Sha256>;

/// Domain separation tag for override authorization.
const OVERRIDE_AUTH_TAG: &[u8] = b"tessera-backend-override-v1";

static GATE: OnceLock<OverrideGate> = OnceLock::new();

static INSTALLED: OnceLock<Arc<dyn CipherBackend>> = OnceLock::new();

/// A strategy implementing the passphrase encrypt/decrypt protocols.
///
/// `salt == None` selects the embedded-IV protocol and `Some(salt)` the
/// salt-derived-IV protocol. Payloads are text; their format is up to the
/// backend.
pub trait CipherBackend: Send + Sync {
    /// Encrypts `plaintext` with a key derived from `passphrase`.
    fn encrypt(
        &self,
        plaintext: &str,
        passphrase: &str,
        salt: Option<&str>,
    ) -> Result<String, CryptoError>;

    /// Decrypts a payload produced by [`CipherBackend::encrypt`].
    fn decrypt(
        &self,
        payload: &str,
        passphrase: &str,
        salt: Option<&str>,
    ) -> Result<String, CryptoError>;

    /// Returns the name of this backend for logging/debugging.
    fn name(&self) -> &'static str;
}

/// Proof that the holder presented the registered override token.
///
/// Cannot be constructed outside this module; consumed by [`install_backend`].
#[derive(Debug)]
pub struct InstallCapability {
    _private: (),
}

/// Holds the HMAC of the registered token; the token itself is not kept.
struct OverrideGate {
    expected_mac: Vec<u8>,
}

impl OverrideGate {
    fn new(token: &str) -> Result<Self, CryptoError> {
        if token.is_empty() {
            return Err(CryptoError::IllegalArgument(
                "override token must not be empty".into(),
            ));
        }
        Ok(Self {
            expected_mac: token_mac(token)?.finalize().into_bytes().to_vec(),
        })
    }

    /// Constant-time check of `presented` against the registered token.
    fn verify(&self, presented: &str) -> Result<(), CryptoError> {
        token_mac(presented)?
            .verify_slice(&self.expected_mac)
            .map_err(|_| {
                warn!("Cipher backend override rejected - invalid token");
                CryptoError::PermissionDenied("invalid override token".into())
            })
    }
}

impl std::fmt::Debug for OverrideGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverrideGate")
            .field("expected_mac", &"[REDACTED]")
            .finish()
    }
}

/// Registers the token that authorizes installing a backend override.
///
/// Call once during startup, before any untrusted code runs.
///
/// # Errors
///
/// - [`CryptoError::IllegalArgument`] for an empty token
/// - [`CryptoError::AlreadyConfigured`] if a token is already registered;
///   the first registration stays in place
pub fn configure_override_gate(token: &str) -> Result<(), CryptoError> {
    let gate = OverrideGate::new(token)?;
    GATE.set(gate).map_err(|_| {
        warn!("Cipher backend override gate already configured");
        CryptoError::AlreadyConfigured
    })?;

    info!("Cipher backend override gate configured");
    Ok(())
}

/// Checks `presented` against the registered token and mints a capability.
///
/// # Errors
///
/// Returns [`CryptoError::PermissionDenied`] when no token was registered or
/// the token does not match.
pub fn authorize_override(presented: &str) -> Result<InstallCapability, CryptoError> {
    let gate = GATE.get().ok_or_else(|| {
        warn!("Cipher backend override rejected - no gate configured");
        CryptoError::PermissionDenied("no override gate configured".into())
    })?;
    gate.verify(presented)?;

    debug!("Cipher backend override authorized");
    Ok(InstallCapability { _private: () })
}

/// Installs the process-wide cipher backend override.
///
/// # Errors
///
/// Returns [`CryptoError::AlreadyConfigured`] if an override is already
/// installed; the existing one stays in place.
pub fn install_backend(
    capability: InstallCapability,
    backend: Arc<dyn CipherBackend>,
) -> Result<(), CryptoError> {
    let InstallCapability { _private: () } = capability;
    let name = backend.name();

    INSTALLED.set(backend).map_err(|_| {
        warn!(backend = name, "Cipher backend override already installed");
        CryptoError::AlreadyConfigured
    })?;

    info!(backend = name, "Cipher backend override installed");
    Ok(())
}

/// Returns the installed override, if any.
pub fn installed_backend() -> Option<&'static Arc<dyn CipherBackend>> {
    INSTALLED.get()
}

fn token_mac(token: &str) -> Result<HmacSha256, CryptoError> {
    let mut mac = HmacSha256::new_from_slice(token.as_bytes())
        .map_err(|e| CryptoError::unexpected("override token mac", e))?;
    mac.update(OVERRIDE_AUTH_TAG);
    Ok(mac)
}
