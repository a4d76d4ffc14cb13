//! Tessera CLI - Command line interface.

mod config;

use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tessera_crypto::codec::{self, Charset};
use tessera_crypto::kdf::{self, LEGACY_ITERATIONS};
use tessera_crypto::{digest, mac, random, CipherService, HashType};

use crate::config::CliConfig;

// ============================================================================
// CLI Structure
// ============================================================================

#[derive(Parser)]
#[command(name = "tessera")]
#[command(about = "Tessera - Passphrase encryption, signing and encoding utilities")]
#[command(version)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, env = "TESSERA_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter directive (e.g. "debug", "tessera_crypto=trace")
    #[arg(long, env = "TESSERA_LOG")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt text with a passphrase
    Encrypt {
        /// Plaintext (or read from stdin if not provided)
        text: Option<String>,
        #[command(flatten)]
        secret: PassphraseArgs,
    },
    /// Decrypt a hex payload produced by `encrypt`
    Decrypt {
        /// Hex payload (or read from stdin if not provided)
        payload: Option<String>,
        #[command(flatten)]
        secret: PassphraseArgs,
    },
    /// Sign a message with HMAC-SHA1
    Sign {
        /// Message (or read from stdin if not provided)
        message: Option<String>,
        /// Signing key; an empty key echoes the message
        #[arg(long, env = "TESSERA_SIGNING_KEY", hide_env_values = true)]
        key: String,
    },
    /// Hash a password (Base64 output)
    Hash {
        /// Input (or read from stdin if not provided)
        input: Option<String>,
        /// Digest algorithm (md5, sha-1, sha-256, sha-384, sha-512)
        #[arg(long)]
        algorithm: Option<HashType>,
    },
    /// Generate a random digit string
    Digits {
        /// Length; random between 4 and 11 if not provided
        #[arg(long)]
        length: Option<usize>,
    },
    /// Generate a random symbol string
    Symbols {
        /// Length; random between 4 and 15 if not provided
        #[arg(long)]
        length: Option<usize>,
    },
    /// Generate a short URL-safe secret
    Secret {
        /// Number of random bytes
        #[arg(long)]
        bytes: Option<usize>,
    },
    /// Hex encoding of text
    Hex {
        #[command(subcommand)]
        command: HexCommands,
    },
    /// Base64 encoding of text
    Base64 {
        #[command(subcommand)]
        command: Base64Commands,
    },
    /// Derive a key with the legacy PBKDF2 scheme (hex output)
    LegacyKey {
        #[command(flatten)]
        secret: PassphraseArgs,
        /// PBKDF2 iteration count
        #[arg(long, default_value_t = LEGACY_ITERATIONS)]
        iterations: u32,
        /// Print the raw normalized-passphrase key older payloads used
        #[arg(long, conflicts_with_all = ["iterations", "salt"])]
        raw: bool,
    },
}

#[derive(clap::Args)]
struct PassphraseArgs {
    /// Passphrase
    #[arg(long, env = "TESSERA_PASSPHRASE", hide_env_values = true)]
    passphrase: String,
    /// Salt; selects the salt-derived IV protocol
    #[arg(long)]
    salt: Option<String>,
}

#[derive(Subcommand)]
enum HexCommands {
    /// Encode text as hex
    Encode {
        /// Text (or read from stdin if not provided)
        text: Option<String>,
        /// Character encoding of the text
        #[arg(long, default_value = "UTF-8")]
        encoding: String,
    },
    /// Decode hex into text
    Decode {
        /// Hex (or read from stdin if not provided)
        hex: Option<String>,
        /// Character encoding of the decoded bytes
        #[arg(long, default_value = "UTF-8")]
        encoding: String,
    },
}

#[derive(Subcommand)]
enum Base64Commands {
    /// Encode text as Base64
    Encode {
        /// Text (or read from stdin if not provided)
        text: Option<String>,
        /// Use the URL-safe alphabet with '.' padding
        #[arg(long)]
        url_safe: bool,
    },
    /// Decode Base64 into text
    Decode {
        /// Base64 (or read from stdin if not provided)
        encoded: Option<String>,
        /// Use the URL-safe alphabet with '.' padding
        #[arg(long)]
        url_safe: bool,
    },
}

// ============================================================================
// Helpers
// ============================================================================

fn init_tracing(directive: Option<&str>) -> Result<()> {
    let filter = match directive {
        Some(directive) => EnvFilter::try_new(directive)
            .with_context(|| format!("Invalid log filter: {}", directive))?,
        None => EnvFilter::from_default_env(),
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
    Ok(())
}

/// Returns `arg`, or reads one line from stdin without its line terminator.
fn input_or_stdin(arg: Option<String>, what: &str) -> Result<String> {
    if let Some(value) = arg {
        return Ok(value);
    }

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .with_context(|| format!("Failed to read {} from stdin", what))?;
    if line.is_empty() {
        bail!("No {} provided", what);
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

// ============================================================================
// Commands
// ============================================================================

fn cmd_encrypt(text: &str, secret: &PassphraseArgs) -> Result<()> {
    let payload = CipherService::new()
        .encrypt(text, &secret.passphrase, secret.salt.as_deref())
        .context("Encryption failed")?;
    println!("{}", payload);
    Ok(())
}

fn cmd_decrypt(payload: &str, secret: &PassphraseArgs) -> Result<()> {
    let plaintext = CipherService::new()
        .decrypt(payload.trim(), &secret.passphrase, secret.salt.as_deref())
        .context("Decryption failed")?;
    println!("{}", plaintext);
    Ok(())
}

fn cmd_hex(command: HexCommands) -> Result<()> {
    let output = match command {
        HexCommands::Encode { text, encoding } => {
            codec::string_to_hex_with(&input_or_stdin(text, "text")?, &encoding)?
        }
        HexCommands::Decode { hex, encoding } => {
            codec::hex_to_string_with(input_or_stdin(hex, "hex")?.trim(), &encoding)?
        }
    };
    println!("{}", output);
    Ok(())
}

fn cmd_base64(command: Base64Commands) -> Result<()> {
    let output = match command {
        Base64Commands::Encode { text, url_safe } => {
            let text = input_or_stdin(text, "text")?;
            if url_safe {
                codec::encode_url_safe_base64(text.as_bytes())
            } else {
                codec::encode_base64_str(&text)
            }
        }
        Base64Commands::Decode { encoded, url_safe } => {
            let encoded = input_or_stdin(encoded, "base64")?;
            let bytes = if url_safe {
                codec::decode_url_safe_base64(encoded.trim())?
            } else {
                codec::decode_base64(encoded.trim())?
            };
            Charset::Utf8.decode(&bytes)?
        }
    };
    println!("{}", output);
    Ok(())
}

fn cmd_legacy_key(secret: &PassphraseArgs, iterations: u32, raw: bool) -> Result<()> {
    if raw {
        let key = kdf::legacy_raw_key(&secret.passphrase)?;
        println!("{}", codec::bytes_to_hex(&*key));
        return Ok(());
    }

    let key = kdf::derive_legacy_key_with_iterations(
        &secret.passphrase,
        secret.salt.as_deref(),
        iterations,
    )?;
    println!("{}", codec::bytes_to_hex(key.as_bytes()));
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;

    let directive = cli.log_level.as_deref().or_else(|| {
        if std::env::var_os("RUST_LOG").is_some() {
            None
        } else {
            config.log_level.as_deref()
        }
    });
    init_tracing(directive)?;

    if let Some(path) = &cli.config {
        tracing::debug!(path = %path.display(), "Loaded configuration");
    }

    match cli.command {
        Commands::Encrypt { text, secret } => cmd_encrypt(&input_or_stdin(text, "text")?, &secret),
        Commands::Decrypt { payload, secret } => {
            cmd_decrypt(&input_or_stdin(payload, "payload")?, &secret)
        }
        Commands::Sign { message, key } => {
            let message = input_or_stdin(message, "message")?;
            println!("{}", mac::sign(&message, key.as_bytes())?);
            Ok(())
        }
        Commands::Hash { input, algorithm } => {
            let input = input_or_stdin(input, "input")?;
            let hash_type = algorithm.unwrap_or(config.password_hash);
            println!("{}", digest::password_hash_with(&input, hash_type));
            Ok(())
        }
        Commands::Digits { length } => {
            let digits = match length {
                Some(length) => random::random_digits(length)?,
                None => random::random_digits_any(),
            };
            println!("{}", digits);
            Ok(())
        }
        Commands::Symbols { length } => {
            let symbols = match length {
                Some(length) => random::random_symbols(length)?,
                None => random::random_symbols_any(),
            };
            println!("{}", symbols);
            Ok(())
        }
        Commands::Secret { bytes } => {
            println!("{}", random::gen_secret(bytes.unwrap_or(config.secret_bytes)));
            Ok(())
        }
        Commands::Hex { command } => cmd_hex(command),
        Commands::Base64 { command } => cmd_base64(command),
        Commands::LegacyKey {
            secret,
            iterations,
            raw,
        } => cmd_legacy_key(&secret, iterations, raw),
    }
}
