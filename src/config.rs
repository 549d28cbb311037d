//! Configuration loading from the environment (optionally via `.env`).

use std::{env, time::Duration};

use anyhow::{Context, Result};

const DEFAULT_ACK_TIMEOUT_SECS: u64 = 10;

/// Runtime settings derived from environment variables.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Hex or `nsec1…` secret key for the local signer.
    pub secret_key: Option<String>,
    /// Relays events are published to.
    pub relays: Vec<String>,
    /// How long to wait for each relay's `OK`.
    pub ack_timeout: Duration,
}

impl Settings {
    /// Read `NOSTR_SECRET_KEY`, `NOSTR_RELAYS` and `NOSTR_ACK_TIMEOUT_SECS`,
    /// loading `env_file` first when it exists.
    pub fn from_env(env_file: &str) -> Result<Self> {
        // missing file is fine; values can come from the process environment
        let _ = dotenvy::from_filename(env_file);

        let secret_key = env::var("NOSTR_SECRET_KEY").ok().filter(|s| !s.trim().is_empty());
        let relays = csv_strings(env::var("NOSTR_RELAYS").unwrap_or_default());
        let ack_timeout = match env::var("NOSTR_ACK_TIMEOUT_SECS") {
            Ok(v) => Duration::from_secs(
                v.trim()
                    .parse()
                    .with_context(|| format!("NOSTR_ACK_TIMEOUT_SECS is not a number: {v}"))?,
            ),
            Err(_) => Duration::from_secs(DEFAULT_ACK_TIMEOUT_SECS),
        };

        Ok(Self {
            secret_key,
            relays,
            ack_timeout,
        })
    }
}

/// Split a comma-separated string into trimmed, non-empty values.
pub fn csv_strings(input: impl AsRef<str>) -> Vec<String> {
    input
        .as_ref()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
