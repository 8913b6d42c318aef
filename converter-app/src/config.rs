//! Configuration loading from environment.

use std::env;
use std::time::Duration;

use anyhow::Context;
use converter_client::{AmountDecoding, DEFAULT_BASE_URL, EvpClient};
use converter_engine::{DEFAULT_REFRESH_INTERVAL, EngineConfig};

/// Application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub refresh_interval: Duration,
    pub timeout: Option<Duration>,
    pub strict_amount: bool,
    pub verify_currency: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name to its
    /// value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let api_url = lookup("CONVERTER_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let refresh_interval = match lookup("CONVERTER_REFRESH_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("CONVERTER_REFRESH_SECS is not a number: {raw:?}"))?;
                if secs == 0 {
                    anyhow::bail!("CONVERTER_REFRESH_SECS must be at least 1");
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_REFRESH_INTERVAL,
        };

        let timeout = lookup("CONVERTER_TIMEOUT_SECS")
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .with_context(|| format!("CONVERTER_TIMEOUT_SECS is not a number: {raw:?}"))
            })
            .transpose()?;

        let strict_amount = flag(&lookup, "CONVERTER_STRICT_AMOUNT")?;
        let verify_currency = flag(&lookup, "CONVERTER_VERIFY_CURRENCY")?;

        Ok(Self {
            api_url,
            refresh_interval,
            timeout,
            strict_amount,
            verify_currency,
        })
    }

    pub fn client(&self) -> EvpClient {
        let decoding = if self.strict_amount {
            AmountDecoding::Strict
        } else {
            AmountDecoding::Lenient
        };
        let client = EvpClient::new(self.api_url.clone())
            .with_amount_decoding(decoding)
            .with_currency_check(self.verify_currency);
        match self.timeout {
            Some(timeout) => client.with_timeout(timeout),
            None => client,
        }
    }

    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            refresh_interval: self.refresh_interval,
        }
    }
}

fn flag(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<bool> {
    match lookup(key).as_deref().map(str::trim) {
        None | Some("") => Ok(false),
        Some(raw) => match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => anyhow::bail!("{key} must be a boolean, got {raw:?}"),
        },
    }
}
