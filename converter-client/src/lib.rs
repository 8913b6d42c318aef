//! # Converter Client
//!
//! A typed Rust client for the commercial currency exchange service.
//!
//! One call performs one conversion:
//! `GET {base}/{amount}-{from}/{to}/latest` answered by
//! `{"amount":"<decimal>","currency":"<CODE>"}`.

use std::time::Duration;

use async_trait::async_trait;
use converter_types::{Amount, ConversionResponse, RateClient, RateError};
use reqwest::{Client, Url};

/// Production endpoint of the exchange service.
pub const DEFAULT_BASE_URL: &str = "http://api.evp.lt/currency/commercial/exchange";

/// How to treat an `amount` field that is not a number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AmountDecoding {
    /// Read it as `0.0` and report success.
    #[default]
    Lenient,
    /// Fail the fetch with [`RateError::Decode`].
    Strict,
}

/// Exchange service client.
pub struct EvpClient {
    base_url: String,
    timeout: Option<Duration>,
    amount_decoding: AmountDecoding,
    check_currency: bool,
    http: Client,
}

impl Default for EvpClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl EvpClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: None,
            amount_decoding: AmountDecoding::default(),
            check_currency: false,
            http: Client::new(),
        }
    }

    /// Sets a per-request timeout. Without one, reqwest's defaults apply.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Chooses how a non-numeric `amount` in the response is handled.
    pub fn with_amount_decoding(mut self, decoding: AmountDecoding) -> Self {
        self.amount_decoding = decoding;
        self
    }

    /// When enabled, the echoed `currency` must match the requested target.
    pub fn with_currency_check(mut self, enabled: bool) -> Self {
        self.check_currency = enabled;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the conversion URL. Codes are inserted verbatim, so anything
    /// that is not a plain printable ASCII path segment is refused.
    pub fn conversion_url(&self, amount: Amount, from: &str, to: &str) -> Result<Url, RateError> {
        check_code(from)?;
        check_code(to)?;

        let raw = format!(
            "{}/{}-{}/{}/latest",
            self.base_url,
            amount.url_repr(),
            from,
            to
        );
        Url::parse(&raw).map_err(|e| RateError::InvalidUrl(format!("{}: {}", raw, e)))
    }

    /// Decodes a response body into the converted amount.
    pub fn decode(&self, body: &[u8], to: &str) -> Result<f64, RateError> {
        if body.is_empty() {
            return Err(RateError::EmptyBody);
        }

        let response: ConversionResponse =
            serde_json::from_slice(body).map_err(|e| RateError::Decode(e.to_string()))?;

        if self.check_currency && !response.currency.eq_ignore_ascii_case(to) {
            return Err(RateError::CurrencyMismatch {
                expected: to.to_string(),
                got: response.currency,
            });
        }

        match (response.parsed_amount(), self.amount_decoding) {
            (Some(converted), _) => Ok(converted),
            (None, AmountDecoding::Strict) => Err(RateError::Decode(format!(
                "amount is not a number: {:?}",
                response.amount
            ))),
            (None, AmountDecoding::Lenient) => {
                tracing::warn!(amount = %response.amount, "Upstream amount is not a number, using 0.0");
                Ok(0.0)
            }
        }
    }
}

#[async_trait]
impl RateClient for EvpClient {
    async fn fetch(&self, amount: Amount, from: &str, to: &str) -> Result<f64, RateError> {
        let url = self.conversion_url(amount, from, to)?;
        tracing::debug!(%url, "Requesting conversion");

        let mut req = self.http.get(url);
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        let resp = req.send().await.map_err(transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RateError::Transport(format!("HTTP status {}", status)));
        }

        let body = resp.bytes().await.map_err(transport)?;
        self.decode(&body, to)
    }
}

fn transport(err: reqwest::Error) -> RateError {
    RateError::Transport(err.to_string())
}

fn check_code(code: &str) -> Result<(), RateError> {
    let valid = !code.is_empty()
        && code
            .chars()
            .all(|c| c.is_ascii_graphic() && !matches!(c, '/' | '?' | '#'));
    if valid {
        Ok(())
    } else {
        Err(RateError::InvalidUrl(format!(
            "currency code {:?} is not a valid path segment",
            code
        )))
    }
}
