//! Blocking client for a remote series validator.

use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{debug, warn};

use crate::error::{GapwiseError, Result};
use crate::input::Row;
use crate::series::{ForecastConfig, ValidationSummary};

use super::wire::{ErrorResponse, VALIDATE_SERIES_PATH, ValidationRequest, ValidationResponse};

/// Attempts made per request: the first try and one retry.
const MAX_ATTEMPTS: usize = 2;

/// Connection settings for [`ValidationClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server root, e.g. `http://localhost:3141`.
    pub base_url: String,
    /// Per-attempt request timeout.
    pub timeout: Duration,
    /// Pause before the retry.
    pub retry_delay: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            retry_delay: Duration::from_millis(250),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Full URL of the validation endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), VALIDATE_SERIES_PATH)
    }
}

/// Ships rows and a forecast config to a validator over HTTP.
///
/// Transport failures are retried once and surface as
/// [`GapwiseError::Transport`]. A non-2xx answer is never retried and
/// surfaces as [`GapwiseError::Rejected`]. A summary that reports critical
/// breaks is a success.
pub struct ValidationClient {
    client: Client,
    config: ClientConfig,
}

impl ValidationClient {
    /// Create a client for the given server root.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::new(base_url))
    }

    /// Create a client with custom settings.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GapwiseError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Validate `rows` remotely. The config is checked locally first.
    pub fn validate(&self, rows: &[Row], config: &ForecastConfig) -> Result<ValidationSummary> {
        config.validate()?;
        let request = ValidationRequest::new(rows.to_vec(), config);
        let url = self.config.endpoint();

        let mut attempt = 1;
        let response = loop {
            debug!(%url, attempt, "sending validation request");
            match self.client.post(&url).json(&request).send() {
                Ok(response) => break response,
                Err(e) if attempt < MAX_ATTEMPTS => {
                    warn!(error = %e, attempt, "validation request failed, retrying");
                    thread::sleep(self.config.retry_delay);
                    attempt += 1;
                }
                Err(e) => {
                    return Err(GapwiseError::Transport {
                        attempts: attempt,
                        message: e.to_string(),
                    });
                }
            }
        };

        let status = response.status();
        let body = response.text().map_err(|e| GapwiseError::Transport {
            attempts: attempt,
            message: format!("failed to read response body: {}", e),
        })?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(GapwiseError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ValidationResponse = serde_json::from_str(&body)?;
        Ok(parsed.summary)
    }

    /// The client's settings.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}
