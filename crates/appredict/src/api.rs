//! REST API client for the Ap Predict simulation engine.
//!
//! Wraps the engine's HTTP endpoints (run launch, progress polling,
//! STOP, result retrieval) using [`reqwest`]. The engine signals
//! success and failure through the response envelope rather than HTTP
//! status codes, so bodies are parsed envelope-first.

use std::time::Duration;

use reqwest::Url;
use serde_json::Value;

use crate::commands::ResultCommand;
use crate::{envelope, schema};

/// Path segment of the progress poll call.
pub const PROGRESS_COMMAND: &str = "progress_status";

/// Path segment of the stop call.
pub const STOP_COMMAND: &str = "STOP";

/// HTTP client for a single Ap Predict endpoint.
pub struct ApPredictApi {
    client: reqwest::Client,
    endpoint: String,
}

/// Errors from launching a run.
///
/// The rendered messages are stored verbatim (truncated to the column
/// width) in the simulation's error field, so the formats here are part
/// of the user-visible contract.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    /// The engine answered with an `error` envelope.
    #[error("API error message: {0}")]
    Api(String),

    /// The body was not parseable JSON.
    #[error("Starting simulation failed: returned invalid JSON.")]
    InvalidJson,

    /// The body parsed but carried no usable `success.id`.
    #[error("Starting simulation failed: no simulation id returned.")]
    MissingId,

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("API connection failed: {0}.")]
    Connection(#[source] reqwest::Error),

    /// The configured endpoint is not a valid URL.
    #[error("Invalid URL: {0}.")]
    InvalidUrl(String),
}

/// Errors from the per-run collection calls (progress, stop, results).
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    /// The engine answered with an `error` envelope.
    #[error("API error message: {0}")]
    Api(String),

    /// The body was not parseable JSON.
    #[error("API call: {command} returned invalid JSON.")]
    InvalidJson { command: String },

    /// The HTTP request itself failed.
    #[error("API connection failed for call: {command}: {source}.")]
    Connection {
        command: String,
        #[source]
        source: reqwest::Error,
    },

    /// The built call URL is not valid.
    #[error("Invalid URL: {url}.")]
    InvalidUrl { url: String },

    /// The payload arrived but violates the command's schema.
    #[error("Result to call {command} failed JSON validation: {detail}")]
    Schema { command: String, detail: String },
}

impl ApPredictApi {
    /// Create a client for the configured endpoint with a per-request
    /// timeout.
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }

    /// The configured base endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Launch a run by POSTing the prepared payload to the endpoint.
    ///
    /// Returns the engine-assigned call id on success.
    pub async fn launch(&self, payload: &Value) -> Result<String, LaunchError> {
        if Url::parse(&self.endpoint).is_err() {
            return Err(LaunchError::InvalidUrl(self.endpoint.clone()));
        }

        let response = self
            .client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await
            .map_err(LaunchError::Connection)?;

        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(e) if e.is_decode() => return Err(LaunchError::InvalidJson),
            Err(e) => return Err(LaunchError::Connection(e)),
        };

        if let Some(message) = envelope::error_message(&body) {
            return Err(LaunchError::Api(message));
        }
        let call_id = envelope::launch_id(&body).ok_or(LaunchError::MissingId)?;
        tracing::debug!(call_id = %call_id, "Ap Predict accepted launch");
        Ok(call_id)
    }

    /// Poll the current progress label.
    ///
    /// `Ok(None)` means the engine has not reported a label yet.
    pub async fn progress_status(&self, call_id: &str) -> Result<Option<String>, CallError> {
        let body = self.get_collection(call_id, PROGRESS_COMMAND).await?;
        Ok(envelope::latest_progress(&body))
    }

    /// Ask the engine to stop a run. Returns whether the stop was
    /// confirmed.
    pub async fn stop(&self, call_id: &str) -> Result<bool, CallError> {
        let body = self.get_collection(call_id, STOP_COMMAND).await?;
        Ok(envelope::stop_confirmed(&body))
    }

    /// Fetch one result payload and validate it against the command's
    /// schema.
    ///
    /// `Ok(None)` means the envelope carried no `success` value: the
    /// artifact is unavailable for this run, which is not an error.
    pub async fn fetch_result(
        &self,
        call_id: &str,
        command: ResultCommand,
    ) -> Result<Option<Value>, CallError> {
        let body = self.get_collection(call_id, command.as_str()).await?;
        let Some(payload) = envelope::success_value(&body) else {
            return Ok(None);
        };
        schema::validate(command, payload).map_err(|detail| CallError::Schema {
            command: command.as_str().to_string(),
            detail,
        })?;
        Ok(Some(payload.clone()))
    }

    // ---- private helpers ----

    /// GET one collection call, parse the body as JSON, and surface an
    /// `error` envelope as a failure.
    async fn get_collection(&self, call_id: &str, command: &str) -> Result<Value, CallError> {
        let url = format!("{}/api/collection/{}/{}", self.endpoint, call_id, command);
        if Url::parse(&url).is_err() {
            return Err(CallError::InvalidUrl { url });
        }

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| CallError::Connection {
                command: command.to_string(),
                source,
            })?;

        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(e) if e.is_decode() => {
                return Err(CallError::InvalidJson {
                    command: command.to_string(),
                })
            }
            Err(e) => {
                return Err(CallError::Connection {
                    command: command.to_string(),
                    source: e,
                })
            }
        };

        if let Some(message) = envelope::error_message(&body) {
            return Err(CallError::Api(message));
        }
        Ok(body)
    }
}
