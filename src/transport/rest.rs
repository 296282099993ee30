//! HTTP transport for `/api/execute` and `/api/stats`.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{Dispatch, Transport};
use crate::config::ConsoleConfig;
use crate::error::{ConsoleError, Result};
use crate::protocol::{CommandRequest, CommandResult, StatsSnapshot};

/// Request/response transport over the REST API.
#[derive(Debug, Clone)]
pub struct RestTransport {
    base_url: String,
    connect_timeout: Duration,
    request_timeout: Duration,
    client: reqwest::Client,
}

impl RestTransport {
    /// Start building a transport aimed at `base_url`.
    pub fn builder(base_url: impl Into<String>) -> RestTransportBuilder {
        RestTransportBuilder::new(base_url)
    }

    pub fn from_config(config: &ConsoleConfig) -> Self {
        Self::builder(config.base_url.clone())
            .connect_timeout(config.connect_timeout())
            .request_timeout(config.request_timeout())
            .build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /api/execute` with `{command}`.
    ///
    /// The backend answers errors with a non-2xx status *and* a JSON body
    /// (`{"status": "error", "message": ...}`); such bodies are returned as
    /// results. Only a non-2xx response without a parseable body is
    /// `ConsoleError::Http`.
    pub async fn execute(&self, command: &str) -> Result<CommandResult> {
        let url = format!("{}/api/execute", self.base_url);
        let body = CommandRequest {
            command: command.to_string(),
        };
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ConsoleError::Connect {
                url: url.clone(),
                detail: e.to_string(),
            })?;
        decode_body(resp, url).await
    }

    /// `GET /api/stats`.
    pub async fn fetch_stats(&self) -> Result<StatsSnapshot> {
        let url = format!("{}/api/stats", self.base_url);
        let resp = self.client.get(&url).send().await.map_err(|e| ConsoleError::Connect {
            url: url.clone(),
            detail: e.to_string(),
        })?;
        decode_body(resp, url).await
    }
}

async fn decode_body<T: DeserializeOwned>(resp: reqwest::Response, url: String) -> Result<T> {
    let status = resp.status();
    let bytes = resp.bytes().await.map_err(|e| ConsoleError::Json {
        field: "body".into(),
        detail: e.to_string(),
    })?;

    match serde_json::from_slice::<T>(&bytes) {
        Ok(value) => {
            if !status.is_success() {
                debug!(status = status.as_u16(), url = %url, "non-2xx response carried a JSON body");
            }
            Ok(value)
        }
        Err(_) if !status.is_success() => Err(ConsoleError::Http {
            status: status.as_u16(),
            url,
        }),
        Err(e) => Err(ConsoleError::Json {
            field: "body".into(),
            detail: e.to_string(),
        }),
    }
}

#[async_trait]
impl Transport for RestTransport {
    fn name(&self) -> &'static str {
        "rest"
    }

    fn is_connected(&self) -> bool {
        false
    }

    async fn dispatch(&self, command: &str) -> Result<Dispatch> {
        self.execute(command).await.map(Dispatch::Completed)
    }

    async fn load_stats(&self) -> Result<StatsSnapshot> {
        self.fetch_stats().await
    }
}

/// Builder for [`RestTransport`].
///
/// # Example
/// ```rust,ignore
/// let rest = RestTransport::builder("http://127.0.0.1:5000")
///     .request_timeout(Duration::from_secs(30))
///     .build();
/// ```
pub struct RestTransportBuilder {
    base_url: String,
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl RestTransportBuilder {
    /// Create a builder targeting `base_url`. A trailing `/` is dropped.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            connect_timeout: Duration::from_secs(3),
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Override the TCP connect timeout (default 3 s).
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Override the per-request timeout (default 10 s).
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn build(self) -> RestTransport {
        // Client::builder() only fails on broken TLS backends; fall back to
        // the default client instead of panicking.
        let client = reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout)
            .build()
            .unwrap_or_default();

        RestTransport {
            base_url: self.base_url,
            connect_timeout: self.connect_timeout,
            request_timeout: self.request_timeout,
            client,
        }
    }
}
