//! HTTP client for the explanation service
//!
//! One POST per request, sync via ureq - no async runtime needed here; the
//! dispatcher moves calls off-loop. A 2xx body carrying an `error` field is
//! treated exactly like a transport failure, since the service reports its
//! own upstream errors that way.

use crate::config::CoreConfig;
use crate::enrich::{EnrichError, EnrichResult, ExplainBackend, ExplainRequest, ExplainResponse};
use std::time::Duration;
use tracing::debug;

/// Explanation-service client over plain HTTP
pub struct HttpExplainClient {
    endpoint: String,
    api_key: Option<String>,
    agent: ureq::Agent,
}

fn make_agent(timeout: Duration) -> ureq::Agent {
    ureq::config::Config::builder()
        .http_status_as_error(false) // We handle status codes ourselves
        .timeout_global(Some(timeout))
        .build()
        .new_agent()
}

impl HttpExplainClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: None,
            agent: make_agent(timeout),
        }
    }

    /// Build a client from loaded configuration.
    pub fn from_config(config: &CoreConfig) -> EnrichResult<Self> {
        let endpoint = config.endpoint().ok_or(EnrichError::MissingEndpoint)?;
        let mut client = Self::new(endpoint, config.enrich_timeout());
        client.api_key = config.enrichment.api_key.clone();
        Ok(client)
    }

    /// Set the bearer token sent with each request
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ExplainBackend for HttpExplainClient {
    fn explain(&self, request: &ExplainRequest) -> EnrichResult<String> {
        debug!(symbol = %request.symbol, "calling explanation service");

        let mut req = self
            .agent
            .post(&self.endpoint)
            .header("Content-Type", "application/json");

        if let Some(key) = &self.api_key {
            req = req.header("Authorization", &format!("Bearer {key}"));
        }

        let response = req.send_json(request).map_err(|e| EnrichError::ApiError {
            status: 0,
            message: e.to_string(),
        })?;

        let status = response.status().as_u16();
        if status >= 400 {
            let error_text = response.into_body().read_to_string().unwrap_or_default();
            return Err(EnrichError::ApiError {
                status,
                message: error_text,
            });
        }

        let resp: ExplainResponse = response
            .into_body()
            .read_json()
            .map_err(|e| EnrichError::ParseError(e.to_string()))?;

        if let Some(error) = resp.error {
            return Err(EnrichError::ServiceError(error));
        }

        resp.suggestion
            .filter(|s| !s.is_empty())
            .ok_or_else(|| EnrichError::ParseError("response carried no suggestion".to_string()))
    }
}
