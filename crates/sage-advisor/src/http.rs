//! HTTP-backed advisory service client
//!
//! Posts typed JSON to the three hosted flow endpoints. The endpoints
//! are treated as an external black box; this module only owns the
//! transport and the mapping of HTTP failures onto [`AdvisorError`].

use crate::contracts::{
    ChatAnswer, ChatRequest, PredictionRequest, PricePrediction, Recommendation,
    RecommendationRequest,
};
use crate::error::{AdvisorError, Result};
use crate::service::AdvisoryService;
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_TIMEOUT_SECS: u64 = 120;

const PREDICT_PATH: &str = "predict-next-day";
const RECOMMEND_PATH: &str = "recommend";
const CHAT_PATH: &str = "chat-answer";

/// Configuration for the HTTP advisory client
#[derive(Debug, Clone)]
pub struct AdvisorConfig {
    /// Base URL of the hosted advisory flows
    pub base_url: String,

    /// Request timeout in seconds (default: 120)
    pub timeout_secs: u64,

    /// Optional bearer token sent with every request
    pub api_key: Option<String>,
}

impl AdvisorConfig {
    /// Create a config for the given base URL with default settings
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_key: None,
        }
    }

    /// Create config from environment variables
    ///
    /// Reads the base URL from `STOCKSAGE_ADVISOR_URL` and, if set, the
    /// API key from `STOCKSAGE_ADVISOR_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("STOCKSAGE_ADVISOR_URL").map_err(|_| {
            AdvisorError::ConfigurationError(
                "STOCKSAGE_ADVISOR_URL environment variable not set".to_string(),
            )
        })?;

        let api_key = std::env::var("STOCKSAGE_ADVISOR_API_KEY").ok();

        Ok(Self {
            base_url,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_key,
        })
    }

    /// Set request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set the bearer token
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

/// HTTP advisory service client
pub struct HttpAdvisoryService {
    client: Client,
    config: AdvisorConfig,
}

impl HttpAdvisoryService {
    /// Create a new client with the given configuration
    pub fn with_config(config: AdvisorConfig) -> Result<Self> {
        if config.base_url.is_empty() {
            return Err(AdvisorError::ConfigurationError(
                "advisory base URL must not be empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a client for the given base URL with default settings
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_config(AdvisorConfig::new(base_url))
    }

    /// Create a client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::with_config(AdvisorConfig::from_env()?)
    }

    /// Get the current configuration
    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn post_json<Req, Resp>(&self, path: &str, request: &Req) -> Result<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let mut builder = self.client.post(self.endpoint(path)).json(request);
        if let Some(key) = &self.config.api_key {
            builder = builder.header("Authorization", format!("Bearer {key}"));
        }

        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            return Err(match status.as_u16() {
                401 => AdvisorError::AuthenticationFailed,
                429 => AdvisorError::RateLimitExceeded(error_text),
                400 => AdvisorError::InvalidRequest(error_text),
                _ => AdvisorError::RequestFailed(format!("HTTP {status}: {error_text}")),
            });
        }

        response.json().await.map_err(|e| {
            AdvisorError::UnexpectedResponse(format!("Failed to parse response: {e}"))
        })
    }
}

#[async_trait]
impl AdvisoryService for HttpAdvisoryService {
    #[instrument(skip(self, request), fields(bytes = request.historical_data.len()))]
    async fn predict_next_day(&self, request: PredictionRequest) -> Result<PricePrediction> {
        debug!("Requesting next-day price prediction");
        self.post_json(PREDICT_PATH, &request).await
    }

    #[instrument(skip(self, request), fields(trend = %request.trend, prediction = %request.prediction))]
    async fn recommend(&self, request: RecommendationRequest) -> Result<Recommendation> {
        debug!("Requesting recommendation");
        self.post_json(RECOMMEND_PATH, &request).await
    }

    #[instrument(skip(self, request))]
    async fn chat(&self, request: ChatRequest) -> Result<ChatAnswer> {
        debug!("Sending chat question");
        self.post_json(CHAT_PATH, &request).await
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let service = HttpAdvisoryService::new("https://flows.example.com").unwrap();
        assert_eq!(service.name(), "http");
        assert_eq!(service.config().base_url, "https://flows.example.com");
        assert_eq!(service.config().timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let result = HttpAdvisoryService::new("");
        assert!(matches!(result, Err(AdvisorError::ConfigurationError(_))));
    }

    #[test]
    fn test_config_builder() {
        let config = AdvisorConfig::new("https://flows.example.com")
            .with_timeout(30)
            .with_api_key("test-key");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.api_key.as_deref(), Some("test-key"));
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let service = HttpAdvisoryService::new("https://flows.example.com/").unwrap();
        assert_eq!(
            service.endpoint(PREDICT_PATH),
            "https://flows.example.com/predict-next-day"
        );
        assert_eq!(
            service.endpoint(CHAT_PATH),
            "https://flows.example.com/chat-answer"
        );
    }

    #[test]
    fn test_from_env_without_url() {
        unsafe {
            std::env::remove_var("STOCKSAGE_ADVISOR_URL");
        }
        let result = HttpAdvisoryService::from_env();
        assert!(result.is_err());
    }
}
