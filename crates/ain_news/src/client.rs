use ain_core::credentials::{self, NEWSAPI};
use ain_core::{ApiError, Error, NewsSource, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};
use url::Url;

use crate::config::{NewsConfig, ProbeConfig, USER_AGENT};

/// NewsAPI `everything` search.
pub struct NewsApiClient {
    client: Client,
    config: NewsConfig,
    probe: ProbeConfig,
}

impl NewsApiClient {
    pub fn new(config: NewsConfig, probe: ProbeConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::External(e.into()))?;
        Ok(Self {
            client,
            config,
            probe,
        })
    }

    pub fn search_url(&self) -> Result<Url> {
        let api_key = self.config.api_key.as_deref().unwrap_or_default().trim();
        let page_size = self.config.page_size.to_string();
        let base = self.config.base_url.trim_end_matches('/');
        Url::parse_with_params(
            &format!("{}/everything", base),
            &[
                ("q", self.config.query.as_str()),
                ("language", self.config.language.as_str()),
                ("sortBy", self.config.sort_by.as_str()),
                ("pageSize", page_size.as_str()),
                ("apiKey", api_key),
            ],
        )
        .map_err(|e| {
            Error::validation_field(format!("Invalid NewsAPI base URL {}: {}", base, e), "base_url")
        })
    }
}

impl fmt::Debug for NewsApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsApiClient")
            .field("base_url", &self.config.base_url)
            .field("api_key", &self.config.api_key.as_deref().map(|_| "<redacted>"))
            .field("probe", &self.probe.url)
            .finish()
    }
}

#[async_trait]
impl NewsSource for NewsApiClient {
    fn name(&self) -> &str {
        NEWSAPI
    }

    fn validate_credentials(&self) -> Result<()> {
        credentials::validate_api_key(self.config.api_key.as_deref(), NEWSAPI).map(|_| ())
    }

    async fn search(&self) -> Result<Value> {
        let url = self.search_url()?;
        debug!(base_url = %self.config.base_url, "NewsAPI search request");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(NEWSAPI, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Client errors other than 429 carry an error envelope that
            // validation turns into a non-retryable failure.
            if status.is_client_error() && status.as_u16() != 429 {
                if let Ok(envelope) = serde_json::from_str::<Value>(&body) {
                    if envelope.is_object() {
                        return Ok(envelope);
                    }
                }
            }
            return Err(ApiError::from_status(NEWSAPI, status.as_u16(), &body).into());
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::from_reqwest(NEWSAPI, e).into())
    }

    async fn check_connectivity(&self) -> bool {
        match self
            .client
            .get(&self.probe.url)
            .timeout(self.probe.timeout)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                warn!(url = %self.probe.url, error = %err, "Internet connectivity test failed");
                false
            }
        }
    }
}
