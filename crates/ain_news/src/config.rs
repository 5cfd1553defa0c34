use ain_core::RetryPolicy;
use std::time::Duration;

pub const NEWSAPI_BASE_URL: &str = "https://newsapi.org/v2";
pub const DEFAULT_QUERY: &str = "artificial intelligence impact OR artificial intelligence societal OR artificial intelligence ethics OR AI implications OR AI effects";
pub const USER_AGENT: &str = "Spark-Community-News/1.0";
pub const PROBE_URL: &str = "https://httpbin.org/status/200";

/// News search endpoint and query.
#[derive(Debug, Clone)]
pub struct NewsConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub query: String,
    pub language: String,
    pub sort_by: String,
    pub page_size: u32,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: NEWSAPI_BASE_URL.to_string(),
            query: DEFAULT_QUERY.to_string(),
            language: "en".to_string(),
            sort_by: "publishedAt".to_string(),
            page_size: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub url: String,
    pub timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            url: PROBE_URL.to_string(),
            timeout: Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub news_retry: RetryPolicy,
    pub model_retry: RetryPolicy,
    /// Fail fast with a connectivity error when the probe fails, instead
    /// of only warning.
    pub probe_required: bool,
    /// Caller-side limit for one whole fetch.
    pub deadline: Duration,
    /// Limit on enhancement plus classification of one article. Capped at
    /// half the deadline; past it the article is classified by keyword.
    pub article_budget: Duration,
    pub cache_ttl: chrono::Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            news_retry: RetryPolicy::news_api(),
            model_retry: RetryPolicy::language_model(),
            probe_required: false,
            deadline: Duration::from_secs(30),
            article_budget: Duration::from_secs(15),
            cache_ttl: chrono::Duration::minutes(ain_storage::cache::DEFAULT_TTL_MINUTES),
        }
    }
}
