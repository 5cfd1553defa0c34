use ain_core::{
    FeedChamberResult, KeyValueStore, Result, SurveyResult, FEED_RESULTS_KEY, SURVEY_RESULTS_KEY,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Two survey submissions closer together than this are treated as one.
pub const DEDUP_WINDOW_SECS: i64 = 5;

/// Append-only lists of finished survey and feed-chamber sessions.
#[derive(Clone)]
pub struct ResultsStore {
    store: Arc<dyn KeyValueStore>,
}

impl ResultsStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    async fn load_list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let raw = match self.store.get_item(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(key, error = %err, "Failed to read stored results");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(list) => list,
            Err(err) => {
                warn!(key, error = %err, "Failed to parse stored results");
                Vec::new()
            }
        }
    }

    async fn save_list<T: Serialize>(&self, key: &str, list: &[T]) -> Result<()> {
        let raw = serde_json::to_string(list)?;
        self.store.set_item(key, &raw).await
    }

    pub async fn survey_results(&self) -> Vec<SurveyResult> {
        self.load_list(SURVEY_RESULTS_KEY).await
    }

    /// Returns `false` when an entry dated within the dedup window already exists.
    pub async fn append_survey_result(&self, result: SurveyResult) -> Result<bool> {
        let mut results = self.survey_results().await;
        let window_ms = DEDUP_WINDOW_SECS * 1000;
        let duplicate = results
            .iter()
            .any(|existing| (existing.date - result.date).num_milliseconds().abs() < window_ms);
        if duplicate {
            info!(date = %result.date, "Skipping duplicate survey submission");
            return Ok(false);
        }
        results.push(result);
        self.save_list(SURVEY_RESULTS_KEY, &results).await?;
        Ok(true)
    }

    pub async fn clear_survey_results(&self) -> Result<()> {
        self.store.remove_item(SURVEY_RESULTS_KEY).await
    }

    pub async fn feed_results(&self) -> Vec<FeedChamberResult> {
        self.load_list(FEED_RESULTS_KEY).await
    }

    pub async fn append_feed_result(&self, result: FeedChamberResult) -> Result<()> {
        let mut results = self.feed_results().await;
        results.push(result);
        self.save_list(FEED_RESULTS_KEY, &results).await
    }
}
