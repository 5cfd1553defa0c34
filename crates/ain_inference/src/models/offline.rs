use ain_core::{ApiErrorKind, Error, InferenceModel, Result};
use async_trait::async_trait;
use serde_json::Value;

/// Stands in when no model is configured. Every call fails with a retryable
/// service error, which routes callers to their local fallbacks.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineModel;

#[async_trait]
impl InferenceModel for OfflineModel {
    fn name(&self) -> &str {
        "offline"
    }

    async fn invoke(&self, _prompt: &str) -> Result<Value> {
        Err(Error::api(
            ApiErrorKind::ServiceUnavailable,
            "No language model configured",
        ))
    }
}
