use ain_core::{ApiErrorKind, Error, InferenceModel, Result, RetryPolicy};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::output::extract_text;
use crate::prompts::{render, ENHANCE_TEMPLATE};

/// Descriptions shorter than this many characters are sent for enhancement.
pub const MIN_DESCRIPTION_CHARS: usize = 50;

const FALLBACK_SUBJECT: &str = "AI technology development";
const FALLBACK_SUFFIX: &str = ". This advancement in artificial intelligence has significant implications for various sectors and society as a whole, potentially affecting employment, ethics, and technological progress.";

pub fn needs_enhancement(description: &str) -> bool {
    description.chars().count() < MIN_DESCRIPTION_CHARS
}

pub fn fallback_description(partial: &str) -> String {
    let subject = if partial.is_empty() { FALLBACK_SUBJECT } else { partial };
    format!("{}{}", subject, FALLBACK_SUFFIX)
}

pub(crate) fn log_quota(err: &Error, message: &str) {
    if err.api_kind() == Some(ApiErrorKind::RateLimit) {
        warn!("{}", message);
    }
}

/// Expands short article descriptions through the language model.
#[derive(Clone)]
pub struct Enhancer {
    model: Arc<dyn InferenceModel>,
    retry: RetryPolicy,
}

impl Enhancer {
    pub fn new(model: Arc<dyn InferenceModel>) -> Self {
        Self {
            model,
            retry: RetryPolicy::language_model(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let output = self.model.invoke(prompt).await?;
        Ok(extract_text(&output).trim().to_string())
    }

    /// Never fails. An empty reply keeps the partial description; any model
    /// error yields the templated one.
    pub async fn enhance(&self, title: &str, partial: &str) -> String {
        let prompt = render(ENHANCE_TEMPLATE, title, partial);
        match self
            .retry
            .run("Description enhancement", |_| self.generate(&prompt))
            .await
        {
            Ok(description) if description.is_empty() => {
                debug!(title, "Language model returned no description");
                if partial.is_empty() {
                    fallback_description(partial)
                } else {
                    partial.to_string()
                }
            }
            Ok(description) => {
                debug!(title, "Enhanced article description");
                description
            }
            Err(err) => {
                warn!(title, error = %err, "Failed to generate enhanced description");
                log_quota(&err, "Language model quota exceeded - using basic description enhancement");
                fallback_description(partial)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FixedModel {
        reply: Option<Value>,
        calls: AtomicU32,
    }

    #[async_trait]
    impl InferenceModel for FixedModel {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn invoke(&self, _prompt: &str) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply
                .clone()
                .ok_or_else(|| Error::api(ApiErrorKind::RateLimit, "RESOURCE_EXHAUSTED"))
        }
    }

    fn enhancer(reply: Option<Value>) -> (Enhancer, Arc<FixedModel>) {
        let model = Arc::new(FixedModel {
            reply,
            calls: AtomicU32::new(0),
        });
        let enhancer = Enhancer::new(model.clone()).with_retry(RetryPolicy::immediate(2));
        (enhancer, model)
    }

    #[test]
    fn test_needs_enhancement() {
        assert!(needs_enhancement(""));
        assert!(needs_enhancement(&"x".repeat(49)));
        assert!(!needs_enhancement(&"x".repeat(50)));
        assert!(needs_enhancement(&"é".repeat(49)));
    }

    #[test]
    fn test_fallback_description() {
        assert!(fallback_description("").starts_with("AI technology development. This advancement"));
        assert!(fallback_description("Short text").starts_with("Short text. This advancement"));
    }

    #[tokio::test]
    async fn returns_model_text() {
        let (enhancer, model) = enhancer(Some(json!({"content": "  A longer description.  "})));
        assert_eq!(enhancer.enhance("Title", "short").await, "A longer description.");
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn falls_back_after_retries() {
        let (enhancer, model) = enhancer(None);
        let description = enhancer.enhance("Title", "short").await;
        assert_eq!(description, fallback_description("short"));
        assert_eq!(model.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_replies_keep_the_partial_description() {
        let (enhancer, model) = enhancer(Some(json!("   ")));
        assert_eq!(enhancer.enhance("Title", "Robots at work").await, "Robots at work");
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
        assert_eq!(enhancer.enhance("Title", "").await, fallback_description(""));
    }
}
