use ain_core::RetryPolicy;

pub mod classify;
pub mod enhance;
pub mod keywords;
pub mod models;
pub mod output;
pub mod prompts;

pub use classify::Classifier;
pub use enhance::Enhancer;
pub use models::create_model;

/// Which model backs enhancement and classification, and how it is called.
#[derive(Debug, Clone)]
pub struct Config {
    /// `gemini` or `offline`.
    pub provider: String,
    pub api_key: Option<String>,
    pub model_name: String,
    /// Overrides the Gemini endpoint, mostly for local mocks.
    pub base_url: Option<String>,
    pub temperature: f32,
    pub retry: RetryPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            api_key: None,
            model_name: models::gemini::DEFAULT_MODEL.to_string(),
            base_url: None,
            temperature: 0.3,
            retry: RetryPolicy::language_model(),
        }
    }
}

pub mod prelude {
    pub use super::models::create_model;
    pub use super::{Classifier, Config, Enhancer};
    pub use ain_core::{Error, InferenceModel, Result};
}
