use ain_core::{Error, InferenceModel, Result};
use std::sync::Arc;

use crate::Config;

pub mod gemini;
pub mod offline;

pub use gemini::GeminiModel;
pub use offline::OfflineModel;

pub fn create_model(config: &Config) -> Result<Arc<dyn InferenceModel>> {
    match config.provider.to_lowercase().as_str() {
        "gemini" => Ok(Arc::new(GeminiModel::new(config)?)),
        "offline" => Ok(Arc::new(OfflineModel)),
        other => Err(Error::validation_field(
            format!("Unknown model provider: {}", other),
            "provider",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_model() {
        let offline = create_model(&Config {
            provider: "offline".into(),
            ..Config::default()
        })
        .unwrap();
        assert_eq!(offline.name(), "offline");

        let gemini = create_model(&Config {
            api_key: Some("AIzaSyTestKey".into()),
            ..Config::default()
        })
        .unwrap();
        assert_eq!(gemini.name(), "Gemini");

        assert!(create_model(&Config::default()).is_err());
        assert!(create_model(&Config {
            provider: "deepthought".into(),
            ..Config::default()
        })
        .is_err());
    }
}
