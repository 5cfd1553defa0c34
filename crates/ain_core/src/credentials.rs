use tracing::warn;

use crate::{Error, Result};

pub const NEWSAPI: &str = "NewsAPI";
pub const GEMINI: &str = "Gemini";

/// Reject missing or blank keys. Keys that merely look unusual for the
/// service are accepted with a warning.
pub fn validate_api_key<'a>(key: Option<&'a str>, service: &str) -> Result<&'a str> {
    let key = key.ok_or_else(|| {
        Error::validation_field(format!("{} API key is missing or invalid", service), service)
    })?;
    let key = key.trim();
    if key.is_empty() {
        return Err(Error::validation_field(
            format!("{} API key is empty", service),
            service,
        ));
    }

    let looks_right = match service {
        NEWSAPI => key.len() == 32 && key.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')),
        GEMINI => key.starts_with("AIzaSy"),
        _ => true,
    };
    if !looks_right {
        warn!("{} key format looks unusual. Please verify it's correct.", service);
    }
    Ok(key)
}
