//! Shape checks for the news search envelope and its articles.

use ain_core::{Error, RawArticle, Result};
use serde_json::{Map, Value};
use tracing::warn;

fn text_field(article: &Map<String, Value>, field: &str) -> Option<String> {
    article
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// Lenient per-article read: wrong-typed fields are treated as missing and a
/// non-object element becomes an empty article.
pub fn parse_article(index: usize, value: &Value) -> RawArticle {
    let Some(article) = value.as_object() else {
        warn!(index, "Article is null or not an object");
        return RawArticle::default();
    };

    let parsed = RawArticle {
        title: text_field(article, "title"),
        description: text_field(article, "description"),
        content: text_field(article, "content"),
        author: text_field(article, "author"),
        published_at: text_field(article, "publishedAt"),
    };

    if parsed.title.is_none() {
        warn!(index, "Article missing valid title");
    }
    if parsed.description.is_none() && parsed.content.is_none() {
        warn!(index, title = parsed.title.as_deref().unwrap_or(""), "Article has no description or content");
    }
    parsed
}

pub fn validate_envelope(data: &Value) -> Result<Vec<RawArticle>> {
    let envelope = data
        .as_object()
        .ok_or_else(|| Error::validation("NewsAPI response is empty or invalid"))?;

    let status = envelope.get("status").and_then(Value::as_str).unwrap_or("missing");
    if status != "ok" {
        let mut message = format!("NewsAPI returned status: {}", status);
        if let Some(code) = envelope.get("code").and_then(Value::as_str) {
            message.push_str(&format!(" ({})", code));
        }
        if let Some(detail) = envelope.get("message").and_then(Value::as_str) {
            message.push_str(&format!(": {}", detail));
        }
        return Err(Error::validation_field(message, "status"));
    }

    let articles = envelope
        .get("articles")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::validation_field("NewsAPI response missing articles array", "articles"))?;

    if articles.is_empty() {
        warn!("NewsAPI returned no articles");
    }

    Ok(articles
        .iter()
        .enumerate()
        .map(|(index, article)| parse_article(index, article))
        .collect())
}
