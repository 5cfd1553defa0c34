use ain_core::{ApiError, ApiErrorKind, Result};
use serde_json::{Map, Value};

/// Pull the text out of whatever shape the model client produced: a bare
/// string, an object carrying `content` or `text`, or anything else rendered
/// as JSON.
pub fn extract_text(output: &Value) -> String {
    match output {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        Value::Object(map) => ["content", "text"]
            .iter()
            .filter_map(|key| map.get(*key).and_then(Value::as_str))
            .find(|text| !text.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| output.to_string()),
        other => other.to_string(),
    }
}

/// Strip markdown code fences from a response.
pub fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Parse a model reply that should be a single JSON object.
pub fn parse_json_object(text: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str(strip_code_blocks(text)) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::new(ApiErrorKind::Unknown, "Model response is not a JSON object").into()),
        Err(e) => Err(ApiError::new(
            ApiErrorKind::Unknown,
            "Failed to parse model response as JSON",
        )
        .with_source(e)
        .into()),
    }
}
