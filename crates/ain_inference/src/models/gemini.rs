use ain_core::credentials::{self, GEMINI};
use ain_core::{ApiError, ApiErrorKind, InferenceModel, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::debug;
use url::Url;

use crate::Config;

pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Default)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Deserialize, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Default)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

pub struct GeminiModel {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl GeminiModel {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = credentials::validate_api_key(config.api_key.as_deref(), GEMINI)?;
        let base_url = match &config.base_url {
            Some(url) => {
                Url::parse(url).map_err(|e| {
                    ain_core::Error::validation_field(
                        format!("Invalid Gemini base URL {}: {}", url, e),
                        "base_url",
                    )
                })?;
                url.trim_end_matches('/').to_string()
            }
            None => GEMINI_API_URL.to_string(),
        };
        Ok(Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            base_url,
            model: config.model_name.clone(),
            temperature: config.temperature,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn request_body(&self, prompt: &str) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        }
    }
}

impl fmt::Debug for GeminiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

/// Quota exhaustion can arrive as a 429 or as a RESOURCE_EXHAUSTED body.
fn classify_failure(status: u16, body: &str) -> ApiError {
    if status == 429 || body.contains("RESOURCE_EXHAUSTED") || body.contains("quota") {
        return ApiError::new(
            ApiErrorKind::RateLimit,
            "Gemini API quota exceeded. Using fallback processing.",
        )
        .with_status(status);
    }
    ApiError::from_status("Gemini", status, body)
}

#[async_trait]
impl InferenceModel for GeminiModel {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn invoke(&self, prompt: &str) -> Result<Value> {
        debug!(model = %self.model, "Gemini generateContent request");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest("Gemini", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status.as_u16(), &body).into());
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ApiError::from_reqwest("Gemini", e))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .map(|c| c.content.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ApiError::new(ApiErrorKind::Unknown, "Gemini returned an empty response").into());
        }
        Ok(Value::String(text))
    }
}
