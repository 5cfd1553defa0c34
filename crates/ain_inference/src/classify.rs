use ain_core::{
    ApiError, ApiErrorKind, DisplayClassification, Impact, InferenceModel, Result, RetryPolicy,
    Status, SurveyClassification,
};
use serde_json::{Map, Value};
use std::ops::RangeInclusive;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::enhance::log_quota;
use crate::keywords;
use crate::output::{extract_text, parse_json_object};
use crate::prompts::{render, DISPLAY_TEMPLATE, SURVEY_TEMPLATE};

pub const ACCURACY_RANGE: RangeInclusive<u8> = 70..=95;
pub const SOURCES_RANGE: RangeInclusive<u8> = 3..=20;

fn unusable(message: impl Into<String>) -> ain_core::Error {
    ApiError::new(ApiErrorKind::Unknown, message).into()
}

fn string_field<'a>(reply: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    reply
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Numbers sometimes come back quoted.
fn number_field(reply: &Map<String, Value>, field: &str) -> Option<f64> {
    match reply.get(field)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').parse().ok(),
        _ => None,
    }
}

fn clamp_into(value: f64, range: &RangeInclusive<u8>) -> u8 {
    value.round().clamp(*range.start() as f64, *range.end() as f64) as u8
}

pub fn survey_from_reply(reply: &Map<String, Value>) -> Result<SurveyClassification> {
    let impact = string_field(reply, "impact")
        .and_then(Impact::parse)
        .ok_or_else(|| unusable("Model reply has no valid impact"))?;
    let category = string_field(reply, "category")
        .ok_or_else(|| unusable("Model reply has no category"))?;
    let accuracy = number_field(reply, "accuracy")
        .map_or_else(keywords::random_accuracy, |v| clamp_into(v, &ACCURACY_RANGE));
    let sources = number_field(reply, "sources")
        .map_or_else(keywords::random_sources, |v| clamp_into(v, &SOURCES_RANGE));
    Ok(SurveyClassification {
        impact,
        category: category.to_string(),
        accuracy,
        sources,
    })
}

pub fn display_from_reply(reply: &Map<String, Value>) -> Result<DisplayClassification> {
    let category = string_field(reply, "category")
        .ok_or_else(|| unusable("Model reply has no category"))?;
    let status = string_field(reply, "status")
        .and_then(Status::parse)
        .ok_or_else(|| unusable("Model reply has no valid status"))?;
    Ok(DisplayClassification {
        category: category.to_string(),
        status,
    })
}

/// Asks the language model to classify articles, falling back to the keyword
/// table whenever the model fails or replies with something unusable.
#[derive(Clone)]
pub struct Classifier {
    model: Arc<dyn InferenceModel>,
    retry: RetryPolicy,
}

impl Classifier {
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

    async fn ask<T>(
        &self,
        context: &str,
        prompt: &str,
        interpret: fn(&Map<String, Value>) -> Result<T>,
    ) -> Result<T> {
        self.retry
            .run(context, |_| async move {
                let output = self.model.invoke(prompt).await?;
                let text = extract_text(&output);
                if text.trim().is_empty() {
                    return Err(unusable("Empty response from language model"));
                }
                interpret(&parse_json_object(&text)?)
            })
            .await
    }

    pub async fn classify_survey(&self, title: &str, description: &str) -> SurveyClassification {
        let prompt = render(SURVEY_TEMPLATE, title, description);
        match self.ask("Survey Classification", &prompt, survey_from_reply).await {
            Ok(classification) => {
                debug!(title, category = %classification.category, "Classified article");
                classification
            }
            Err(err) => {
                warn!(title, error = %err, "AI classification failed, using fallback");
                log_quota(&err, "Language model quota exceeded - using keyword-based fallback classification");
                keywords::classify::<keywords::Survey>(title, description)
            }
        }
    }

    pub async fn classify_display(&self, title: &str, description: &str) -> DisplayClassification {
        let prompt = render(DISPLAY_TEMPLATE, title, description);
        match self.ask("Display Classification", &prompt, display_from_reply).await {
            Ok(classification) => classification,
            Err(err) => {
                warn!(title, error = %err, "AI classification failed for display, using fallback");
                log_quota(&err, "Language model quota exceeded - using basic display classification");
                keywords::classify::<keywords::Display>(title, description)
            }
        }
    }
}
