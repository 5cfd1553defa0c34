//! Keyword classification used whenever the model is unavailable or its reply
//! cannot be used. Both output shapes read the same table.

use ain_core::{DisplayClassification, Impact, Status, SurveyClassification};
use rand::Rng;

/// Checked in order; the first category with a matching keyword wins.
pub const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    ("Healthcare", &["health", "medical", "healthcare"]),
    ("Employment", &["job", "employment", "work"]),
    ("Education", &["education", "school", "learning"]),
    ("Privacy", &["privacy", "data", "security"]),
    ("Environment", &["environment", "climate", "sustainable"]),
    ("Social Justice", &["bias", "fair", "justice"]),
];

pub const DEFAULT_CATEGORY: &str = "General";

pub const NEGATIVE_KEYWORDS: &[&str] = &["risk", "concern", "problem", "issue"];

pub const STATUS_KEYWORDS: &[(Status, &[&str])] = &[
    (Status::Urgent, &["urgent", "breaking", "critical"]),
    (Status::New, &["new", "latest", "recent"]),
    (Status::Featured, &["featured", "important", "major"]),
    (Status::Important, &["significant", "notable"]),
];

/// Output shape of a keyword classification.
pub trait Shape {
    type Output;

    fn from_text(text: &str) -> Self::Output;
}

/// Impact, category, accuracy and sources for the survey game.
pub struct Survey;

/// Category and status for the news feed.
pub struct Display;

impl Shape for Survey {
    type Output = SurveyClassification;

    fn from_text(text: &str) -> SurveyClassification {
        SurveyClassification {
            impact: impact(text),
            category: category(text).to_string(),
            accuracy: random_accuracy(),
            sources: random_sources(),
        }
    }
}

impl Shape for Display {
    type Output = DisplayClassification;

    fn from_text(text: &str) -> DisplayClassification {
        DisplayClassification {
            category: category(text).to_string(),
            status: status(text),
        }
    }
}

fn haystack(title: &str, description: &str) -> String {
    format!("{} {}", title, description).to_lowercase()
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

pub fn category(text: &str) -> &'static str {
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| contains_any(text, keywords))
        .map_or(DEFAULT_CATEGORY, |(name, _)| name)
}

pub fn impact(text: &str) -> Impact {
    if contains_any(text, NEGATIVE_KEYWORDS) {
        Impact::Negative
    } else {
        Impact::Positive
    }
}

pub fn status(text: &str) -> Status {
    STATUS_KEYWORDS
        .iter()
        .find(|(_, keywords)| contains_any(text, keywords))
        .map_or(Status::Regular, |(status, _)| *status)
}

/// 70 to 84 inclusive.
pub fn random_accuracy() -> u8 {
    70 + rand::thread_rng().gen_range(0..15)
}

/// 3 to 17 inclusive.
pub fn random_sources() -> u8 {
    3 + rand::thread_rng().gen_range(0..15)
}

pub fn classify<S: Shape>(title: &str, description: &str) -> S::Output {
    S::from_text(&haystack(title, description))
}
