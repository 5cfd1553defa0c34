use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const SURVEY_CACHE_KEY: &str = "ai_news_cache";
pub const DISPLAY_CACHE_KEY: &str = "ai_news_display_cache";
pub const SURVEY_RESULTS_KEY: &str = "aiSurveyResults";
pub const FEED_RESULTS_KEY: &str = "feedChamberResults";

/// Article as returned by the news search API. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawArticle {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub published_at: Option<String>,
}

impl RawArticle {
    /// Description, else content, else empty.
    pub fn raw_text(&self) -> &str {
        [&self.description, &self.content]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.is_empty())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Positive,
    Negative,
}

impl Impact {
    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::Positive => "positive",
            Impact::Negative => "negative",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "positive" => Some(Impact::Positive),
            "negative" => Some(Impact::Negative),
            _ => None,
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Featured,
    New,
    Urgent,
    Important,
    Regular,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Featured => "featured",
            Status::New => "new",
            Status::Urgent => "urgent",
            Status::Important => "important",
            Status::Regular => "regular",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "featured" => Some(Status::Featured),
            "new" => Some(Status::New),
            "urgent" => Some(Status::Urgent),
            "important" => Some(Status::Important),
            "regular" => Some(Status::Regular),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyClassification {
    pub impact: Impact,
    pub category: String,
    pub accuracy: u8,
    pub sources: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayClassification {
    pub category: String,
    pub status: Status,
}

/// News item classified for the impact survey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedNewsItem {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub impact: Impact,
    pub category: String,
    pub accuracy: u8,
    pub sources: u8,
}

/// News item classified for the news feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayNewsItem {
    pub id: u32,
    pub title: String,
    pub excerpt: String,
    pub author: String,
    pub published_at: String,
    pub read_time: String,
    pub views: u32,
    pub category: String,
    pub status: Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheSlot {
    Survey,
    Display,
}

impl CacheSlot {
    pub const ALL: [CacheSlot; 2] = [CacheSlot::Survey, CacheSlot::Display];

    pub fn key(&self) -> &'static str {
        match self {
            CacheSlot::Survey => SURVEY_CACHE_KEY,
            CacheSlot::Display => DISPLAY_CACHE_KEY,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "survey" => Some(CacheSlot::Survey),
            "display" => Some(CacheSlot::Display),
            _ => None,
        }
    }
}

/// Timestamped cache payload. `timestamp` is milliseconds since the epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub data: T,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheInfo {
    pub age: i64,
    pub is_expired: bool,
    pub expires_in: i64,
    pub item_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStatus {
    pub survey: Option<CacheInfo>,
    pub display: Option<CacheInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyNewsSnapshot {
    pub id: u32,
    pub title: String,
    pub impact: Impact,
    pub category: String,
    pub accuracy: u8,
    pub sources: u8,
}

impl From<&ClassifiedNewsItem> for SurveyNewsSnapshot {
    fn from(item: &ClassifiedNewsItem) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            impact: item.impact,
            category: item.category.clone(),
            accuracy: item.accuracy,
            sources: item.sources,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyResult {
    pub date: DateTime<Utc>,
    pub score: u32,
    pub total_questions: u32,
    pub user_choices: BTreeMap<u32, Impact>,
    pub news_data: Vec<SurveyNewsSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_spent_minutes: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedCategoryStat {
    pub name: String,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub skips: u32,
    #[serde(default)]
    pub weight: f32,
    #[serde(default)]
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedChamberResult {
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub stats: Vec<FeedCategoryStat>,
    #[serde(default)]
    pub total_posts: u32,
}
