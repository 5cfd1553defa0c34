//! Aggregates shown on the dashboard: survey participation, feed-chamber
//! engagement and the category mix of the current news batch.

use ain_core::{ClassifiedNewsItem, FeedChamberResult, Impact, SurveyResult};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

pub const RECENT_DAYS: i64 = 7;
pub const TOP_CATEGORIES: usize = 5;
pub const TREND_LENGTH: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    pub name: String,
    pub positive: u32,
    pub negative: u32,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: DateTime<Utc>,
    pub score: u32,
    /// Percentage of correct answers in that survey.
    pub accuracy: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_surveys: usize,
    pub total_questions_answered: u32,
    pub total_correct_answers: u32,
    /// Rounded percentage.
    pub sentiment_alignment_rate: u32,
    /// One decimal place.
    pub average_score_per_survey: f64,
    pub average_questions_per_survey: u32,
    pub average_completion_minutes: u32,
    pub recent_surveys: usize,
    pub feed_sessions: usize,
    pub recent_feed_sessions: usize,
    pub average_engagement: u32,
    pub categories: Vec<CategoryBreakdown>,
    pub top_categories: Vec<CategoryBreakdown>,
    pub participation_trend: Vec<TrendPoint>,
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

impl DashboardStats {
    pub fn compute(
        surveys: &[SurveyResult],
        feed: &[FeedChamberResult],
        news: &[ClassifiedNewsItem],
        now: DateTime<Utc>,
    ) -> Self {
        let total_surveys = surveys.len();
        let total_questions_answered: u32 = surveys.iter().map(|s| s.total_questions).sum();
        let total_correct_answers: u32 = surveys.iter().map(|s| s.score).sum();
        let completion_minutes: u32 = surveys.iter().filter_map(|s| s.time_spent_minutes).sum();
        let cutoff = now - Duration::days(RECENT_DAYS);

        let engagement: u32 = feed
            .iter()
            .flat_map(|session| session.stats.iter())
            .map(|stat| stat.likes + stat.skips)
            .sum();

        let mut by_category: BTreeMap<&str, CategoryBreakdown> = BTreeMap::new();
        for item in news {
            let entry = by_category
                .entry(item.category.as_str())
                .or_insert_with(|| CategoryBreakdown {
                    name: item.category.clone(),
                    ..CategoryBreakdown::default()
                });
            match item.impact {
                Impact::Positive => entry.positive += 1,
                Impact::Negative => entry.negative += 1,
            }
            entry.total += 1;
        }
        let categories: Vec<CategoryBreakdown> = by_category.into_values().collect();
        let mut top_categories = categories.clone();
        // Stable sort keeps name order among ties.
        top_categories.sort_by(|a, b| b.total.cmp(&a.total));
        top_categories.truncate(TOP_CATEGORIES);

        let participation_trend = surveys
            .iter()
            .skip(total_surveys.saturating_sub(TREND_LENGTH))
            .map(|s| TrendPoint {
                date: s.date,
                score: s.score,
                accuracy: ratio(s.score as f64, s.total_questions as f64) * 100.0,
            })
            .collect();

        let surveys_f = total_surveys as f64;
        Self {
            total_surveys,
            total_questions_answered,
            total_correct_answers,
            sentiment_alignment_rate: (ratio(
                total_correct_answers as f64,
                total_questions_answered as f64,
            ) * 100.0)
                .round() as u32,
            average_score_per_survey: (ratio(total_correct_answers as f64, surveys_f) * 10.0)
                .round()
                / 10.0,
            average_questions_per_survey: ratio(total_questions_answered as f64, surveys_f).round()
                as u32,
            average_completion_minutes: ratio(completion_minutes as f64, surveys_f).round() as u32,
            recent_surveys: surveys.iter().filter(|s| s.date >= cutoff).count(),
            feed_sessions: feed.len(),
            recent_feed_sessions: feed.iter().filter(|f| f.date >= cutoff).count(),
            average_engagement: ratio(engagement as f64, feed.len() as f64).round() as u32,
            categories,
            top_categories,
            participation_trend,
        }
    }
}
