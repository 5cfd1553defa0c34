use ain_core::{CacheSlot, CacheStatus, Error, FeedChamberResult, SurveyResult};
use ain_news::{DashboardStats, FetchMode, FetchOutput};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

use crate::error::ApiFailure;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct NewsQuery {
    #[serde(default)]
    pub refresh: bool,
}

async fn fetch_news(state: &AppState, mode: FetchMode, refresh: bool) -> Result<FetchOutput, ApiFailure> {
    if refresh {
        state.pipeline.clear_cache(Some(mode.slot())).await;
    }
    let deadline = state.pipeline.config().deadline;
    Ok(state.pipeline.fetch_with_deadline(mode, deadline).await?)
}

pub async fn get_survey_news(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NewsQuery>,
) -> Result<Json<FetchOutput>, ApiFailure> {
    Ok(Json(fetch_news(&state, FetchMode::Survey, query.refresh).await?))
}

pub async fn get_display_news(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NewsQuery>,
) -> Result<Json<FetchOutput>, ApiFailure> {
    Ok(Json(fetch_news(&state, FetchMode::Display, query.refresh).await?))
}

pub async fn get_cache_status(State(state): State<Arc<AppState>>) -> Json<CacheStatus> {
    Json(state.pipeline.cache_status().await)
}

pub async fn clear_cache(State(state): State<Arc<AppState>>) -> StatusCode {
    state.pipeline.clear_cache(None).await;
    StatusCode::NO_CONTENT
}

pub async fn clear_cache_slot(
    State(state): State<Arc<AppState>>,
    Path(slot): Path<String>,
) -> Result<StatusCode, ApiFailure> {
    let slot = CacheSlot::parse(&slot).ok_or_else(|| {
        Error::validation_field(
            format!("Unknown cache slot: {}. Expected survey or display", slot),
            "slot",
        )
    })?;
    state.pipeline.clear_cache(Some(slot)).await;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_survey_results(State(state): State<Arc<AppState>>) -> Json<Vec<SurveyResult>> {
    Json(state.results.survey_results().await)
}

pub async fn submit_survey_result(
    State(state): State<Arc<AppState>>,
    Json(result): Json<SurveyResult>,
) -> Result<impl IntoResponse, ApiFailure> {
    let stored = state.results.append_survey_result(result).await?;
    let status = if stored { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(json!({ "stored": stored }))))
}

pub async fn clear_survey_results(State(state): State<Arc<AppState>>) -> Result<StatusCode, ApiFailure> {
    state.results.clear_survey_results().await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_feed_results(State(state): State<Arc<AppState>>) -> Json<Vec<FeedChamberResult>> {
    Json(state.results.feed_results().await)
}

pub async fn submit_feed_result(
    State(state): State<Arc<AppState>>,
    Json(result): Json<FeedChamberResult>,
) -> Result<StatusCode, ApiFailure> {
    state.results.append_feed_result(result).await?;
    Ok(StatusCode::CREATED)
}

/// Dashboard figures. A failed news fetch leaves the category breakdown
/// empty rather than failing the whole page.
pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> Json<DashboardStats> {
    let deadline = state.pipeline.config().deadline;
    let news = match state.pipeline.fetch_with_deadline(FetchMode::Survey, deadline).await {
        Ok(FetchOutput::Survey(items)) => items,
        Ok(FetchOutput::Display(_)) => Vec::new(),
        Err(err) => {
            warn!(error = %err, "Dashboard news unavailable");
            Vec::new()
        }
    };
    let surveys = state.results.survey_results().await;
    let feed = state.results.feed_results().await;
    Json(DashboardStats::compute(&surveys, &feed, &news, Utc::now()))
}
