use axum::{
    routing::{delete, get},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiFailure;
pub use state::AppState;

pub async fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/news/survey", get(handlers::get_survey_news))
        .route("/api/news/display", get(handlers::get_display_news))
        .route(
            "/api/cache",
            get(handlers::get_cache_status).delete(handlers::clear_cache),
        )
        .route("/api/cache/:slot", delete(handlers::clear_cache_slot))
        .route(
            "/api/survey-results",
            get(handlers::list_survey_results)
                .post(handlers::submit_survey_result)
                .delete(handlers::clear_survey_results),
        )
        .route(
            "/api/feed-results",
            get(handlers::list_feed_results).post(handlers::submit_feed_result),
        )
        .route("/api/dashboard", get(handlers::get_dashboard))
        .layer(cors)
        .with_state(Arc::new(state))
}

pub mod prelude {
    pub use crate::{create_app, AppState};
    pub use ain_core::{Error, Result};
}
