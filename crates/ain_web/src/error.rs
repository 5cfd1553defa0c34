use ain_core::{ApiErrorKind, Error};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::warn;

/// Library errors rendered as `{ "error": ..., "kind": ... }`.
#[derive(Debug)]
pub struct ApiFailure(pub Error);

impl From<Error> for ApiFailure {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

pub fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::Validation { .. } => StatusCode::BAD_REQUEST,
        Error::DeadlineExceeded(_) => StatusCode::GATEWAY_TIMEOUT,
        Error::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        Error::Storage(_) | Error::Io(_) | Error::Serialization(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        _ => match err.api_kind() {
            Some(ApiErrorKind::RateLimit) => StatusCode::TOO_MANY_REQUESTS,
            Some(ApiErrorKind::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            Some(
                ApiErrorKind::ServiceUnavailable
                | ApiErrorKind::Connection
                | ApiErrorKind::Connectivity,
            ) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_GATEWAY,
        },
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        warn!(status = status.as_u16(), error = %self.0, "request failed");
        let body = json!({
            "error": self.0.to_string(),
            "kind": self.0.kind_tag(),
        });
        (status, Json(body)).into_response()
    }
}
