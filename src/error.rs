use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

// Reasons a persisted key string can be rejected
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("unknown category '{0}'")]
    UnknownCategory(String),
    #[error("key '{0}' is missing the ' : ' separator")]
    MissingSeparator(String),
    #[error("invalid time bucket '{0}'")]
    InvalidBucket(String),
}

/// Failures talking to the durable sink, or turning a snapshot into bytes and back.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to parse snapshot: {0}")]
    Parse(#[source] serde_json::Error),
}

/// Outcomes the HTTP layer reports besides success.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("rate limit exceeded, try again later")]
    RateLimited,
    #[error("stats unavailable")]
    Unavailable(#[source] SinkError),
    #[error("processing failed: {0}")]
    ProcessingFailed(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    code: u16,
    error_message: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::ProcessingFailed(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorResponse {
            code: status.as_u16(),
            error_message: self.to_string(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcomes_map_to_distinct_statuses() {
        let unavailable = AppError::Unavailable(SinkError::Io(std::io::Error::other("down")));
        let statuses = [
            AppError::RateLimited.status(),
            unavailable.status(),
            AppError::ProcessingFailed("bad".into()).status(),
        ];
        assert_eq!(
            statuses,
            [
                StatusCode::TOO_MANY_REQUESTS,
                StatusCode::SERVICE_UNAVAILABLE,
                StatusCode::BAD_REQUEST
            ]
        );
    }

    #[test]
    fn unavailable_does_not_leak_sink_details() {
        let err = AppError::Unavailable(SinkError::Io(std::io::Error::other("/var/secret")));
        assert_eq!(err.to_string(), "stats unavailable");
    }
}
