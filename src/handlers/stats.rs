use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, error};

use crate::error::AppError;
use crate::metrics::{RATE_LIMITED, STATS_REQUESTS};
use crate::models::Snapshot;
use crate::state::AppState;

// Return the latest persisted snapshot verbatim, behind the rate limiter
pub async fn stats_handler(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    STATS_REQUESTS.inc();

    if !state.rate_limiter.check() {
        RATE_LIMITED.inc();
        debug!("stats request rate limited");
        return Err(AppError::RateLimited);
    }

    let bytes = state.sink.read_all().await.map_err(|e| {
        error!(error = %e, "failed reading stats");
        AppError::Unavailable(e)
    })?;

    // Only serve bytes that are a valid snapshot
    if let Err(e) = Snapshot::from_json_slice(&bytes) {
        error!(error = %e, "failed parsing stats");
        return Err(AppError::Unavailable(e));
    }

    Ok(([(header::CONTENT_TYPE, "application/json")], bytes).into_response())
}
