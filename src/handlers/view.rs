use axum::{
    extract::{Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use crate::error::AppError;
use crate::models::Category;
use crate::simulator::RequestSimulator;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ViewParams {
    // Random when absent
    pub category: Option<String>,
}

pub async fn view_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ViewParams>,
) -> Result<StatusCode, AppError> {
    let category = match params.category {
        Some(raw) => raw
            .parse::<Category>()
            .map_err(|e| AppError::ProcessingFailed(e.to_string()))?,
        None => RequestSimulator::random_category(),
    };

    let outcome = state.simulator.handle_view(category).await;
    debug!(category = %outcome.category, clicked = outcome.clicked, "view processed");

    Ok(StatusCode::OK)
}
