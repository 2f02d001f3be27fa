//! Dashboard handler

use axum::{extract::State, Json};

use crate::dto::reports::DashboardResponse;
use crate::error::ApiError;
use crate::AppState;

pub async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardResponse>, ApiError> {
    let stats = state.reporting.dashboard().await?;
    Ok(Json(stats.into()))
}
