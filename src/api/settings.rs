use axum::{Json, extract::State};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use super::{ApiResponse, error::ApiError};
use crate::state::SharedState;

/// GET /api/admin/settings
pub async fn list_settings(
    State(state): State<Arc<SharedState>>,
) -> Result<Json<ApiResponse<BTreeMap<String, String>>>, ApiError> {
    let settings: BTreeMap<String, String> =
        state.store.list_settings().await?.into_iter().collect();
    Ok(Json(ApiResponse::success(settings)))
}

/// PUT /api/admin/settings
///
/// Upserts each submitted key; keys not present in the body are left
/// untouched.
pub async fn update_settings(
    State(state): State<Arc<SharedState>>,
    Json(body): Json<BTreeMap<String, String>>,
) -> Result<Json<ApiResponse<BTreeMap<String, String>>>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::validation("no settings provided"));
    }

    for (key, value) in &body {
        if key.trim().is_empty() {
            return Err(ApiError::validation("setting keys must not be empty"));
        }
        state.store.set_setting(key, value).await?;
    }

    info!(count = body.len(), "Settings updated");

    let settings: BTreeMap<String, String> =
        state.store.list_settings().await?.into_iter().collect();
    Ok(Json(ApiResponse::success(settings)))
}
