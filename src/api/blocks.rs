use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::{ApiResponse, error::ApiError};
use crate::db::setting_keys;
use crate::models::{BlockEntry, BlockSettings};
use crate::services::normalize_phone;
use crate::state::SharedState;

/// GET /api/admin/blocks
pub async fn list_blocks(
    State(state): State<Arc<SharedState>>,
) -> Result<Json<ApiResponse<Vec<BlockEntry>>>, ApiError> {
    let blocks = state.store.list_active_blocks().await?;
    Ok(Json(ApiResponse::success(blocks)))
}

#[derive(Debug, Deserialize)]
pub struct CreateBlockBody {
    pub phone_number: String,
    /// Defaults to the configured block duration when omitted.
    pub minutes: Option<u32>,
}

/// POST /api/admin/blocks
pub async fn create_block(
    State(state): State<Arc<SharedState>>,
    Json(body): Json<CreateBlockBody>,
) -> Result<Json<ApiResponse<BlockEntry>>, ApiError> {
    let phone = normalize_phone(&body.phone_number)
        .ok_or_else(|| ApiError::validation("the phone number must contain 9 to 15 digits"))?;

    if state.store.is_phone_blocked(&phone).await? {
        return Err(ApiError::Conflict(format!(
            "phone number {} is already blocked",
            phone
        )));
    }

    let minutes = match body.minutes {
        Some(0) => return Err(ApiError::validation("block duration must be at least 1 minute")),
        Some(m) => m,
        None => state.store.block_settings().await?.duration_minutes,
    };

    let entry = state.store.block_phone(&phone, minutes).await?;
    info!(block_id = entry.id, minutes, "Phone number blocked");
    Ok(Json(ApiResponse::success(entry)))
}

/// DELETE /api/admin/blocks/{id}
pub async fn delete_block(
    State(state): State<Arc<SharedState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if !state.store.unblock(id).await? {
        return Err(ApiError::not_found("block", id));
    }
    info!(block_id = id, "Phone number unblocked");
    Ok(Json(ApiResponse::success(())))
}

#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    pub purged: u64,
}

/// POST /api/admin/blocks/purge
///
/// Removes expired rows; the gate already ignores them, this only keeps
/// the table tidy.
pub async fn purge_expired(
    State(state): State<Arc<SharedState>>,
) -> Result<Json<ApiResponse<PurgeResponse>>, ApiError> {
    let purged = state.store.purge_expired_blocks().await?;
    info!(purged, "Expired blocks purged");
    Ok(Json(ApiResponse::success(PurgeResponse { purged })))
}

/// GET /api/admin/block-settings
pub async fn get_block_settings(
    State(state): State<Arc<SharedState>>,
) -> Result<Json<ApiResponse<BlockSettings>>, ApiError> {
    let settings = state.store.block_settings().await?;
    Ok(Json(ApiResponse::success(settings)))
}

#[derive(Debug, Deserialize)]
pub struct BlockSettingsBody {
    pub enabled: bool,
    pub duration_minutes: u32,
}

/// PUT /api/admin/block-settings
///
/// Persisted in the settings table, so the change applies to the next
/// reservation attempt without a restart.
pub async fn update_block_settings(
    State(state): State<Arc<SharedState>>,
    Json(body): Json<BlockSettingsBody>,
) -> Result<Json<ApiResponse<BlockSettings>>, ApiError> {
    if body.duration_minutes == 0 {
        return Err(ApiError::validation("block duration must be at least 1 minute"));
    }

    state
        .store
        .set_setting(setting_keys::BLOCK_ENABLED, if body.enabled { "1" } else { "0" })
        .await?;
    state
        .store
        .set_setting(
            setting_keys::BLOCK_DURATION,
            &body.duration_minutes.to_string(),
        )
        .await?;

    info!(
        enabled = body.enabled,
        duration_minutes = body.duration_minutes,
        "Block settings updated"
    );

    Ok(Json(ApiResponse::success(BlockSettings {
        enabled: body.enabled,
        duration_minutes: body.duration_minutes,
    })))
}
