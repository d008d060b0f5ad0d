use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{ApiResponse, error::ApiError};
use crate::models::Raffle;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct RaffleListQuery {
    /// When true, inactive raffles are included (admin view).
    #[serde(default)]
    pub include_inactive: bool,
}

/// GET /api/raffles
pub async fn list_raffles(
    State(state): State<Arc<SharedState>>,
    Query(query): Query<RaffleListQuery>,
) -> Result<Json<ApiResponse<Vec<Raffle>>>, ApiError> {
    let raffles = state.store.list_raffles(!query.include_inactive).await?;
    Ok(Json(ApiResponse::success(raffles)))
}

/// GET /api/raffles/{id}
pub async fn get_raffle(
    State(state): State<Arc<SharedState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Raffle>>, ApiError> {
    let raffle = state
        .store
        .get_raffle(id)
        .await?
        .ok_or_else(|| ApiError::not_found("raffle", id))?;
    Ok(Json(ApiResponse::success(raffle)))
}

#[derive(Debug, Serialize)]
pub struct ReservedNumbers {
    pub raffle_id: i32,
    pub reserved: Vec<String>,
}

/// GET /api/raffles/{id}/tickets
///
/// The frontend paints its number grid from this list; a number present
/// here is taken regardless of payment state.
pub async fn list_reserved_numbers(
    State(state): State<Arc<SharedState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ReservedNumbers>>, ApiError> {
    if state.store.get_raffle(id).await?.is_none() {
        return Err(ApiError::not_found("raffle", id));
    }

    let reserved = state.store.reserved_ticket_numbers(id).await?;
    Ok(Json(ApiResponse::success(ReservedNumbers {
        raffle_id: id,
        reserved,
    })))
}
