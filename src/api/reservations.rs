use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::{ApiResponse, error::ApiError, types::ReservationRowDto};
use crate::db::ReservationFilter;
use crate::models::{PaymentStatus, ReservationStatus};
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct ReservationListQuery {
    pub status: Option<String>,
    pub payment: Option<String>,
    pub search: Option<String>,
}

/// GET /api/admin/reservations
pub async fn list_reservations(
    State(state): State<Arc<SharedState>>,
    Query(query): Query<ReservationListQuery>,
) -> Result<Json<ApiResponse<Vec<ReservationRowDto>>>, ApiError> {
    let status = match query.status.as_deref() {
        None | Some("") => None,
        Some(s) => Some(ReservationStatus::parse(s).ok_or_else(|| {
            ApiError::validation(format!("unknown reservation status '{}'", s))
        })?),
    };

    let payment = match query.payment.as_deref() {
        None | Some("") => None,
        Some("pending") => Some(PaymentStatus::Pending),
        Some("paid") => Some(PaymentStatus::Paid),
        Some(p) => {
            return Err(ApiError::validation(format!(
                "unknown payment status '{}'",
                p
            )));
        }
    };

    let filter = ReservationFilter {
        status,
        payment,
        search: query.search.filter(|s| !s.trim().is_empty()),
    };

    let rows = state.store.list_reservations(&filter).await?;
    let rows: Vec<ReservationRowDto> = rows.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(rows)))
}

#[derive(Debug, Deserialize)]
pub struct ConfirmBody {
    /// Must match the reservation's ticket; a stale admin view is rejected
    /// instead of confirming the wrong pair.
    pub ticket_id: i32,
}

#[derive(Debug, Serialize)]
pub struct TransitionResponse {
    pub id: i32,
    pub status: String,
}

/// POST /api/admin/reservations/{id}/confirm
pub async fn confirm_reservation(
    State(state): State<Arc<SharedState>>,
    Path(id): Path<i32>,
    Json(body): Json<ConfirmBody>,
) -> Result<Json<ApiResponse<TransitionResponse>>, ApiError> {
    state
        .reservations
        .confirm_reservation(id, body.ticket_id)
        .await?;

    info!(reservation_id = id, "Reservation confirmed");
    Ok(Json(ApiResponse::success(TransitionResponse {
        id,
        status: ReservationStatus::Confirmed.as_str().to_string(),
    })))
}

/// POST /api/admin/reservations/{id}/cancel
pub async fn cancel_reservation(
    State(state): State<Arc<SharedState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<TransitionResponse>>, ApiError> {
    state.reservations.cancel_reservation(id).await?;

    info!(reservation_id = id, "Reservation cancelled");
    Ok(Json(ApiResponse::success(TransitionResponse {
        id,
        status: ReservationStatus::Cancelled.as_str().to_string(),
    })))
}
