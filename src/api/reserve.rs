use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::error::ApiError;
use crate::services::ReserveRequest;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct ReserveBody {
    pub raffle_id: i32,
    pub ticket_number: String,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReserveResponse {
    pub success: bool,
    pub message: String,
    pub reservation_id: i32,
    pub ticket_number: String,
    pub whatsapp_url: String,
}

/// POST /api/reserve
///
/// The single public write path: validates the submission, runs the block
/// gate and atomically claims the `(raffle, ticket_number)` pair. Losing a
/// race for the same number yields 409.
pub async fn reserve_ticket(
    State(state): State<Arc<SharedState>>,
    Json(body): Json<ReserveBody>,
) -> Result<Json<ReserveResponse>, ApiError> {
    let outcome = state
        .reservations
        .reserve_ticket(ReserveRequest {
            raffle_id: body.raffle_id,
            ticket_number: body.ticket_number,
            name: body.name,
            phone: body.phone,
            email: body.email,
        })
        .await?;

    info!(
        reservation_id = outcome.reservation.id,
        ticket = %outcome.ticket.ticket_number,
        raffle = %outcome.raffle_title,
        "Reservation created"
    );

    Ok(Json(ReserveResponse {
        success: true,
        message: "Reservation created successfully".to_string(),
        reservation_id: outcome.reservation.id,
        ticket_number: outcome.ticket.ticket_number,
        whatsapp_url: outcome.whatsapp_url,
    }))
}
