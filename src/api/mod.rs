//! HTTP surface.
//!
//! Public routes cover the reservation flow the frontend drives; everything
//! that mutates raffles, blocks or settings lives under `/api/admin` behind
//! the API-key middleware.

use axum::http::{HeaderValue, Method};
use axum::routing::{delete, get, post};
use axum::{Json, Router, middleware};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::SharedState;

pub mod auth;
pub mod blocks;
pub mod error;
pub mod raffles;
pub mod reservations;
pub mod reserve;
pub mod settings;
pub mod types;

pub use error::ApiError;
pub use types::ApiResponse;

async fn health(
    axum::extract::State(state): axum::extract::State<Arc<SharedState>>,
) -> Result<Json<ApiResponse<&'static str>>, ApiError> {
    state.store.ping().await?;
    Ok(Json(ApiResponse::success("ok")))
}

fn cors_layer(state: &SharedState) -> CorsLayer {
    let origins = &state.config.server.cors_allowed_origins;

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    if origins.iter().any(|o| o == "*") {
        layer.allow_origin(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| o.parse::<HeaderValue>().ok())
            .collect();
        layer.allow_origin(parsed)
    }
}

pub fn router(state: Arc<SharedState>) -> Router {
    let admin = Router::new()
        .route("/reservations", get(reservations::list_reservations))
        .route(
            "/reservations/{id}/confirm",
            post(reservations::confirm_reservation),
        )
        .route(
            "/reservations/{id}/cancel",
            post(reservations::cancel_reservation),
        )
        .route("/blocks", get(blocks::list_blocks).post(blocks::create_block))
        .route("/blocks/purge", post(blocks::purge_expired))
        .route("/blocks/{id}", delete(blocks::delete_block))
        .route(
            "/block-settings",
            get(blocks::get_block_settings).put(blocks::update_block_settings),
        )
        .route(
            "/settings",
            get(settings::list_settings).put(settings::update_settings),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::admin_auth,
        ));

    let api = Router::new()
        .route("/health", get(health))
        .route("/reserve", post(reserve::reserve_ticket))
        .route("/raffles", get(raffles::list_raffles))
        .route("/raffles/{id}", get(raffles::get_raffle))
        .route("/raffles/{id}/tickets", get(raffles::list_reserved_numbers))
        .nest("/admin", admin);

    let cors = cors_layer(&state);

    Router::new()
        .nest("/api", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
