//! Sorteo: a raffle ticket-reservation service.
//!
//! Customers pick a number on a public grid; the server atomically claims
//! the `(raffle, ticket_number)` pair, records who asked for it and hands
//! back a WhatsApp deep link so the customer can arrange payment with the
//! organizer. Admin endpoints drive the reserved -> confirmed/cancelled
//! lifecycle, the phone-block registry and the runtime settings.

use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod config;
pub mod db;
pub mod entities;
pub mod models;
pub mod services;
pub mod state;

pub use config::Config;
pub use state::SharedState;

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(SharedState::new(config).await?);
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Sorteo listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
