use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{ReservationService, SeaOrmReservationService, WhatsAppNotifier};

/// Everything a request handler needs, wired once at startup.
#[derive(Clone)]
pub struct SharedState {
    pub config: Config,

    pub store: Store,

    pub reservations: Arc<dyn ReservationService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let notifier = Arc::new(WhatsAppNotifier::new(store.clone()));
        let reservations = Arc::new(SeaOrmReservationService::new(
            store.clone(),
            notifier,
            config.reservations.release_ticket_on_cancel,
        )) as Arc<dyn ReservationService>;

        Ok(Self {
            config,
            store,
            reservations,
        })
    }
}
