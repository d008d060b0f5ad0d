use crate::models::{BlockEntry, BlockSettings, Customer, Raffle, Reservation, Ticket};
use crate::services::reservation_service::ReservationError;
use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::raffle::NewRaffle;
pub use repositories::reservation::{ReservationFilter, ReservationListRow, ReservedTicket};
pub use repositories::settings::keys as setting_keys;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn raffle_repo(&self) -> repositories::raffle::RaffleRepository {
        repositories::raffle::RaffleRepository::new(self.conn.clone())
    }

    fn ticket_repo(&self) -> repositories::ticket::TicketRepository {
        repositories::ticket::TicketRepository::new(self.conn.clone())
    }

    fn reservation_repo(&self) -> repositories::reservation::ReservationRepository {
        repositories::reservation::ReservationRepository::new(self.conn.clone())
    }

    fn block_repo(&self) -> repositories::block::BlockRepository {
        repositories::block::BlockRepository::new(self.conn.clone())
    }

    fn settings_repo(&self) -> repositories::settings::SettingsRepository {
        repositories::settings::SettingsRepository::new(self.conn.clone())
    }

    // Raffles (admin-owned; read-only to the reservation core)

    pub async fn add_raffle(&self, raffle: NewRaffle) -> Result<Raffle> {
        self.raffle_repo().add(raffle).await
    }

    pub async fn get_raffle(&self, id: i32) -> Result<Option<Raffle>> {
        self.raffle_repo().get(id).await
    }

    pub async fn list_raffles(&self, active_only: bool) -> Result<Vec<Raffle>> {
        self.raffle_repo().list(active_only).await
    }

    pub async fn reserved_ticket_numbers(&self, raffle_id: i32) -> Result<Vec<String>> {
        self.raffle_repo().reserved_numbers(raffle_id).await
    }

    // Tickets

    pub async fn get_ticket(&self, id: i32) -> Result<Option<Ticket>> {
        self.ticket_repo().get(id).await
    }

    pub async fn find_ticket(&self, raffle_id: i32, ticket_number: &str) -> Result<Option<Ticket>> {
        self.ticket_repo().find(raffle_id, ticket_number).await
    }

    // Reservations

    pub async fn reserve_ticket(
        &self,
        raffle_id: i32,
        ticket_number: &str,
        customer: &Customer,
    ) -> Result<ReservedTicket, ReservationError> {
        self.reservation_repo()
            .reserve(raffle_id, ticket_number, customer)
            .await
    }

    pub async fn get_reservation(&self, id: i32) -> Result<Option<Reservation>> {
        self.reservation_repo().get(id).await
    }

    pub async fn confirm_reservation(
        &self,
        reservation_id: i32,
        ticket_id: i32,
    ) -> Result<(), ReservationError> {
        self.reservation_repo()
            .confirm(reservation_id, ticket_id)
            .await
    }

    pub async fn cancel_reservation(
        &self,
        reservation_id: i32,
        release_ticket: bool,
    ) -> Result<(), ReservationError> {
        self.reservation_repo()
            .cancel(reservation_id, release_ticket)
            .await
    }

    pub async fn list_reservations(
        &self,
        filter: &ReservationFilter,
    ) -> Result<Vec<ReservationListRow>> {
        self.reservation_repo().list(filter).await
    }

    // Block registry

    pub async fn is_phone_blocked(&self, phone: &str) -> Result<bool> {
        self.block_repo().is_blocked(phone).await
    }

    pub async fn block_phone(&self, phone: &str, minutes: u32) -> Result<BlockEntry> {
        self.block_repo().block(phone, minutes).await
    }

    pub async fn unblock(&self, entry_id: i32) -> Result<bool> {
        self.block_repo().unblock(entry_id).await
    }

    pub async fn purge_expired_blocks(&self) -> Result<u64> {
        self.block_repo().purge_expired().await
    }

    pub async fn list_active_blocks(&self) -> Result<Vec<BlockEntry>> {
        self.block_repo().list_active().await
    }

    // Settings

    pub async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        self.settings_repo().get(key).await
    }

    pub async fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.settings_repo().set(key, value).await
    }

    pub async fn list_settings(&self) -> Result<Vec<(String, String)>> {
        self.settings_repo().list().await
    }

    pub async fn block_settings(&self) -> Result<BlockSettings> {
        self.settings_repo().block_settings().await
    }
}
