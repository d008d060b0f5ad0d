pub mod blocked_numbers;
pub mod raffles;
pub mod reservations;
pub mod settings;
pub mod tickets;

pub mod prelude {
    pub use super::blocked_numbers::Entity as BlockedNumbers;
    pub use super::raffles::Entity as Raffles;
    pub use super::reservations::Entity as Reservations;
    pub use super::settings::Entity as Settings;
    pub use super::tickets::Entity as Tickets;
}
