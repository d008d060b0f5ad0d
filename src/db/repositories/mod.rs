pub mod block;
pub mod raffle;
pub mod reservation;
pub mod settings;
pub mod ticket;
