pub mod block;
pub mod raffle;
pub mod reservation;

pub use block::{BlockEntry, BlockSettings};
pub use raffle::{Raffle, RaffleStatus};
pub use reservation::{Customer, PaymentStatus, Reservation, ReservationStatus, Ticket};
