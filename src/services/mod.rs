pub mod notifier;
pub mod reservation_service;
pub mod reservation_service_impl;

pub use notifier::{Notifier, NotifyError, WhatsAppNotifier};
pub use reservation_service::{
    ReservationError, ReservationOutcome, ReservationService, ReserveRequest, normalize_phone,
};
pub use reservation_service_impl::SeaOrmReservationService;
