//! `SeaORM` implementation of the `ReservationService` trait.

use crate::db::Store;
use crate::services::notifier::Notifier;
use crate::services::reservation_service::{
    ReservationError, ReservationOutcome, ReservationService, ReserveRequest, validate_request,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct SeaOrmReservationService {
    store: Store,
    notifier: Arc<dyn Notifier>,
    release_ticket_on_cancel: bool,
}

impl SeaOrmReservationService {
    #[must_use]
    pub fn new(store: Store, notifier: Arc<dyn Notifier>, release_ticket_on_cancel: bool) -> Self {
        Self {
            store,
            notifier,
            release_ticket_on_cancel,
        }
    }
}

/// Keeps customer phone numbers out of public-facing logs.
fn redact_phone(phone: &str) -> String {
    if phone.len() <= 4 {
        "***".to_string()
    } else {
        format!("***{}", &phone[phone.len() - 4..])
    }
}

fn store_error(
    raffle_id: i32,
    ticket_number: &str,
    phone: &str,
) -> impl FnOnce(anyhow::Error) -> ReservationError {
    let ticket_number = ticket_number.to_string();
    let phone = redact_phone(phone);
    move |e| {
        error!(
            raffle_id,
            ticket_number, phone, "Store failure during reservation: {e}"
        );
        ReservationError::Store(e.to_string())
    }
}

#[async_trait]
impl ReservationService for SeaOrmReservationService {
    async fn reserve_ticket(
        &self,
        request: ReserveRequest,
    ) -> Result<ReservationOutcome, ReservationError> {
        let customer = validate_request(&request)?;
        let raffle_id = request.raffle_id;
        let ticket_number = request.ticket_number.trim();

        // The block policy is re-read on every attempt; an admin toggling it
        // must take effect within one request.
        let block_settings = self
            .store
            .block_settings()
            .await
            .map_err(store_error(raffle_id, ticket_number, &customer.phone))?;

        if block_settings.enabled
            && self
                .store
                .is_phone_blocked(&customer.phone)
                .await
                .map_err(store_error(raffle_id, ticket_number, &customer.phone))?
        {
            info!(
                raffle_id,
                ticket_number,
                phone = redact_phone(&customer.phone),
                "Reservation rejected: phone blocked"
            );
            return Err(ReservationError::PhoneBlocked);
        }

        let reserved = self
            .store
            .reserve_ticket(raffle_id, ticket_number, &customer)
            .await
            .inspect_err(|e| {
                if matches!(e, ReservationError::Store(_)) {
                    error!(
                        raffle_id,
                        ticket_number,
                        phone = redact_phone(&customer.phone),
                        "Reservation transaction failed: {e}"
                    );
                }
            })?;

        // Post-commit: a notification failure is reported to the caller but
        // the committed rows stay, so the ticket remains taken. Rolling the
        // claim back here would silently lose a real reservation.
        let whatsapp_url = match self
            .notifier
            .reservation_created(&customer, ticket_number, &reserved.raffle_title)
            .await
        {
            Ok(url) => url,
            Err(e) => {
                warn!(
                    raffle_id,
                    ticket_number,
                    reservation_id = reserved.reservation.id,
                    "Reservation committed but notification failed: {e}"
                );
                return Err(ReservationError::NotificationFailed(e.to_string()));
            }
        };

        Ok(ReservationOutcome {
            reservation: reserved.reservation,
            ticket: reserved.ticket,
            raffle_title: reserved.raffle_title,
            whatsapp_url,
        })
    }

    async fn confirm_reservation(
        &self,
        reservation_id: i32,
        ticket_id: i32,
    ) -> Result<(), ReservationError> {
        self.store
            .confirm_reservation(reservation_id, ticket_id)
            .await
    }

    async fn cancel_reservation(&self, reservation_id: i32) -> Result<(), ReservationError> {
        self.store
            .cancel_reservation(reservation_id, self.release_ticket_on_cancel)
            .await
    }
}
