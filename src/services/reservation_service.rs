//! Domain service for the ticket-reservation core.
//!
//! Orchestrates validation, the phone-block gate, the atomic claim against
//! the store and the notification handoff.

use crate::models::{Customer, Reservation, Ticket};
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// A reservation attempt as submitted by the public frontend.
#[derive(Debug, Clone)]
pub struct ReserveRequest {
    pub raffle_id: i32,
    pub ticket_number: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
}

/// The committed claim plus the caller-facing handoff URL.
#[derive(Debug)]
pub struct ReservationOutcome {
    pub reservation: Reservation,
    pub ticket: Ticket,
    pub raffle_title: String,
    pub whatsapp_url: String,
}

#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("{0}")]
    Validation(String),

    #[error("this phone number is temporarily blocked")]
    PhoneBlocked,

    #[error("the raffle does not exist or is not active")]
    RaffleUnavailable,

    #[error("this ticket is already reserved")]
    TicketAlreadyReserved,

    /// The reservation rows are committed but the handoff could not be
    /// prepared; the caller is told to retry contact, the ticket stays
    /// taken.
    #[error("the reservation was recorded but the notification could not be prepared: {0}")]
    NotificationFailed(String),

    #[error("database error: {0}")]
    Store(String),
}

impl From<sea_orm::DbErr> for ReservationError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Store(err.to_string())
    }
}

#[async_trait]
pub trait ReservationService: Send + Sync {
    /// Claims a ticket for a customer; at most one caller can win a given
    /// `(raffle, ticket_number)` pair.
    async fn reserve_ticket(
        &self,
        request: ReserveRequest,
    ) -> Result<ReservationOutcome, ReservationError>;

    /// Admin transition: reserved -> confirmed, ticket -> paid, atomically.
    async fn confirm_reservation(
        &self,
        reservation_id: i32,
        ticket_id: i32,
    ) -> Result<(), ReservationError>;

    /// Admin transition: reserved -> cancelled. Whether the ticket number
    /// is released again is the service's configured policy.
    async fn cancel_reservation(&self, reservation_id: i32) -> Result<(), ReservationError>;
}

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Strips separators and validates the remaining digit string (9-15
/// digits). Returns the normalized form used for storage and block checks.
#[must_use]
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if (9..=15).contains(&digits.len()) {
        Some(digits)
    } else {
        None
    }
}

#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Fail-fast input validation; returns the normalized customer on success.
pub fn validate_request(request: &ReserveRequest) -> Result<Customer, ReservationError> {
    if request.raffle_id <= 0 {
        return Err(ReservationError::Validation(
            "a raffle id is required".to_string(),
        ));
    }

    if request.ticket_number.trim().is_empty() {
        return Err(ReservationError::Validation(
            "a ticket number is required".to_string(),
        ));
    }

    let name = request.name.trim();
    if name.is_empty() {
        return Err(ReservationError::Validation(
            "a customer name is required".to_string(),
        ));
    }

    let phone = normalize_phone(&request.phone).ok_or_else(|| {
        ReservationError::Validation("the phone number must contain 9 to 15 digits".to_string())
    })?;

    let email = match request.email.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(e) if is_valid_email(e) => Some(e.to_string()),
        Some(_) => {
            return Err(ReservationError::Validation(
                "the email address is not valid".to_string(),
            ));
        }
    };

    Ok(Customer {
        name: name.to_string(),
        phone,
        email,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ReserveRequest {
        ReserveRequest {
            raffle_id: 1,
            ticket_number: "0007".to_string(),
            name: "Ana".to_string(),
            phone: "555-123-4567".to_string(),
            email: None,
        }
    }

    #[test]
    fn phone_is_normalized_to_digits() {
        assert_eq!(
            normalize_phone("+52 (555) 123-4567").as_deref(),
            Some("525551234567")
        );
        assert_eq!(normalize_phone("12345678").as_deref(), None); // 8 digits
        assert_eq!(normalize_phone("1234567890123456").as_deref(), None); // 16
        assert_eq!(normalize_phone("no digits").as_deref(), None);
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("ana@example.com"));
        assert!(!is_valid_email("ana@example"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a b@example.com"));
    }

    #[test]
    fn validation_accepts_and_normalizes() {
        let customer = validate_request(&request()).unwrap();
        assert_eq!(customer.phone, "5551234567");
        assert_eq!(customer.name, "Ana");
        assert!(customer.email.is_none());
    }

    #[test]
    fn validation_rejects_missing_fields() {
        let mut r = request();
        r.name = "  ".to_string();
        assert!(matches!(
            validate_request(&r),
            Err(ReservationError::Validation(_))
        ));

        let mut r = request();
        r.ticket_number = String::new();
        assert!(matches!(
            validate_request(&r),
            Err(ReservationError::Validation(_))
        ));

        let mut r = request();
        r.email = Some("broken@".to_string());
        assert!(matches!(
            validate_request(&r),
            Err(ReservationError::Validation(_))
        ));
    }

    #[test]
    fn empty_email_is_treated_as_absent() {
        let mut r = request();
        r.email = Some("   ".to_string());
        let customer = validate_request(&r).unwrap();
        assert!(customer.email.is_none());
    }
}
