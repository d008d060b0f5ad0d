use crate::entities::{prelude::*, raffles, reservations, tickets};
use crate::models::{
    Customer, PaymentStatus, RaffleStatus, Reservation, ReservationStatus, Ticket,
};
use crate::services::reservation_service::ReservationError;
use anyhow::Result;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr, TransactionTrait,
};
use std::collections::HashMap;
use tracing::{info, warn};

/// A successfully committed claim: the new rows plus the raffle title the
/// notifier needs.
pub struct ReservedTicket {
    pub ticket: Ticket,
    pub reservation: Reservation,
    pub raffle_title: String,
}

/// Row shape for the admin reservation list (reservation joined with its
/// ticket and raffle title).
pub struct ReservationListRow {
    pub reservation: Reservation,
    pub ticket_number: String,
    pub payment_status: PaymentStatus,
    pub raffle_title: String,
}

/// Filters for the admin reservation list.
#[derive(Default)]
pub struct ReservationFilter {
    pub status: Option<ReservationStatus>,
    pub payment: Option<PaymentStatus>,
    pub search: Option<String>,
}

/// Owns every write to the tickets/reservations pair. The uniqueness
/// constraint on (raffle_id, ticket_number) is the authoritative guard
/// against double claims; the in-transaction pre-check is only a fast path
/// for the common "ticket visibly taken" case.
pub struct ReservationRepository {
    conn: DatabaseConnection,
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// SQLite reports write-lock contention and stale-snapshot upgrades as
/// "database is locked" (or "database table is locked" under shared
/// cache). These are transient: the claim transaction can simply be run
/// again.
fn is_lock_contention(msg: &str) -> bool {
    msg.contains("database is locked") || msg.contains("database table is locked")
}

const CLAIM_ATTEMPTS: u32 = 5;

fn map_reservation_model(r: reservations::Model) -> Reservation {
    Reservation {
        id: r.id,
        ticket_id: r.ticket_id,
        customer_name: r.customer_name,
        customer_phone: r.customer_phone,
        customer_email: r.customer_email,
        status: ReservationStatus::parse(&r.status).unwrap_or(ReservationStatus::Reserved),
        created_at: r.created_at.to_rfc3339(),
    }
}

impl ReservationRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Atomically claims `(raffle_id, ticket_number)` for `customer`.
    ///
    /// Two concurrent calls for the same pair race on the unique index and
    /// exactly one commits. A loser surfaces either as a constraint
    /// violation or, on a multi-connection pool, as SQLite lock contention
    /// when its read-then-write transaction tries to upgrade against the
    /// winner. The former maps straight to `TicketAlreadyReserved`; the
    /// latter is retried, and the re-run pre-check then finds the winner's
    /// row and reports the same `TicketAlreadyReserved`. Lock errors only
    /// escape as `Store` once the attempts are exhausted.
    pub async fn reserve(
        &self,
        raffle_id: i32,
        ticket_number: &str,
        customer: &Customer,
    ) -> Result<ReservedTicket, ReservationError> {
        let mut attempt = 1;
        loop {
            match self.try_reserve(raffle_id, ticket_number, customer).await {
                Err(ReservationError::Store(msg))
                    if attempt < CLAIM_ATTEMPTS && is_lock_contention(&msg) =>
                {
                    warn!(
                        raffle_id,
                        ticket_number, attempt, "Claim transaction hit lock contention, retrying"
                    );
                    attempt += 1;
                    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                }
                result => return result,
            }
        }
    }

    /// One claim transaction: the raffle must exist and be active, then a
    /// pending ticket and a reserved reservation are inserted together.
    /// Rolls back on any early return (drop).
    async fn try_reserve(
        &self,
        raffle_id: i32,
        ticket_number: &str,
        customer: &Customer,
    ) -> Result<ReservedTicket, ReservationError> {
        let txn = self.conn.begin().await?;

        let raffle = Raffles::find_by_id(raffle_id)
            .filter(raffles::Column::Status.eq(RaffleStatus::Active.as_str()))
            .one(&txn)
            .await?
            .ok_or(ReservationError::RaffleUnavailable)?;

        let taken = Tickets::find()
            .filter(tickets::Column::RaffleId.eq(raffle_id))
            .filter(tickets::Column::TicketNumber.eq(ticket_number))
            .one(&txn)
            .await?;

        if taken.is_some() {
            return Err(ReservationError::TicketAlreadyReserved);
        }

        let ticket = tickets::ActiveModel {
            raffle_id: Set(raffle_id),
            ticket_number: Set(ticket_number.to_string()),
            payment_status: Set(PaymentStatus::Pending.as_str().to_string()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ReservationError::TicketAlreadyReserved
            } else {
                ReservationError::Store(e.to_string())
            }
        })?;

        let reservation = reservations::ActiveModel {
            ticket_id: Set(ticket.id),
            customer_name: Set(customer.name.clone()),
            customer_phone: Set(customer.phone.clone()),
            customer_email: Set(customer.email.clone()),
            status: Set(ReservationStatus::Reserved.as_str().to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        // A deferred uniqueness failure can still surface here; it means the
        // same race as the insert path and gets the same answer.
        txn.commit().await.map_err(|e| {
            if is_unique_violation(&e) {
                ReservationError::TicketAlreadyReserved
            } else {
                ReservationError::Store(e.to_string())
            }
        })?;

        info!(
            raffle_id,
            ticket_number,
            reservation_id = reservation.id,
            "Ticket reserved"
        );

        Ok(ReservedTicket {
            ticket: super::ticket::TicketRepository::map_ticket_model(ticket),
            reservation: map_reservation_model(reservation),
            raffle_title: raffle.title,
        })
    }

    pub async fn get(&self, id: i32) -> Result<Option<Reservation>> {
        let result = Reservations::find_by_id(id).one(&self.conn).await?;
        Ok(result.map(map_reservation_model))
    }

    /// Confirms a reservation and marks its ticket paid in one transaction;
    /// both writes land or neither does.
    pub async fn confirm(
        &self,
        reservation_id: i32,
        ticket_id: i32,
    ) -> Result<(), ReservationError> {
        let txn = self.conn.begin().await?;

        let reservation = Reservations::find_by_id(reservation_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ReservationError::Validation(format!("reservation {reservation_id} not found"))
            })?;

        if reservation.ticket_id != ticket_id {
            return Err(ReservationError::Validation(format!(
                "reservation {reservation_id} does not belong to ticket {ticket_id}"
            )));
        }

        if ReservationStatus::parse(&reservation.status) != Some(ReservationStatus::Reserved) {
            return Err(ReservationError::Validation(format!(
                "reservation {reservation_id} is not pending confirmation"
            )));
        }

        let mut active: reservations::ActiveModel = reservation.into();
        active.status = Set(ReservationStatus::Confirmed.as_str().to_string());
        active.update(&txn).await?;

        let ticket = Tickets::find_by_id(ticket_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ReservationError::Validation(format!("ticket {ticket_id} not found"))
            })?;

        let mut active: tickets::ActiveModel = ticket.into();
        active.payment_status = Set(PaymentStatus::Paid.as_str().to_string());
        active.update(&txn).await?;

        txn.commit().await?;

        info!(reservation_id, ticket_id, "Reservation confirmed, ticket paid");
        Ok(())
    }

    /// Cancels a reservation. With `release_ticket` the underlying ticket
    /// row is deleted so the number becomes claimable again (the cascade
    /// also removes the reservation row); otherwise the ticket number stays
    /// consumed, which matches the historical behaviour.
    pub async fn cancel(
        &self,
        reservation_id: i32,
        release_ticket: bool,
    ) -> Result<(), ReservationError> {
        let txn = self.conn.begin().await?;

        let reservation = Reservations::find_by_id(reservation_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ReservationError::Validation(format!("reservation {reservation_id} not found"))
            })?;

        if ReservationStatus::parse(&reservation.status) != Some(ReservationStatus::Reserved) {
            return Err(ReservationError::Validation(format!(
                "reservation {reservation_id} is not pending"
            )));
        }

        if release_ticket {
            let ticket_id = reservation.ticket_id;
            Tickets::delete_by_id(ticket_id).exec(&txn).await?;
            txn.commit().await?;
            warn!(reservation_id, ticket_id, "Reservation cancelled, ticket released");
            return Ok(());
        }

        let mut active: reservations::ActiveModel = reservation.into();
        active.status = Set(ReservationStatus::Cancelled.as_str().to_string());
        active.update(&txn).await?;

        txn.commit().await?;

        info!(reservation_id, "Reservation cancelled, ticket stays consumed");
        Ok(())
    }

    pub async fn list(&self, filter: &ReservationFilter) -> Result<Vec<ReservationListRow>> {
        let mut query = Reservations::find()
            .find_also_related(Tickets)
            .order_by_desc(reservations::Column::CreatedAt);

        if let Some(status) = filter.status {
            query = query.filter(reservations::Column::Status.eq(status.as_str()));
        }

        if let Some(payment) = filter.payment {
            query = query.filter(tickets::Column::PaymentStatus.eq(payment.as_str()));
        }

        if let Some(search) = filter.search.as_deref() {
            query = query.filter(
                Condition::any()
                    .add(reservations::Column::CustomerName.contains(search))
                    .add(reservations::Column::CustomerPhone.contains(search))
                    .add(tickets::Column::TicketNumber.contains(search)),
            );
        }

        let rows = query.all(&self.conn).await?;

        let raffle_ids: Vec<i32> = rows
            .iter()
            .filter_map(|(_, t)| t.as_ref().map(|t| t.raffle_id))
            .collect();

        let titles: HashMap<i32, String> = Raffles::find()
            .filter(raffles::Column::Id.is_in(raffle_ids))
            .all(&self.conn)
            .await?
            .into_iter()
            .map(|r| (r.id, r.title))
            .collect();

        Ok(rows
            .into_iter()
            .filter_map(|(reservation, ticket)| {
                let ticket = ticket?;
                let raffle_title = titles.get(&ticket.raffle_id).cloned().unwrap_or_default();
                Some(ReservationListRow {
                    reservation: map_reservation_model(reservation),
                    ticket_number: ticket.ticket_number,
                    payment_status: PaymentStatus::parse(&ticket.payment_status),
                    raffle_title,
                })
            })
            .collect())
    }
}
