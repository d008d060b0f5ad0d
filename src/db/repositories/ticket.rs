use crate::entities::{prelude::*, tickets};
use crate::models::{PaymentStatus, Ticket};
use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

/// Read-side ticket lookups. Ticket rows are only ever created inside the
/// reservation transaction in `ReservationRepository`.
pub struct TicketRepository {
    conn: DatabaseConnection,
}

impl TicketRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub(crate) fn map_ticket_model(t: tickets::Model) -> Ticket {
        Ticket {
            id: t.id,
            raffle_id: t.raffle_id,
            ticket_number: t.ticket_number,
            payment_status: PaymentStatus::parse(&t.payment_status),
        }
    }

    pub async fn get(&self, id: i32) -> Result<Option<Ticket>> {
        let result = Tickets::find_by_id(id).one(&self.conn).await?;
        Ok(result.map(Self::map_ticket_model))
    }

    pub async fn find(&self, raffle_id: i32, ticket_number: &str) -> Result<Option<Ticket>> {
        let result = Tickets::find()
            .filter(tickets::Column::RaffleId.eq(raffle_id))
            .filter(tickets::Column::TicketNumber.eq(ticket_number))
            .one(&self.conn)
            .await?;

        Ok(result.map(Self::map_ticket_model))
    }
}
