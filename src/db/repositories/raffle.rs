use crate::entities::{prelude::*, raffles, tickets};
use crate::models::{Raffle, RaffleStatus};
use anyhow::Result;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

/// Repository for raffle reads plus the admin-side create used to seed
/// raffles. The reservation core only ever reads from here.
pub struct RaffleRepository {
    conn: DatabaseConnection,
}

pub struct NewRaffle {
    pub title: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub tags: Vec<String>,
    pub status: RaffleStatus,
}

impl RaffleRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_raffle_model(r: raffles::Model) -> Raffle {
        let tags = r
            .tags
            .as_deref()
            .and_then(|t| serde_json::from_str(t).ok())
            .unwrap_or_default();

        Raffle {
            id: r.id,
            title: r.title,
            description: r.description,
            image: r.image,
            tags,
            status: RaffleStatus::parse(&r.status),
            created_at: r.created_at.to_rfc3339(),
        }
    }

    pub async fn add(&self, raffle: NewRaffle) -> Result<Raffle> {
        let tags = if raffle.tags.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&raffle.tags)?)
        };

        let model = raffles::ActiveModel {
            title: Set(raffle.title),
            description: Set(raffle.description),
            image: Set(raffle.image),
            tags: Set(tags),
            status: Set(raffle.status.as_str().to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?;

        Ok(Self::map_raffle_model(model))
    }

    pub async fn get(&self, id: i32) -> Result<Option<Raffle>> {
        let result = Raffles::find_by_id(id).one(&self.conn).await?;
        Ok(result.map(Self::map_raffle_model))
    }

    pub async fn list(&self, active_only: bool) -> Result<Vec<Raffle>> {
        let mut query = Raffles::find().order_by_desc(raffles::Column::CreatedAt);
        if active_only {
            query = query.filter(raffles::Column::Status.eq(RaffleStatus::Active.as_str()));
        }

        let rows = query.all(&self.conn).await?;
        Ok(rows.into_iter().map(Self::map_raffle_model).collect())
    }

    /// Ticket numbers already taken in a raffle, for the public grid.
    pub async fn reserved_numbers(&self, raffle_id: i32) -> Result<Vec<String>> {
        let numbers: Vec<String> = Tickets::find()
            .select_only()
            .column(tickets::Column::TicketNumber)
            .filter(tickets::Column::RaffleId.eq(raffle_id))
            .order_by_asc(tickets::Column::TicketNumber)
            .into_tuple()
            .all(&self.conn)
            .await?;

        Ok(numbers)
    }
}
