use crate::entities::{blocked_numbers, prelude::*};
use crate::models::BlockEntry;
use anyhow::Result;
use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::info;

/// Registry of temporarily blocked phone numbers.
///
/// Blocked-ness is always evaluated against the clock at call time; rows
/// whose `block_until` has passed are inert whether or not they have been
/// purged.
pub struct BlockRepository {
    conn: DatabaseConnection,
}

impl BlockRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_entry_model(e: blocked_numbers::Model) -> BlockEntry {
        BlockEntry {
            id: e.id,
            phone_number: e.phone_number,
            block_until: e.block_until.to_rfc3339(),
            created_at: e.created_at.to_rfc3339(),
        }
    }

    pub async fn is_blocked(&self, phone: &str) -> Result<bool> {
        let count = BlockedNumbers::find()
            .filter(blocked_numbers::Column::PhoneNumber.eq(phone))
            .filter(blocked_numbers::Column::BlockUntil.gt(Utc::now()))
            .count(&self.conn)
            .await?;

        Ok(count > 0)
    }

    /// Inserts a fresh entry; an already-blocked number simply gets a
    /// second, independent one.
    pub async fn block(&self, phone: &str, minutes: u32) -> Result<BlockEntry> {
        let now = Utc::now();
        let model = blocked_numbers::ActiveModel {
            phone_number: Set(phone.to_string()),
            block_until: Set(now + Duration::minutes(i64::from(minutes))),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?;

        info!("Blocked phone for {} minutes (entry {})", minutes, model.id);
        Ok(Self::map_entry_model(model))
    }

    /// Deletes one entry; other entries for the same number are untouched.
    pub async fn unblock(&self, entry_id: i32) -> Result<bool> {
        let result = BlockedNumbers::delete_by_id(entry_id)
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Removes expired rows. Advisory housekeeping only; `is_blocked`
    /// filters by time regardless.
    pub async fn purge_expired(&self) -> Result<u64> {
        let result = BlockedNumbers::delete_many()
            .filter(blocked_numbers::Column::BlockUntil.lt(Utc::now()))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }

    pub async fn list_active(&self) -> Result<Vec<BlockEntry>> {
        let rows = BlockedNumbers::find()
            .filter(blocked_numbers::Column::BlockUntil.gt(Utc::now()))
            .order_by_desc(blocked_numbers::Column::CreatedAt)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Self::map_entry_model).collect())
    }
}
