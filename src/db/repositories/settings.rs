use crate::entities::{prelude::*, settings};
use crate::models::BlockSettings;
use anyhow::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

/// Stable setting keys shared with the admin workflow.
pub mod keys {
    pub const SITE_NAME: &str = "site_name";
    pub const WHATSAPP_TEMPLATE: &str = "whatsapp_message_template";
    pub const COUNTRY_CODE: &str = "country_code";
    pub const ADMIN_WHATSAPP: &str = "admin_whatsapp";
    pub const BLOCK_ENABLED: &str = "block_enabled";
    pub const BLOCK_DURATION: &str = "block_duration";
}

/// Key/value site configuration. Values are read fresh on every call so
/// admin changes propagate within one request.
pub struct SettingsRepository {
    conn: DatabaseConnection,
}

impl SettingsRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = Settings::find()
            .filter(settings::Column::SettingKey.eq(key))
            .one(&self.conn)
            .await?;

        Ok(row.map(|r| r.setting_value))
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        let model = settings::ActiveModel {
            setting_key: Set(key.to_string()),
            setting_value: Set(value.to_string()),
            ..Default::default()
        };

        Settings::insert(model)
            .on_conflict(
                OnConflict::column(settings::Column::SettingKey)
                    .update_column(settings::Column::SettingValue)
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<(String, String)>> {
        let rows = Settings::find()
            .order_by_asc(settings::Column::SettingKey)
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| (r.setting_key, r.setting_value))
            .collect())
    }

    pub async fn block_settings(&self) -> Result<BlockSettings> {
        let mut out = BlockSettings::default();

        let rows = Settings::find()
            .filter(
                settings::Column::SettingKey.is_in([keys::BLOCK_ENABLED, keys::BLOCK_DURATION]),
            )
            .all(&self.conn)
            .await?;

        for row in rows {
            match row.setting_key.as_str() {
                keys::BLOCK_ENABLED => {
                    out.enabled = row.setting_value == "1" || row.setting_value == "true";
                }
                keys::BLOCK_DURATION => {
                    if let Ok(minutes) = row.setting_value.parse::<u32>() {
                        out.duration_minutes = minutes.max(1);
                    }
                }
                _ => {}
            }
        }

        Ok(out)
    }
}
