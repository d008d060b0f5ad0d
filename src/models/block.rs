use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockEntry {
    pub id: i32,
    pub phone_number: String,
    pub block_until: String,
    pub created_at: String,
}

/// Admin-controlled block policy, read fresh from the settings table on
/// every reservation attempt so changes propagate within one request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BlockSettings {
    pub enabled: bool,
    pub duration_minutes: u32,
}

impl Default for BlockSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            duration_minutes: 30,
        }
    }
}
