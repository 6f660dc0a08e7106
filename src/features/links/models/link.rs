use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for a link row. `active` NULL means live; a
/// timestamp records the soft-delete.
#[derive(Debug, Clone, FromRow)]
pub struct Link {
    pub id: i64,
    pub name: String,
    pub link: String,
    pub category_id: i64,
    pub active: Option<DateTime<Utc>>,
    pub created: DateTime<Utc>,
}
