use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for a category row.
///
/// `active` is the soft-delete marker: NULL means the row is live, a
/// timestamp records when it was deleted. The parent relation is a
/// plain id resolved by lookup, never a stored back-reference.
#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    pub active: Option<DateTime<Utc>>,
    pub created: DateTime<Utc>,
}
