/// Default number of rows returned by list endpoints
pub const DEFAULT_LIST_LIMIT: i64 = 100;

/// Smallest accepted list `limit`
pub const MIN_LIST_LIMIT: i64 = 1;

/// Largest accepted list `limit`
pub const MAX_LIST_LIMIT: i64 = 1000;
