use serde::Deserialize;
use utoipa::IntoParams;

use crate::core::error::{AppError, ArgumentErrors};
use crate::shared::constants::{DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT, MIN_LIST_LIMIT};
use crate::shared::validation::{between, greater_or_equal, greater_than};

/// Standard limit/offset query parameters for list endpoints.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ListQuery {
    /// Maximum number of rows to return (1-1000, default: 100)
    #[param(minimum = 1, maximum = 1000)]
    pub limit: Option<i64>,

    /// Number of rows to skip (default: 0)
    #[param(minimum = 0)]
    pub offset: Option<i64>,
}

impl ListQuery {
    /// Apply defaults and bounds checks, collecting every violation
    /// into one argument-error list.
    pub fn resolve(&self) -> Result<(i64, i64), AppError> {
        let mut errors = ArgumentErrors::new();

        let limit = self.limit.unwrap_or(DEFAULT_LIST_LIMIT);
        errors.push_check("limit", between(MIN_LIST_LIMIT, MAX_LIST_LIMIT)(&limit));

        let offset = self.offset.unwrap_or(0);
        errors.push_check("offset", greater_or_equal(0)(&offset));

        if errors.is_empty() {
            Ok((limit, offset))
        } else {
            Err(AppError::Validation(errors))
        }
    }
}

/// Path ids must be positive integers.
pub fn checked_id(id: i64) -> Result<i64, AppError> {
    let mut errors = ArgumentErrors::new();
    errors.push_check("id", greater_than(0)(&id));
    if errors.is_empty() {
        Ok(id)
    } else {
        Err(AppError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ArgumentError;

    fn field_names(error: AppError) -> Vec<String> {
        match error {
            AppError::Validation(errors) => errors
                .into_entries()
                .into_iter()
                .filter_map(|entry| match entry {
                    ArgumentError::Field { argument_name, .. } => Some(argument_name),
                    _ => None,
                })
                .collect(),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn defaults_to_limit_100_offset_0() {
        let query = ListQuery::default();
        assert_eq!(query.resolve().unwrap(), (100, 0));
    }

    #[test]
    fn offset_zero_is_accepted() {
        let query = ListQuery {
            limit: Some(10),
            offset: Some(0),
        };
        assert_eq!(query.resolve().unwrap(), (10, 0));
    }

    #[test]
    fn limit_bounds_are_inclusive() {
        for limit in [1, 1000] {
            let query = ListQuery {
                limit: Some(limit),
                offset: None,
            };
            assert_eq!(query.resolve().unwrap(), (limit, 0));
        }
        for limit in [0, 1001] {
            let query = ListQuery {
                limit: Some(limit),
                offset: None,
            };
            assert_eq!(field_names(query.resolve().unwrap_err()), ["limit"]);
        }
    }

    #[test]
    fn negative_offset_and_bad_limit_are_both_reported() {
        let query = ListQuery {
            limit: Some(0),
            offset: Some(-1),
        };
        assert_eq!(
            field_names(query.resolve().unwrap_err()),
            ["limit", "offset"]
        );
    }

    #[test]
    fn path_ids_must_be_positive() {
        assert_eq!(checked_id(7).unwrap(), 7);
        assert_eq!(field_names(checked_id(0).unwrap_err()), ["id"]);
        assert_eq!(field_names(checked_id(-3).unwrap_err()), ["id"]);
    }
}
