use std::collections::BTreeMap;
use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use validator::{ValidationErrors, ValidationErrorsKind};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(ArgumentErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// One entry of the error response body.
///
/// Serialized untagged: field failures carry `argumentName` +
/// `messages`, per-item failures carry `itemErrorMessages` keyed by
/// item index, and anything without a field attribution is a bare
/// message list.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum ArgumentError {
    Field {
        #[serde(rename = "argumentName")]
        argument_name: String,
        messages: Vec<String>,
    },
    Items {
        #[serde(rename = "argumentName")]
        argument_name: String,
        #[serde(rename = "itemErrorMessages")]
        item_error_messages: BTreeMap<String, Vec<String>>,
    },
    General {
        messages: Vec<String>,
    },
}

/// Aggregated per-request validation failures.
///
/// A request collects every failed argument into one of these before
/// responding, so the client sees all offending fields at once.
#[derive(Debug, Clone, Default)]
pub struct ArgumentErrors(Vec<ArgumentError>);

impl ArgumentErrors {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn field(name: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push_field(name, message);
        errors
    }

    pub fn general(message: impl Into<String>) -> Self {
        Self(vec![ArgumentError::General {
            messages: vec![message.into()],
        }])
    }

    pub fn push_field(&mut self, name: impl Into<String>, message: impl Into<String>) {
        let name = name.into();
        let message = message.into();
        // Merge into an existing entry for the same argument
        for entry in &mut self.0 {
            if let ArgumentError::Field {
                argument_name,
                messages,
            } = entry
            {
                if *argument_name == name {
                    messages.push(message);
                    return;
                }
            }
        }
        self.0.push(ArgumentError::Field {
            argument_name: name,
            messages: vec![message],
        });
    }

    pub fn push_check(&mut self, name: impl Into<String>, result: std::result::Result<(), validator::ValidationError>) {
        if let Err(e) = result {
            self.push_field(name, error_message(&e));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_entries(self) -> Vec<ArgumentError> {
        self.0
    }
}

impl fmt::Display for ArgumentErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for entry in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            first = false;
            match entry {
                ArgumentError::Field {
                    argument_name,
                    messages,
                } => write!(f, "{}: {}", argument_name, messages.join(", "))?,
                ArgumentError::Items {
                    argument_name,
                    item_error_messages,
                } => write!(
                    f,
                    "{}: {} invalid item(s)",
                    argument_name,
                    item_error_messages.len()
                )?,
                ArgumentError::General { messages } => write!(f, "{}", messages.join(", "))?,
            }
        }
        Ok(())
    }
}

fn error_message(error: &validator::ValidationError) -> String {
    error
        .message
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| error.code.to_string())
}

fn flatten(prefix: &str, errors: &ValidationErrors, out: &mut ArgumentErrors) {
    // Sort by field name so the response body is deterministic
    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by_key(|(name, _)| name.to_string());

    for (name, kind) in fields {
        let name = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", prefix, name)
        };
        match kind {
            ValidationErrorsKind::Field(failures) => {
                for failure in failures {
                    out.push_field(&name, error_message(failure));
                }
            }
            ValidationErrorsKind::Struct(nested) => flatten(&name, nested, out),
            ValidationErrorsKind::List(items) => {
                let item_error_messages: BTreeMap<String, Vec<String>> = items
                    .iter()
                    .map(|(index, nested)| {
                        let mut nested_out = ArgumentErrors::new();
                        flatten("", nested, &mut nested_out);
                        let messages = nested_out
                            .0
                            .into_iter()
                            .flat_map(|entry| match entry {
                                ArgumentError::Field {
                                    argument_name,
                                    messages,
                                } => messages
                                    .into_iter()
                                    .map(|m| format!("{}: {}", argument_name, m))
                                    .collect::<Vec<_>>(),
                                ArgumentError::General { messages } => messages,
                                ArgumentError::Items { .. } => Vec::new(),
                            })
                            .collect();
                        (index.to_string(), messages)
                    })
                    .collect();
                out.0.push(ArgumentError::Items {
                    argument_name: name,
                    item_error_messages,
                });
            }
        }
    }
}

impl From<ValidationErrors> for ArgumentErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = ArgumentErrors::new();
        flatten("", &errors, &mut out);
        out
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(errors.into())
    }
}

/// Constraint name of a write-time unique/foreign-key violation, if any.
///
/// Pre-write checks can race a concurrent request; the database then
/// reports the violation the checks were meant to catch. Services map
/// the constraint back to the offending argument so the client gets the
/// same 400 either way.
pub fn constraint_violation(error: &sqlx::Error) -> Option<&str> {
    match error {
        sqlx::Error::Database(db) => db.constraint(),
        _ => None,
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub status: u16,
    pub errors: Vec<ArgumentError>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, errors) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ArgumentErrors::general("Database error occurred"),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ArgumentErrors::general(msg)),
            AppError::Validation(errors) => (StatusCode::BAD_REQUEST, errors),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ArgumentErrors::general(msg)),
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ArgumentErrors::general("Internal server error"),
                )
            }
        };

        let body = ErrorBody {
            status: status.as_u16(),
            errors: errors.into_entries(),
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use validator::Validate;

    #[derive(Validate)]
    struct Payload {
        #[validate(length(min = 1, max = 5, message = "Length must be between [1, 5]."))]
        name: String,
        #[validate(range(min = 1, message = "Parameter must be greater than or equal 1"))]
        count: i64,
    }

    #[test]
    fn aggregates_all_failed_fields_sorted() {
        let payload = Payload {
            name: "too long for the cap".to_string(),
            count: 0,
        };
        let errors: ArgumentErrors = payload.validate().unwrap_err().into();
        let entries = errors.into_entries();
        assert_eq!(entries.len(), 2);
        match &entries[0] {
            ArgumentError::Field {
                argument_name,
                messages,
            } => {
                assert_eq!(argument_name, "count");
                assert_eq!(messages, &["Parameter must be greater than or equal 1"]);
            }
            other => panic!("unexpected entry: {:?}", other),
        }
        match &entries[1] {
            ArgumentError::Field { argument_name, .. } => assert_eq!(argument_name, "name"),
            other => panic!("unexpected entry: {:?}", other),
        }
    }

    #[test]
    fn field_entries_serialize_with_argument_name() {
        let errors = ArgumentErrors::field("name", "Link with name: foo already exists.");
        let body = ErrorBody {
            status: 400,
            errors: errors.into_entries(),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "status": 400,
                "errors": [{
                    "argumentName": "name",
                    "messages": ["Link with name: foo already exists."]
                }]
            })
        );
    }

    #[test]
    fn general_entries_have_no_argument_name() {
        let errors = ArgumentErrors::general("not found");
        let value = serde_json::to_value(errors.into_entries()).unwrap();
        assert_eq!(value, json!([{ "messages": ["not found"] }]));
    }

    #[test]
    fn repeated_field_failures_merge_into_one_entry() {
        let mut errors = ArgumentErrors::new();
        errors.push_field("name", "first");
        errors.push_field("name", "second");
        let entries = errors.into_entries();
        assert_eq!(entries.len(), 1);
        match &entries[0] {
            ArgumentError::Field { messages, .. } => assert_eq!(messages, &["first", "second"]),
            other => panic!("unexpected entry: {:?}", other),
        }
    }
}
