//! Argument check factories.
//!
//! Each factory binds its parameters (bounds, field names) and returns
//! a reusable closure that inspects one value and reports a
//! [`validator::ValidationError`] with a human-readable message on
//! failure. Checks never mutate their input. Scalar DTO fields are
//! covered by `validator` derive attributes; these factories cover
//! query/path scalars and the checks the derive has no attribute for.

use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;

use serde_json::{Map, Value};
use validator::{ValidateUrl, ValidationError};

/// Upper bound on accepted email address length
const EMAIL_MAX_LEN: usize = 320;

fn invalid(code: &'static str, message: String) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

pub fn greater_than<T>(bound: T) -> impl Fn(&T) -> Result<(), ValidationError>
where
    T: PartialOrd + Display,
{
    move |value| {
        if *value > bound {
            Ok(())
        } else {
            Err(invalid(
                "greater_than",
                format!("Parameter must be greater than {}", bound),
            ))
        }
    }
}

pub fn greater_or_equal<T>(bound: T) -> impl Fn(&T) -> Result<(), ValidationError>
where
    T: PartialOrd + Display,
{
    move |value| {
        if *value >= bound {
            Ok(())
        } else {
            Err(invalid(
                "greater_or_equal",
                format!("Parameter must be greater than or equal {}", bound),
            ))
        }
    }
}

pub fn less_than<T>(bound: T) -> impl Fn(&T) -> Result<(), ValidationError>
where
    T: PartialOrd + Display,
{
    move |value| {
        if *value < bound {
            Ok(())
        } else {
            Err(invalid(
                "less_than",
                format!("Parameter must be less than {}", bound),
            ))
        }
    }
}

pub fn less_or_equal<T>(bound: T) -> impl Fn(&T) -> Result<(), ValidationError>
where
    T: PartialOrd + Display,
{
    move |value| {
        if *value <= bound {
            Ok(())
        } else {
            Err(invalid(
                "less_or_equal",
                format!("Parameter must be less than or equal {}", bound),
            ))
        }
    }
}

/// Inclusive interval check
pub fn between<T>(lo: T, hi: T) -> impl Fn(&T) -> Result<(), ValidationError>
where
    T: PartialOrd + Display,
{
    move |value| {
        if *value < lo || *value > hi {
            Err(invalid(
                "between",
                format!("Parameter must be from interval [{}..{}]", lo, hi),
            ))
        } else {
            Ok(())
        }
    }
}

pub fn max_length(max: usize) -> impl Fn(&str) -> Result<(), ValidationError> {
    move |value| {
        let len = value.chars().count();
        if len > max {
            Err(invalid(
                "max_length",
                format!(
                    "Parameter length must not be greater than {}. Your parameter has length {}.",
                    max, len
                ),
            ))
        } else {
            Ok(())
        }
    }
}

/// Accepts addresses of at most 320 chars containing `@` with a `.`
/// somewhere after the character following the `@`.
pub fn is_valid_email(email: &str) -> Result<(), ValidationError> {
    let chars: Vec<char> = email.chars().collect();
    let ok = chars.len() <= EMAIL_MAX_LEN
        && match chars.iter().position(|&c| c == '@') {
            Some(at) => chars.iter().skip(at + 2).any(|&c| c == '.'),
            None => false,
        };
    if ok {
        Ok(())
    } else {
        Err(invalid("email", "Wrong email format".to_string()))
    }
}

pub fn is_not_empty<T>(items: &[T]) -> Result<(), ValidationError> {
    if items.is_empty() {
        Err(invalid("not_empty", "Array is empty".to_string()))
    } else {
        Ok(())
    }
}

/// Membership check; the message lists every allowed choice.
pub fn one_of<T>(choices: Vec<T>) -> impl Fn(&T) -> Result<(), ValidationError>
where
    T: PartialEq + Display,
{
    move |value| {
        if choices.contains(value) {
            Ok(())
        } else {
            let listed = choices
                .iter()
                .map(|choice| choice.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            Err(invalid(
                "one_of",
                format!("Parameter must be one of: {}", listed),
            ))
        }
    }
}

pub fn has_unique_values<T>(items: &[T]) -> Result<(), ValidationError>
where
    T: Eq + Hash,
{
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item) {
            return Err(invalid(
                "unique_values",
                "List must contain only unique values.".to_string(),
            ));
        }
    }
    Ok(())
}

// Python-style truthiness over submitted JSON arguments: null, false,
// zero and empty collections count as absent.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

/// Exactly one of the two named arguments must be present.
pub fn exactly_one_of(
    first: &'static str,
    second: &'static str,
) -> impl Fn(&Map<String, Value>) -> Result<(), ValidationError> {
    move |args| {
        if is_truthy(args.get(first)) ^ is_truthy(args.get(second)) {
            Ok(())
        } else {
            Err(invalid(
                "exactly_one_of",
                format!(
                    "Either parameter {} or parameter {} must be passed. \
                     Parameters must not be passed together.",
                    first, second
                ),
            ))
        }
    }
}

/// The two named arguments must not both be present.
pub fn not_both_present(
    first: &'static str,
    second: &'static str,
) -> impl Fn(&Map<String, Value>) -> Result<(), ValidationError> {
    move |args| {
        if is_truthy(args.get(first)) && is_truthy(args.get(second)) {
            Err(invalid(
                "not_both",
                format!(
                    "Parameters {} and {} must not be present at once",
                    first, second
                ),
            ))
        } else {
            Ok(())
        }
    }
}

/// Well-formed URL check (scheme + host). Signature matches what
/// `#[validate(custom(...))]` expects, so DTOs use it directly.
pub fn is_valid_url(url: &str) -> Result<(), ValidationError> {
    if url.validate_url() {
        Ok(())
    } else {
        Err(invalid(
            "url",
            format!("Url address {} is not valid.", url),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(result: Result<(), ValidationError>) -> String {
        result.unwrap_err().message.unwrap().to_string()
    }

    #[test]
    fn test_comparisons() {
        assert!(greater_than(0)(&1).is_ok());
        assert!(greater_than(0)(&0).is_err());
        assert!(greater_or_equal(0)(&0).is_ok());
        assert!(greater_or_equal(0)(&-1).is_err());
        assert!(less_than(10)(&9).is_ok());
        assert!(less_than(10)(&10).is_err());
        assert!(less_or_equal(10)(&10).is_ok());
        assert!(less_or_equal(10)(&11).is_err());
    }

    #[test]
    fn test_between_bounds_inclusive() {
        let check = between(1, 1000);
        assert!(check(&1).is_ok());
        assert!(check(&1000).is_ok());
        assert!(check(&0).is_err());
        assert!(check(&1001).is_err());
        assert_eq!(message(check(&0)), "Parameter must be from interval [1..1000]");
    }

    #[test]
    fn test_max_length() {
        let check = max_length(5);
        assert!(check("12345").is_ok());
        assert!(check("123456").is_err());
        assert_eq!(
            message(check("123456")),
            "Parameter length must not be greater than 5. Your parameter has length 6."
        );
    }

    #[test]
    fn test_email_format() {
        assert!(is_valid_email("a@b.c").is_ok());
        assert!(is_valid_email("user@example.com").is_ok());
        assert!(is_valid_email("a@b").is_err());
        assert!(is_valid_email("a@.c").is_err());
        assert!(is_valid_email("plainaddress").is_err());
        // over the 320-char cap
        let long = format!("{}@b.c", "a".repeat(400));
        assert!(is_valid_email(&long).is_err());
    }

    #[test]
    fn test_is_not_empty() {
        assert!(is_not_empty(&[1]).is_ok());
        assert!(is_not_empty::<i32>(&[]).is_err());
    }

    #[test]
    fn test_one_of_lists_choices() {
        let check = one_of(vec!["asc", "desc"]);
        assert!(check(&"asc").is_ok());
        assert_eq!(
            message(check(&"sideways")),
            "Parameter must be one of: asc, desc"
        );
    }

    #[test]
    fn test_has_unique_values() {
        assert!(has_unique_values(&[1, 2, 3]).is_ok());
        assert!(has_unique_values(&[1, 2, 2]).is_err());
    }

    #[test]
    fn test_exactly_one_of() {
        let check = exactly_one_of("email", "phone");
        let both = json!({"email": "a@b.c", "phone": "123"});
        let neither = json!({});
        let one = json!({"email": "a@b.c"});
        // null and empty string count as absent
        let falsy = json!({"email": "a@b.c", "phone": ""});
        assert!(check(both.as_object().unwrap()).is_err());
        assert!(check(neither.as_object().unwrap()).is_err());
        assert!(check(one.as_object().unwrap()).is_ok());
        assert!(check(falsy.as_object().unwrap()).is_ok());
    }

    #[test]
    fn test_not_both_present() {
        let check = not_both_present("limit", "all");
        let both = json!({"limit": 10, "all": true});
        let one = json!({"limit": 10});
        assert!(check(both.as_object().unwrap()).is_err());
        assert!(check(one.as_object().unwrap()).is_ok());
        assert!(check(json!({}).as_object().unwrap()).is_ok());
    }

    #[test]
    fn test_url_format() {
        assert!(is_valid_url("https://example.com/path").is_ok());
        assert!(is_valid_url("http://localhost:8080").is_ok());
        assert!(is_valid_url("not a url").is_err());
        assert!(is_valid_url("example.com").is_err());
    }
}
