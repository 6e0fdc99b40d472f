//! Presence and shape checks applied before a request reaches the store.

use crate::{CoreError, Score, SHARED_SCOPE};
use serde_json::Value;

/// Returns the value when it is present and not blank.
pub fn required<'a>(value: Option<&'a str>, msg: &'static str) -> Result<&'a str, CoreError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(CoreError::Invalid(msg)),
    }
}

/// Picks the deck scope for a request. A blank user counts as absent.
pub fn scope(user: Option<&str>, require_user: bool) -> Result<&str, CoreError> {
    match user {
        Some(u) if !u.trim().is_empty() => Ok(u),
        _ if require_user => Err(CoreError::Invalid("userId is required")),
        _ => Ok(SHARED_SCOPE),
    }
}

/// Accepts integral JSON numbers and numeric strings.
pub fn score(value: Option<&Value>) -> Result<Score, CoreError> {
    const NOT_A_NUMBER: CoreError = CoreError::Invalid("score must be a whole number");
    match value {
        None | Some(Value::Null) => Err(CoreError::Invalid("score is required")),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
                _ => Err(NOT_A_NUMBER),
            }
        }
        Some(Value::String(s)) => s.trim().parse::<Score>().map_err(|_| NOT_A_NUMBER),
        Some(_) => Err(NOT_A_NUMBER),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_is_missing() {
        assert_eq!(required(Some("  "), "name is required"), Err(CoreError::Invalid("name is required")));
        assert_eq!(required(None, "x"), Err(CoreError::Invalid("x")));
        assert_eq!(required(Some("Animals"), "x"), Ok("Animals"));
    }

    #[test]
    fn scope_falls_back_unless_required() {
        assert_eq!(scope(None, false), Ok(SHARED_SCOPE));
        assert_eq!(scope(Some(""), false), Ok(SHARED_SCOPE));
        assert_eq!(scope(Some("anna"), true), Ok("anna"));
        assert!(scope(None, true).is_err());
    }

    #[test]
    fn score_shapes() {
        assert_eq!(score(Some(&json!(87))), Ok(87));
        assert_eq!(score(Some(&json!(-3))), Ok(-3));
        assert_eq!(score(Some(&json!(12.0))), Ok(12));
        assert_eq!(score(Some(&json!(" 55 "))), Ok(55));
        assert!(score(Some(&json!(1.5))).is_err());
        assert!(score(Some(&json!("lots"))).is_err());
        assert!(score(Some(&json!(true))).is_err());
        assert_eq!(score(None), Err(CoreError::Invalid("score is required")));
        assert_eq!(score(Some(&Value::Null)), Err(CoreError::Invalid("score is required")));
    }
}
