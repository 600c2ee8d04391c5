//! Environment overlay
//!
//! Each field's effective default is its inherited value (struct default,
//! possibly replaced by the configuration file) unless the matching
//! environment variable supplies a usable value.

use super::error::{ConfigError, Result};
use super::schema::FieldValue;

/// Apply the environment value `env` of variable `var` over `inherited`
pub fn overlay(var: &str, env: Option<&str>, inherited: FieldValue) -> Result<FieldValue> {
    Ok(match inherited {
        FieldValue::Bool(v) => FieldValue::Bool(default_bool(env, v)),
        FieldValue::Int(v) => FieldValue::Int(default_int(var, env, v)?),
        FieldValue::String(v) => FieldValue::String(default_string(env, v)),
        FieldValue::StringList(v) => FieldValue::StringList(default_string_list(env, v)),
    })
}

/// `true`/`1` and `false`/`0` (case-insensitive); anything else keeps `inherited`
pub fn default_bool(env: Option<&str>, inherited: bool) -> bool {
    match env {
        Some(v) if v.eq_ignore_ascii_case("true") || v == "1" => true,
        Some(v) if v.eq_ignore_ascii_case("false") || v == "0" => false,
        _ => inherited,
    }
}

/// Base-10 integer; a malformed value is an error rather than a fallback
pub fn default_int(var: &str, env: Option<&str>, inherited: i64) -> Result<i64> {
    match env {
        Some(v) if !v.is_empty() => v.parse().map_err(|e: std::num::ParseIntError| {
            ConfigError::InvalidEnvValue {
                var: var.to_owned(),
                value: v.to_owned(),
                reason: e.to_string(),
            }
        }),
        _ => Ok(inherited),
    }
}

pub fn default_string(env: Option<&str>, inherited: String) -> String {
    match env {
        Some(v) if !v.is_empty() => v.to_owned(),
        _ => inherited,
    }
}

/// Comma-separated, order preserved
pub fn default_string_list(env: Option<&str>, inherited: Vec<String>) -> Vec<String> {
    match env {
        Some(v) if !v.is_empty() => v.split(',').map(str::to_owned).collect(),
        _ => inherited,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool() {
        assert!(default_bool(Some("TRUE"), false));
        assert!(default_bool(Some("1"), false));
        assert!(!default_bool(Some("False"), true));
        assert!(!default_bool(Some("0"), true));
        assert!(default_bool(Some("yes"), true));
        assert!(!default_bool(Some("yes"), false));
        assert!(default_bool(None, true));
        assert!(!default_bool(Some(""), false));
    }

    #[test]
    fn test_int() {
        assert_eq!(default_int("APP_N", Some("42"), 1).unwrap(), 42);
        assert_eq!(default_int("APP_N", Some("-7"), 1).unwrap(), -7);
        assert_eq!(default_int("APP_N", None, 1).unwrap(), 1);
        assert_eq!(default_int("APP_N", Some(""), 1).unwrap(), 1);

        let err = default_int("APP_N", Some("forty"), 1).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvValue { ref var, .. } if var == "APP_N"));
    }

    #[test]
    fn test_string() {
        assert_eq!(default_string(Some("x"), "d".into()), "x");
        assert_eq!(default_string(Some(""), "d".into()), "d");
        assert_eq!(default_string(None, "d".into()), "d");
    }

    #[test]
    fn test_string_list() {
        assert_eq!(
            default_string_list(Some("a,b,,c"), vec![]),
            vec!["a", "b", "", "c"]
        );
        assert_eq!(default_string_list(None, vec!["d".into()]), vec!["d"]);
        assert_eq!(default_string_list(Some(""), vec!["d".into()]), vec!["d"]);
    }

    #[test]
    fn test_overlay_keeps_kind() {
        let value = overlay("APP_X", Some("9"), FieldValue::Int(0)).unwrap();
        assert_eq!(value, FieldValue::Int(9));

        let value = overlay("APP_X", Some("9"), FieldValue::String("a".into())).unwrap();
        assert_eq!(value, FieldValue::String("9".into()));
    }
}
