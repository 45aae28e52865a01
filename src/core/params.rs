//! Field readers used by `validate_with_defaults` implementations.
//!
//! Every failure is a [`ToolValidationError`] phrased so the calling model
//! goes back to the user for a real value instead of making one up.

use std::ops::RangeInclusive;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::core::error::{ToolError, ToolValidationError};
use crate::core::tool::Params;

pub fn missing(key: &str, expected: &str) -> ToolValidationError {
    ToolValidationError::new(format!(
        "Missing required parameter \"{key}\": expected {expected}. \
         Ask the user to provide it; do not guess or invent a value."
    ))
}

pub fn invalid(key: &str, expected: &str) -> ToolValidationError {
    ToolValidationError::new(format!(
        "Invalid value for \"{key}\": expected {expected}. \
         Ask the user for a corrected value; do not guess or invent one."
    ))
}

pub fn required_string(params: &Params, key: &str, expected: &str) -> Result<String, ToolValidationError> {
    match params.get(key) {
        None | Some(JsonValue::Null) => Err(missing(key, expected)),
        Some(JsonValue::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(_) => Err(invalid(key, expected)),
    }
}

/// Numbers, or strings holding a number, within `range`.
pub fn required_number(
    params: &Params,
    key: &str,
    range: RangeInclusive<f64>,
    expected: &str,
) -> Result<f64, ToolValidationError> {
    let value = match params.get(key) {
        None | Some(JsonValue::Null) => return Err(missing(key, expected)),
        Some(JsonValue::Number(n)) => n.as_f64(),
        Some(JsonValue::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    match value {
        Some(v) if v.is_finite() && range.contains(&v) => Ok(v),
        _ => Err(invalid(key, expected)),
    }
}

/// Whole numbers within `range`; absent or null yields `default`.
pub fn optional_integer(
    params: &Params,
    key: &str,
    range: RangeInclusive<u64>,
    default: u64,
) -> Result<u64, ToolValidationError> {
    let expected = format!("a whole number from {} to {}", range.start(), range.end());
    let value = match params.get(key) {
        None | Some(JsonValue::Null) => return Ok(default),
        Some(JsonValue::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64)),
        Some(JsonValue::String(s)) => s.trim().parse::<u64>().ok(),
        Some(_) => None,
    };
    match value {
        Some(v) if range.contains(&v) => Ok(v),
        _ => Err(invalid(key, &expected)),
    }
}

/// One of `choices` (case-insensitive); absent or null yields `default`.
pub fn optional_choice(
    params: &Params,
    key: &str,
    choices: &[&'static str],
    default: &'static str,
) -> Result<&'static str, ToolValidationError> {
    let expected = format!("one of {}", quoted(choices));
    match params.get(key) {
        None | Some(JsonValue::Null) => Ok(default),
        Some(JsonValue::String(s)) => choices
            .iter()
            .copied()
            .find(|c| c.eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| invalid(key, &expected)),
        Some(_) => Err(invalid(key, &expected)),
    }
}

/// Normalized args -> the mapping `validate_with_defaults` returns.
pub fn to_params<T: Serialize>(args: &T) -> Params {
    match serde_json::to_value(args) {
        Ok(JsonValue::Object(map)) => map,
        _ => Params::new(),
    }
}

/// Validated mapping -> typed args inside a workflow. A mismatch here is a
/// defect in the tool, not bad caller input.
pub fn from_params<T: DeserializeOwned>(params: Params) -> Result<T, ToolError> {
    serde_json::from_value(JsonValue::Object(params))
        .map_err(|e| ToolError::Internal(format!("validated params do not match args: {e}")))
}

fn quoted(choices: &[&str]) -> String {
    choices
        .iter()
        .map(|c| format!("\"{c}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn p(v: JsonValue) -> Params {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn required_string_trims_and_rejects_blank() {
        assert_eq!(required_string(&p(json!({"a": " x "})), "a", "text").unwrap(), "x");
        let e = required_string(&p(json!({"a": "  "})), "a", "text").unwrap_err();
        assert!(e.message().starts_with("Invalid value for \"a\""));
        let e = required_string(&p(json!({})), "a", "text").unwrap_err();
        assert!(e.message().starts_with("Missing required parameter \"a\""));
        assert!(e.message().contains("do not guess"));
    }

    #[test]
    fn required_number_coerces_strings_and_checks_range() {
        assert_eq!(required_number(&p(json!({"n": "12.5"})), "n", 0.0..=20.0, "n").unwrap(), 12.5);
        assert_eq!(required_number(&p(json!({"n": 3})), "n", 0.0..=20.0, "n").unwrap(), 3.0);
        assert!(required_number(&p(json!({"n": 21})), "n", 0.0..=20.0, "n").is_err());
        assert!(required_number(&p(json!({"n": "abc"})), "n", 0.0..=20.0, "n").is_err());
        assert!(required_number(&p(json!({"n": true})), "n", 0.0..=20.0, "n").is_err());
    }

    #[test]
    fn optional_integer_defaults_and_rejects_fractions() {
        assert_eq!(optional_integer(&p(json!({})), "k", 1..=14, 14).unwrap(), 14);
        assert_eq!(optional_integer(&p(json!({"k": 3.0})), "k", 1..=14, 14).unwrap(), 3);
        assert_eq!(optional_integer(&p(json!({"k": "7"})), "k", 1..=14, 14).unwrap(), 7);
        let e = optional_integer(&p(json!({"k": 2.5})), "k", 1..=14, 14).unwrap_err();
        assert!(e.message().contains("from 1 to 14"));
        assert!(optional_integer(&p(json!({"k": 0})), "k", 1..=14, 14).is_err());
    }

    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Args {
        grid_point_url: String,
        max_hours: u64,
    }

    #[test]
    fn typed_args_round_trip_through_params() {
        let args = Args { grid_point_url: "u".into(), max_hours: 3 };
        let params = to_params(&args);
        assert_eq!(params["gridPointUrl"], "u");
        assert_eq!(from_params::<Args>(params).unwrap(), args);
    }

    #[test]
    fn args_mismatch_is_internal_not_validation() {
        let err = from_params::<Args>(Params::new()).unwrap_err();
        assert!(matches!(err, ToolError::Internal(_)));
        assert!(err.as_validation().is_none());
    }

    #[test]
    fn optional_choice_is_case_insensitive() {
        let choices = ["us", "si"];
        assert_eq!(optional_choice(&p(json!({})), "u", &choices, "us").unwrap(), "us");
        assert_eq!(optional_choice(&p(json!({"u": "SI"})), "u", &choices, "us").unwrap(), "si");
        let e = optional_choice(&p(json!({"u": "metric"})), "u", &choices, "us").unwrap_err();
        assert!(e.message().contains("one of \"us\", \"si\""));
    }
}
