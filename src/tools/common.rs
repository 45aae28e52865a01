//! Helpers shared by the weather tools: grid point URL validation, units,
//! and measurement formatting.

use chrono::DateTime;

use crate::clients::nws::Measurement;
use crate::core::error::ToolValidationError;
use crate::core::params;
use crate::core::tool::Params;

pub const GRID_POINT_URL: &str = "gridPointUrl";
pub const UNITS: &str = "units";
pub const UNIT_CHOICES: [&str; 2] = ["us", "si"];

/// Accepts `{base}/gridpoints/{OFFICE}/{x},{y}` (trailing slash tolerated,
/// office upper-cased) and returns it normalized.
pub fn grid_point_url(params: &Params, nws_base: &str) -> Result<String, ToolValidationError> {
    let example = format!("{nws_base}/gridpoints/TOP/32,81");
    let raw = match params.get(GRID_POINT_URL) {
        None | Some(serde_json::Value::Null) => {
            return Err(ToolValidationError::new(format!(
                "Missing grid point URL (\"{GRID_POINT_URL}\"). Call get_grid_point with the \
                 user's latitude and longitude first and pass its gridPointUrl, e.g. {example}. \
                 If the location is unknown, ask the user for it."
            )))
        }
        Some(serde_json::Value::String(s)) => s.trim().trim_end_matches('/'),
        Some(_) => return Err(invalid_grid_point_url(&example)),
    };
    let prefix = format!("{nws_base}/gridpoints/");
    let rest = raw.strip_prefix(&prefix).ok_or_else(|| invalid_grid_point_url(&example))?;
    let (office, coords) = rest.split_once('/').ok_or_else(|| invalid_grid_point_url(&example))?;
    let (x, y) = coords.split_once(',').ok_or_else(|| invalid_grid_point_url(&example))?;
    let office_ok = office.len() == 3 && office.chars().all(|c| c.is_ascii_alphabetic());
    let (Ok(x), Ok(y)) = (x.parse::<u32>(), y.parse::<u32>()) else {
        return Err(invalid_grid_point_url(&example));
    };
    if !office_ok {
        return Err(invalid_grid_point_url(&example));
    }
    Ok(format!("{prefix}{}/{x},{y}", office.to_ascii_uppercase()))
}

fn invalid_grid_point_url(example: &str) -> ToolValidationError {
    ToolValidationError::new(format!(
        "Invalid grid point URL. Expected a URL like {example}, exactly as returned by \
         get_grid_point. Do not construct one by hand; ask the user for their location \
         and call get_grid_point instead."
    ))
}

pub fn units(params: &Params) -> Result<&'static str, ToolValidationError> {
    params::optional_choice(params, UNITS, &UNIT_CHOICES, "us")
}

pub fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

/// `2026-10-14T15:00:00-05:00` -> `Wed Oct 14 3:00 PM`; unparseable input is returned as-is.
pub fn format_time(rfc3339: &str) -> String {
    DateTime::parse_from_rfc3339(rfc3339)
        .map(|t| t.format("%a %b %-d %-I:%M %p").to_string())
        .unwrap_or_else(|_| rfc3339.to_string())
}

const NOT_REPORTED: &str = "not reported";

fn unit(m: &Measurement) -> &str {
    m.unit_code.as_deref().unwrap_or("")
}

pub fn temperature(m: &Measurement, units: &str) -> String {
    let Some(v) = m.value else { return NOT_REPORTED.into() };
    let celsius = if unit(m).ends_with("degF") { (v - 32.0) * 5.0 / 9.0 } else { v };
    if units == "si" {
        format!("{celsius:.1}°C")
    } else {
        format!("{:.1}°F", celsius * 9.0 / 5.0 + 32.0)
    }
}

pub fn wind_speed(m: &Measurement, units: &str) -> String {
    let Some(v) = m.value else { return NOT_REPORTED.into() };
    let kmh = if unit(m).ends_with("m_s-1") { v * 3.6 } else { v };
    if units == "si" {
        format!("{kmh:.0} km/h")
    } else {
        format!("{:.0} mph", kmh * 0.621_371)
    }
}

pub fn pressure(m: &Measurement, units: &str) -> String {
    let Some(pa) = m.value else { return NOT_REPORTED.into() };
    if units == "si" {
        format!("{:.1} hPa", pa / 100.0)
    } else {
        format!("{:.2} inHg", pa / 3_386.389)
    }
}

pub fn percent(m: &Measurement) -> String {
    m.value
        .map(|v| format!("{v:.0}%"))
        .unwrap_or_else(|| NOT_REPORTED.into())
}

pub fn degrees(m: &Measurement) -> String {
    m.value
        .map(|v| format!("{v:.0}°"))
        .unwrap_or_else(|| NOT_REPORTED.into())
}
