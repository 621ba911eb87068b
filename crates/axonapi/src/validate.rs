//! Field validators shared by the entity models.

use regex::Regex;
use std::sync::LazyLock;

static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[smhdw]$").expect("duration pattern is valid"));

/// `5m`, `30s`, `1h`, `2d`, `1w`.
pub fn is_duration(value: &str) -> bool {
    DURATION_RE.is_match(value)
}

/// Check a duration field, returning a message suitable for [`crate::Error::Invalid`].
pub fn duration(field: &str, value: &str) -> Result<(), String> {
    if is_duration(value) {
        Ok(())
    } else {
        Err(format!(
            "{field} '{value}' is not a duration (expected e.g. 30s, 5m, 1h)"
        ))
    }
}

/// Cron expressions must have exactly five whitespace-separated fields.
pub fn cron(field: &str, value: &str) -> Result<(), String> {
    let fields = value.split_whitespace().count();
    if fields == 5 {
        Ok(())
    } else {
        Err(format!(
            "{field} '{value}' must have 5 cron fields, found {fields}"
        ))
    }
}

/// `http://` or `https://` with something after the scheme.
pub fn url(field: &str, value: &str) -> Result<(), String> {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    match rest {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(format!("{field} '{value}' must be an http(s) URL")),
    }
}

pub fn required(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{field} is required"))
    } else {
        Ok(())
    }
}
