//! Typed entity models, one per REST collection.
//!
//! Each model deserializes from the configuration file, validates itself and
//! renders the JSON body the API expects. Models whose settings depend on a
//! type (endpoints, checks, backups) keep those settings in a nested
//! `config` table tagged by type, sent to the API as
//! `{"name": ..., "<tag>": ..., "config": {...}}`.

mod alert_rule;
mod backup;
mod endpoint;
mod log_rule;
mod route;
mod service_check;

pub use alert_rule::{AlertRule, Condition};
pub use backup::{BackupConfig, BackupTarget};
pub use endpoint::{EndpointConfig, NotificationEndpoint};
pub use log_rule::LogRule;
pub use route::AlertRoute;
pub use service_check::{CheckConfig, HttpMethod, ServiceCheck};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Alert severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    #[default]
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) fn default_true() -> bool {
    true
}

/// Serialize an internally tagged enum and split the tag off.
///
/// Returns `(tag_value, remaining_fields)`. `None` fields are dropped from
/// the remainder so that unset optional settings are never sent.
pub(crate) fn split_tagged<T: Serialize>(value: &T, tag: &str) -> (Value, Value) {
    let mut map = match serde_json::to_value(value) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    let tag_value = map.remove(tag).unwrap_or(Value::Null);
    map.retain(|_, v| !v.is_null());
    (tag_value, Value::Object(map))
}

/// Reject duplicate names within one list of declarations.
pub fn duplicate_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = std::collections::BTreeSet::new();
    let mut dups = std::collections::BTreeSet::new();
    for name in names {
        if !seen.insert(name) {
            dups.insert(name.to_string());
        }
    }
    dups.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    #[serde(tag = "kind", rename_all = "snake_case")]
    enum Sample {
        Pipe { width: u32, label: Option<String> },
    }

    #[test]
    fn test_split_tagged() {
        let (tag, rest) = split_tagged(
            &Sample::Pipe {
                width: 3,
                label: None,
            },
            "kind",
        );
        assert_eq!(tag, json!("pipe"));
        assert_eq!(rest, json!({ "width": 3 }));
    }

    #[test]
    fn test_severity_default() {
        assert_eq!(Severity::default(), Severity::Warning);
        assert_eq!(Severity::Critical.to_string(), "critical");
    }

    #[test]
    fn test_duplicate_names() {
        assert!(duplicate_names(["a", "b"]).is_empty());
        assert_eq!(duplicate_names(["a", "b", "a", "a"]), vec!["a".to_string()]);
    }
}
