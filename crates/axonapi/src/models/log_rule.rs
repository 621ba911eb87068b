//! Log pattern alerts.

use super::{Severity, default_true};
use crate::error::{Error, Result};
use crate::handler::ApiResource;
use crate::kind::ResourceKind;
use crate::validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Alert when log lines match `pattern`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRule {
    pub name: String,
    /// Regular expression matched against each log line.
    pub pattern: String,
    /// Log levels to consider; empty means all.
    #[serde(default)]
    pub levels: Vec<String>,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl ApiResource for LogRule {
    const KIND: ResourceKind = ResourceKind::LogRule;

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Error::invalid(Self::KIND, &self.name, msg);

        validate::required("name", &self.name).map_err(invalid)?;
        validate::required("pattern", &self.pattern).map_err(invalid)?;
        Regex::new(&self.pattern)
            .map_err(|e| invalid(format!("pattern is not a valid regex: {e}")))?;
        Ok(())
    }

    fn create_body(&self) -> Value {
        let mut body = json!({
            "name": self.name,
            "pattern": self.pattern,
            "levels": self.levels,
            "severity": self.severity,
            "enabled": self.enabled,
        });
        if let Some(description) = &self.description {
            body["description"] = json!(description);
        }
        body
    }

    fn summary(&self) -> String {
        if self.levels.is_empty() {
            format!("/{}/ ({})", self.pattern, self.severity)
        } else {
            format!(
                "/{}/ in {} ({})",
                self.pattern,
                self.levels.join(","),
                self.severity
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oom() -> LogRule {
        LogRule {
            name: "oom".to_string(),
            pattern: "OutOfMemoryError".to_string(),
            levels: vec!["ERROR".to_string()],
            severity: Severity::Critical,
            description: None,
            enabled: true,
        }
    }

    #[test]
    fn test_body_omits_unset_description() {
        let body = oom().create_body();
        assert!(body.get("description").is_none());
        assert_eq!(body["severity"], "critical");

        let described = LogRule {
            description: Some("JVM ran out of heap".to_string()),
            ..oom()
        };
        assert_eq!(described.create_body()["description"], "JVM ran out of heap");
    }

    #[test]
    fn test_invalid_pattern() {
        let bad = LogRule {
            pattern: "([unclosed".to_string(),
            ..oom()
        };
        let err = bad.validate().unwrap_err();
        assert!(err.to_string().contains("not a valid regex"));
        assert!(oom().validate().is_ok());
    }

    #[test]
    fn test_summary() {
        assert_eq!(oom().summary(), "/OutOfMemoryError/ in ERROR (critical)");
    }
}
