//! Metric threshold alert rules.

use super::{Severity, default_true};
use crate::error::{Error, Result};
use crate::handler::ApiResource;
use crate::kind::ResourceKind;
use crate::validate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

/// Comparison applied between a metric and its threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    #[default]
    Above,
    Below,
    Equal,
    NotEqual,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Above => "above",
            Self::Below => "below",
            Self::Equal => "equal",
            Self::NotEqual => "not_equal",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_duration() -> String {
    "5m".to_string()
}

/// Alert raised when `metric` crosses `threshold` for `duration`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRule {
    pub name: String,
    pub metric: String,
    #[serde(default)]
    pub condition: Condition,
    pub threshold: f64,
    #[serde(default = "default_duration")]
    pub duration: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub clusters: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl AlertRule {
    /// A rule with default duration, severity and no cluster filter.
    pub fn new(
        name: impl Into<String>,
        metric: impl Into<String>,
        condition: Condition,
        threshold: f64,
    ) -> Self {
        Self {
            name: name.into(),
            metric: metric.into(),
            condition,
            threshold,
            duration: default_duration(),
            severity: Severity::default(),
            clusters: Vec::new(),
            description: None,
            enabled: true,
        }
    }

    /// Description used when none is declared.
    pub fn default_description(&self) -> String {
        format!(
            "Alert when {} is {} {}",
            self.metric, self.condition, self.threshold
        )
    }

    fn body(&self, description: String) -> Value {
        json!({
            "name": self.name,
            "metric": self.metric,
            "condition": self.condition,
            "threshold": self.threshold,
            "duration": self.duration,
            "severity": self.severity,
            "clusters": self.clusters,
            "description": description,
            "enabled": self.enabled,
        })
    }
}

impl ApiResource for AlertRule {
    const KIND: ResourceKind = ResourceKind::AlertRule;

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Error::invalid(Self::KIND, &self.name, msg);

        validate::required("name", &self.name).map_err(invalid)?;
        validate::required("metric", &self.metric).map_err(invalid)?;
        validate::duration("duration", &self.duration).map_err(invalid)?;
        if !self.threshold.is_finite() {
            return Err(invalid("threshold must be a finite number".to_string()));
        }
        Ok(())
    }

    fn create_body(&self) -> Value {
        let description = self
            .description
            .clone()
            .unwrap_or_else(|| self.default_description());
        self.body(description)
    }

    /// An undeclared description keeps whatever the server has.
    fn update_body(&self, existing: &Value) -> Value {
        let description = self
            .description
            .clone()
            .or_else(|| {
                existing
                    .get("description")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| self.default_description());
        self.body(description)
    }

    fn summary(&self) -> String {
        format!(
            "{} {} {} for {} ({})",
            self.metric, self.condition, self.threshold, self.duration, self.severity
        )
    }
}
