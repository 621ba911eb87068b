use anyhow::{Context, Result, bail};
use axonapi::models::{
    AlertRoute, AlertRule, BackupConfig, LogRule, NotificationEndpoint, ServiceCheck,
    duplicate_names,
};
use axonapi::{ApiResource, ApiSettings};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// Main Config Schema
// ============================================================================

/// The axonctl configuration file
#[derive(Debug, Default, Deserialize)]
pub struct AxonConfig {
    /// Where the API lives and how to authenticate
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub endpoints: Vec<Declared<NotificationEndpoint>>,

    #[serde(default)]
    pub routes: Vec<Declared<AlertRoute>>,

    #[serde(default)]
    pub alert_rules: Vec<Declared<AlertRule>>,

    #[serde(default)]
    pub log_rules: Vec<Declared<LogRule>>,

    #[serde(default)]
    pub service_checks: Vec<Declared<ServiceCheck>>,

    #[serde(default)]
    pub backups: Vec<Declared<BackupConfig>>,
}

impl AxonConfig {
    /// Parse a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse config from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid TOML format in axonctl config")
    }

    /// Validate every declared entity and check that names are unique per kind
    pub fn validate(&self) -> Result<()> {
        validate_all(&self.endpoints)?;
        validate_all(&self.routes)?;
        validate_all(&self.alert_rules)?;
        validate_all(&self.log_rules)?;
        validate_all(&self.service_checks)?;
        validate_all(&self.backups)?;
        Ok(())
    }

    /// Number of declared entities across all kinds
    pub fn total_declared(&self) -> usize {
        self.endpoints.len()
            + self.routes.len()
            + self.alert_rules.len()
            + self.log_rules.len()
            + self.service_checks.len()
            + self.backups.len()
    }
}

fn validate_all<R: ApiResource>(items: &[Declared<R>]) -> Result<()> {
    for item in items {
        match item.resource() {
            Some(resource) => resource.validate()?,
            None if item.name().trim().is_empty() => {
                bail!("{} to delete has an empty name", R::KIND)
            }
            None => {}
        }
    }

    let duplicates = duplicate_names(items.iter().map(Declared::name));
    if !duplicates.is_empty() {
        bail!(
            "Duplicate {} names: {}",
            R::KIND.singular(),
            duplicates.join(", ")
        );
    }

    Ok(())
}

// ============================================================================
// Declared entities
// ============================================================================

/// What to do with a declared entity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Create when absent, leave alone when present
    #[default]
    Create,
    /// Create or overwrite
    Update,
    /// Remove when present
    Delete,
}

/// One `[[kind]]` entry of the config file.
///
/// Entries marked `action = "delete"` only need a `name`; every other entry
/// must carry the full typed definition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "toml::Table")]
#[serde(bound(deserialize = "R: DeserializeOwned"))]
pub enum Declared<R> {
    Create(R),
    Update(R),
    Delete(String),
}

impl<R: ApiResource> Declared<R> {
    pub fn name(&self) -> &str {
        match self {
            Self::Create(resource) | Self::Update(resource) => resource.name(),
            Self::Delete(name) => name,
        }
    }

    /// The typed definition, absent for deletions
    pub fn resource(&self) -> Option<&R> {
        match self {
            Self::Create(resource) | Self::Update(resource) => Some(resource),
            Self::Delete(_) => None,
        }
    }
}

impl<R: DeserializeOwned> TryFrom<toml::Table> for Declared<R> {
    type Error = String;

    fn try_from(mut table: toml::Table) -> Result<Self, Self::Error> {
        let action = match table.remove("action") {
            Some(value) => value.try_into::<Action>().map_err(|e| e.to_string())?,
            None => Action::default(),
        };

        if action == Action::Delete {
            let name = table
                .get("name")
                .and_then(toml::Value::as_str)
                .ok_or_else(|| "missing field `name`".to_string())?;
            return Ok(Self::Delete(name.to_string()));
        }

        let resource = toml::Value::Table(table)
            .try_into::<R>()
            .map_err(|e| e.to_string())?;
        Ok(match action {
            Action::Update => Self::Update(resource),
            _ => Self::Create(resource),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axonapi::models::{Condition, EndpointConfig, Severity};
    use axonapi::DeploymentMode;

    const SAMPLE: &str = r##"
[api]
deployment_mode = "self-hosted"
organization = "acme"

[api.server]
listen_address = "axon.internal"
listen_port = 9090

[[endpoints]]
name = "ops-slack"
[endpoints.config]
type = "slack"
webhook_url = "https://hooks.slack.com/services/T000/B000/XXXX"
channel = "#ops"

[[routes]]
name = "critical"
endpoints = ["ops-slack"]
severities = ["critical"]

[[alert_rules]]
name = "high_cpu"
metric = "cpu_usage"
condition = "above"
threshold = 90
severity = "critical"
action = "update"

[[alert_rules]]
name = "old_rule"
action = "delete"
"##;

    #[test]
    fn test_parse_sample() {
        let config = AxonConfig::parse(SAMPLE).unwrap();

        assert_eq!(config.api.deployment_mode, DeploymentMode::SelfHosted);
        assert_eq!(config.api.base_url(), "http://axon.internal:9090");
        assert_eq!(config.api.organization(), Some("acme"));
        assert_eq!(config.total_declared(), 4);

        match &config.endpoints[0] {
            Declared::Create(endpoint) => match &endpoint.config {
                EndpointConfig::Slack { channel, .. } => {
                    assert_eq!(channel.as_deref(), Some("#ops"));
                }
                other => panic!("unexpected {other:?}"),
            },
            other => panic!("unexpected {other:?}"),
        }

        match &config.alert_rules[0] {
            Declared::Update(rule) => {
                assert_eq!(rule.condition, Condition::Above);
                assert!((rule.threshold - 90.0).abs() < f64::EPSILON);
                assert_eq!(rule.severity, Severity::Critical);
                assert_eq!(rule.duration, "5m");
            }
            other => panic!("unexpected {other:?}"),
        }

        assert_eq!(config.alert_rules[1], Declared::Delete("old_rule".to_string()));
        config.validate().unwrap();
    }

    #[test]
    fn test_empty_config_is_valid() {
        let config = AxonConfig::parse("").unwrap();
        assert_eq!(config.total_declared(), 0);
        assert_eq!(config.api, ApiSettings::default());
        config.validate().unwrap();
    }

    #[test]
    fn test_delete_needs_only_name() {
        let config = AxonConfig::parse(
            r#"
[[backups]]
name = "nightly"
action = "delete"
"#,
        )
        .unwrap();
        assert_eq!(config.backups[0].name(), "nightly");
        assert!(config.backups[0].resource().is_none());
    }

    #[test]
    fn test_missing_required_field_fails_parse() {
        let err = AxonConfig::parse(
            r#"
[[alert_rules]]
name = "high_cpu"
condition = "above"
threshold = 90
"#,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("metric"));
    }

    #[test]
    fn test_unknown_action_fails_parse() {
        let err = AxonConfig::parse(
            r#"
[[log_rules]]
name = "oom"
pattern = "OutOfMemory"
action = "upsert"
"#,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("upsert"));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let config = AxonConfig::parse(
            r#"
[[alert_rules]]
name = "high_cpu"
metric = "cpu_usage"
condition = "above"
threshold = 90

[[alert_rules]]
name = "high_cpu"
action = "delete"
"#,
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Duplicate alert rule names: high_cpu"));
    }

    #[test]
    fn test_invalid_entity_rejected() {
        let config = AxonConfig::parse(
            r#"
[[alert_rules]]
name = "high_cpu"
metric = "cpu_usage"
condition = "above"
threshold = 90
duration = "five minutes"
"#,
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("high_cpu"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = AxonConfig::from_file(&path).unwrap();
        assert_eq!(config.routes[0].name(), "critical");

        let missing = dir.path().join("nope.toml");
        let err = AxonConfig::from_file(&missing).unwrap_err();
        assert!(err.to_string().contains("Could not read config file"));
    }
}
