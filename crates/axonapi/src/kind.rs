//! Entity kinds managed through the AxonOps API.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A kind of remote entity, each with its own REST collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Notification channel (Slack, email, webhook, ...).
    Endpoint,
    /// Routing of alerts to endpoints.
    Route,
    /// Metric threshold alert.
    AlertRule,
    /// Log pattern alert.
    LogRule,
    /// HTTP/TCP/shell health check.
    ServiceCheck,
    /// Scheduled backup configuration.
    BackupConfig,
}

impl ResourceKind {
    /// Every kind, in converge order.
    ///
    /// Endpoints come before routes because routes reference endpoints by name.
    pub const ALL: [ResourceKind; 6] = [
        Self::Endpoint,
        Self::Route,
        Self::AlertRule,
        Self::LogRule,
        Self::ServiceCheck,
        Self::BackupConfig,
    ];

    /// REST collection path for this kind.
    #[must_use]
    pub fn collection_path(&self) -> &'static str {
        match self {
            Self::Endpoint => "/api/v1/alerts/endpoints",
            Self::Route => "/api/v1/alerts/routes",
            Self::AlertRule => "/api/v1/alerts/rules",
            Self::LogRule => "/api/v1/logs/rules",
            Self::ServiceCheck => "/api/v1/service-checks",
            Self::BackupConfig => "/api/v1/backups/configs",
        }
    }

    /// REST path of a single entity.
    #[must_use]
    pub fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.collection_path(), id)
    }

    /// Configuration table name, also accepted on the command line.
    #[must_use]
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Endpoint => "endpoints",
            Self::Route => "routes",
            Self::AlertRule => "alert_rules",
            Self::LogRule => "log_rules",
            Self::ServiceCheck => "service_checks",
            Self::BackupConfig => "backups",
        }
    }

    /// Singular label used in messages.
    #[must_use]
    pub fn singular(&self) -> &'static str {
        match self {
            Self::Endpoint => "alert endpoint",
            Self::Route => "alert route",
            Self::AlertRule => "alert rule",
            Self::LogRule => "log rule",
            Self::ServiceCheck => "service check",
            Self::BackupConfig => "backup config",
        }
    }

    /// Plural label used in messages.
    #[must_use]
    pub fn plural(&self) -> &'static str {
        match self {
            Self::Endpoint => "alert endpoints",
            Self::Route => "alert routes",
            Self::AlertRule => "alert rules",
            Self::LogRule => "log rules",
            Self::ServiceCheck => "service checks",
            Self::BackupConfig => "backup configs",
        }
    }

    /// Position in the converge order.
    #[must_use]
    pub fn order(&self) -> u8 {
        Self::ALL
            .iter()
            .position(|k| k == self)
            .map_or(u8::MAX, |p| p as u8)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.singular())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "endpoints" | "endpoint" | "integrations" => Ok(Self::Endpoint),
            "routes" | "route" => Ok(Self::Route),
            "alert_rules" | "alert_rule" | "alerts" | "rules" => Ok(Self::AlertRule),
            "log_rules" | "log_rule" | "logs" => Ok(Self::LogRule),
            "service_checks" | "service_check" | "checks" => Ok(Self::ServiceCheck),
            "backups" | "backup" | "backup_configs" => Ok(Self::BackupConfig),
            other => Err(format!(
                "unknown resource kind '{other}' (expected one of: {})",
                Self::ALL.map(|k| k.slug()).join(", ")
            )),
        }
    }
}
