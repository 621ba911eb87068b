//! Alert routes: which endpoints receive which alerts.

use super::{Severity, default_true};
use crate::error::{Error, Result};
use crate::handler::ApiResource;
use crate::kind::ResourceKind;
use crate::validate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Sends alerts matching `severities` and `clusters` to named endpoints.
///
/// Empty `severities` or `clusters` match everything. Endpoints are referenced
/// by name and are not checked for existence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRoute {
    pub name: String,
    pub endpoints: Vec<String>,
    #[serde(default)]
    pub severities: Vec<Severity>,
    #[serde(default)]
    pub clusters: Vec<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl ApiResource for AlertRoute {
    const KIND: ResourceKind = ResourceKind::Route;

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Error::invalid(Self::KIND, &self.name, msg);

        validate::required("name", &self.name).map_err(invalid)?;
        if self.endpoints.is_empty() {
            return Err(invalid("endpoints must name at least one endpoint".to_string()));
        }
        if let Some(blank) = self.endpoints.iter().find(|e| e.trim().is_empty()) {
            return Err(invalid(format!("endpoint name '{blank}' is blank")));
        }
        Ok(())
    }

    fn create_body(&self) -> Value {
        json!({
            "name": self.name,
            "endpoints": self.endpoints,
            "severities": self.severities,
            "clusters": self.clusters,
            "enabled": self.enabled,
        })
    }

    fn summary(&self) -> String {
        let severities = if self.severities.is_empty() {
            "all severities".to_string()
        } else {
            self.severities
                .iter()
                .map(Severity::as_str)
                .collect::<Vec<_>>()
                .join("/")
        };
        format!("{severities} -> {}", self.endpoints.join(", "))
    }
}
