//! Service checks run by the AxonOps agents.

use super::{default_true, split_tagged};
use crate::error::{Error, Result};
use crate::handler::ApiResource;
use crate::kind::ResourceKind;
use crate::validate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;

fn default_interval() -> String {
    "1m".to_string()
}

fn default_timeout() -> String {
    "30s".to_string()
}

fn default_expected_status() -> u16 {
    200
}

fn default_shell() -> String {
    "/bin/bash".to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Head,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Head => "HEAD",
        }
    }
}

/// Check-specific settings, tagged by `check_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "check_type", rename_all = "snake_case")]
pub enum CheckConfig {
    Http {
        url: String,
        #[serde(default)]
        method: HttpMethod,
        #[serde(default)]
        headers: BTreeMap<String, String>,
        #[serde(default)]
        body: Option<String>,
        #[serde(default = "default_expected_status")]
        expected_status: u16,
    },
    Tcp {
        /// `host:port`
        address: String,
    },
    Shell {
        #[serde(default = "default_shell")]
        shell: String,
        script: String,
    },
}

impl CheckConfig {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Http { .. } => "http",
            Self::Tcp { .. } => "tcp",
            Self::Shell { .. } => "shell",
        }
    }

    fn check(&self) -> std::result::Result<(), String> {
        match self {
            Self::Http {
                url,
                expected_status,
                ..
            } => {
                validate::url("url", url)?;
                if !(100..600).contains(expected_status) {
                    return Err(format!(
                        "expected_status {expected_status} is not an HTTP status"
                    ));
                }
                Ok(())
            }
            Self::Tcp { address } => match address.rsplit_once(':') {
                Some((host, port))
                    if !host.is_empty() && port.parse::<u16>().is_ok_and(|p| p > 0) =>
                {
                    Ok(())
                }
                _ => Err(format!("address '{address}' must be host:port")),
            },
            Self::Shell { shell, script } => {
                validate::required("shell", shell)?;
                validate::required("script", script)
            }
        }
    }
}

/// A periodic health check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCheck {
    pub name: String,
    #[serde(default = "default_interval")]
    pub interval: String,
    #[serde(default = "default_timeout")]
    pub timeout: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub config: CheckConfig,
}

impl ApiResource for ServiceCheck {
    const KIND: ResourceKind = ResourceKind::ServiceCheck;

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<()> {
        validate::required("name", &self.name)
            .and_then(|()| validate::duration("interval", &self.interval))
            .and_then(|()| validate::duration("timeout", &self.timeout))
            .and_then(|()| self.config.check())
            .map_err(|msg| Error::invalid(Self::KIND, &self.name, msg))
    }

    fn create_body(&self) -> Value {
        let (check_type, config) = split_tagged(&self.config, "check_type");
        json!({
            "name": self.name,
            "check_type": check_type,
            "interval": self.interval,
            "timeout": self.timeout,
            "enabled": self.enabled,
            "config": config,
        })
    }

    fn summary(&self) -> String {
        let target = match &self.config {
            CheckConfig::Http { method, url, .. } => format!("{} {url}", method.as_str()),
            CheckConfig::Tcp { address } => address.clone(),
            CheckConfig::Shell { shell, .. } => format!("{shell} script"),
        };
        format!(
            "{} {target} every {}",
            self.config.type_name(),
            self.interval
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_src: &str) -> ServiceCheck {
        toml::from_str(toml_src).unwrap()
    }

    #[test]
    fn test_http_check() {
        let check = parse(
            r#"
            name = "api-health"
            interval = "30s"
            timeout = "5s"
            [config]
            check_type = "http"
            url = "https://cassandra-api.internal/health"
            headers = { Accept = "application/json" }
            "#,
        );
        assert!(check.validate().is_ok());

        let body = check.create_body();
        assert_eq!(body["check_type"], "http");
        assert_eq!(body["config"]["method"], "GET");
        assert_eq!(body["config"]["expected_status"], 200);
        assert_eq!(body["config"]["headers"]["Accept"], "application/json");
        assert!(body["config"].get("body").is_none());
        assert_eq!(
            check.summary(),
            "http GET https://cassandra-api.internal/health every 30s"
        );
    }

    #[test]
    fn test_tcp_check() {
        let check = parse(
            r#"
            name = "cql"
            config = { check_type = "tcp", address = "10.0.0.1:9042" }
            "#,
        );
        assert_eq!(check.interval, "1m");
        assert_eq!(check.timeout, "30s");
        assert!(check.validate().is_ok());

        let bad = ServiceCheck {
            config: CheckConfig::Tcp {
                address: "10.0.0.1".to_string(),
            },
            ..check
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_shell_check_defaults() {
        let check = parse(
            r#"
            name = "disk"
            config = { check_type = "shell", script = "df -h / | tail -1" }
            "#,
        );
        match &check.config {
            CheckConfig::Shell { shell, .. } => assert_eq!(shell, "/bin/bash"),
            other => panic!("unexpected config {other:?}"),
        }
        assert!(check.validate().is_ok());
    }

    #[test]
    fn test_invalid_interval() {
        let check = parse(
            r#"
            name = "cql"
            interval = "often"
            config = { check_type = "tcp", address = "db:9042" }
            "#,
        );
        let err = check.validate().unwrap_err();
        assert!(err.to_string().contains("interval 'often'"));
    }
}
