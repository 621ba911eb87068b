//! Notification endpoints (integrations) that alerts are routed to.

use super::{default_true, split_tagged};
use crate::error::{Error, Result};
use crate::handler::ApiResource;
use crate::kind::ResourceKind;
use crate::validate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;

fn default_smtp_port() -> u16 {
    25
}

fn default_opsgenie_url() -> String {
    "https://api.opsgenie.com".to_string()
}

/// Type-specific endpoint settings, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EndpointConfig {
    Slack {
        webhook_url: String,
        #[serde(default)]
        channel: Option<String>,
        #[serde(default)]
        axondash_url: Option<String>,
    },
    Email {
        receivers: Vec<String>,
        from: String,
        server: String,
        #[serde(default = "default_smtp_port")]
        port: u16,
        #[serde(default)]
        subject: Option<String>,
        #[serde(default)]
        username: Option<String>,
        #[serde(default)]
        password: Option<String>,
        #[serde(default = "default_true")]
        start_tls: bool,
        #[serde(default)]
        skip_certificate_verify: bool,
    },
    Webhook {
        url: String,
        #[serde(default)]
        headers: BTreeMap<String, String>,
    },
    Pagerduty {
        integration_key: String,
    },
    MicrosoftTeams {
        webhook_url: String,
    },
    Opsgenie {
        api_key: String,
        #[serde(default = "default_opsgenie_url")]
        api_url: String,
    },
}

impl EndpointConfig {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Slack { .. } => "slack",
            Self::Email { .. } => "email",
            Self::Webhook { .. } => "webhook",
            Self::Pagerduty { .. } => "pagerduty",
            Self::MicrosoftTeams { .. } => "microsoft_teams",
            Self::Opsgenie { .. } => "opsgenie",
        }
    }

    fn check(&self) -> std::result::Result<(), String> {
        match self {
            Self::Slack { webhook_url, .. } | Self::MicrosoftTeams { webhook_url } => {
                validate::url("webhook_url", webhook_url)
            }
            Self::Email {
                receivers,
                from,
                server,
                port,
                ..
            } => {
                if receivers.is_empty() {
                    return Err("receivers must list at least one address".to_string());
                }
                validate::required("from", from)?;
                validate::required("server", server)?;
                if *port == 0 {
                    return Err("port must be > 0".to_string());
                }
                Ok(())
            }
            Self::Webhook { url, .. } => validate::url("url", url),
            Self::Pagerduty { integration_key } => {
                validate::required("integration_key", integration_key)
            }
            Self::Opsgenie { api_key, api_url } => {
                validate::required("api_key", api_key)?;
                validate::url("api_url", api_url)
            }
        }
    }
}

/// A named notification channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEndpoint {
    pub name: String,
    pub config: EndpointConfig,
}

impl ApiResource for NotificationEndpoint {
    const KIND: ResourceKind = ResourceKind::Endpoint;

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<()> {
        validate::required("name", &self.name)
            .and_then(|()| self.config.check())
            .map_err(|msg| Error::invalid(Self::KIND, &self.name, msg))
    }

    fn create_body(&self) -> Value {
        let (kind, config) = split_tagged(&self.config, "type");
        json!({
            "name": self.name,
            "type": kind,
            "config": config,
        })
    }

    fn summary(&self) -> String {
        match &self.config {
            EndpointConfig::Slack {
                channel: Some(channel),
                ..
            } => format!("slack {channel}"),
            EndpointConfig::Email { receivers, .. } => {
                format!("email to {}", receivers.join(", "))
            }
            EndpointConfig::Webhook { url, .. } => format!("webhook {url}"),
            other => other.type_name().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slack() -> NotificationEndpoint {
        NotificationEndpoint {
            name: "ops-slack".to_string(),
            config: EndpointConfig::Slack {
                webhook_url: "https://hooks.slack.com/services/T0/B0/x".to_string(),
                channel: Some("#ops".to_string()),
                axondash_url: None,
            },
        }
    }

    #[test]
    fn test_body_shape() {
        let body = slack().create_body();
        assert_eq!(
            body,
            json!({
                "name": "ops-slack",
                "type": "slack",
                "config": {
                    "webhook_url": "https://hooks.slack.com/services/T0/B0/x",
                    "channel": "#ops",
                },
            })
        );
    }

    #[test]
    fn test_from_toml() {
        let endpoint: NotificationEndpoint = toml::from_str(
            r#"
            name = "mail"
            [config]
            type = "email"
            receivers = ["oncall@example.com"]
            from = "axonops@example.com"
            server = "smtp.example.com"
            "#,
        )
        .unwrap();

        match &endpoint.config {
            EndpointConfig::Email {
                port, start_tls, ..
            } => {
                assert_eq!(*port, 25);
                assert!(*start_tls);
            }
            other => panic!("unexpected config {other:?}"),
        }
        assert!(endpoint.validate().is_ok());
        assert_eq!(endpoint.summary(), "email to oncall@example.com");
    }

    #[test]
    fn test_teams_and_opsgenie() {
        let teams: NotificationEndpoint = toml::from_str(
            r#"
            name = "teams"
            config = { type = "microsoft_teams", webhook_url = "https://outlook.office.com/webhook/x" }
            "#,
        )
        .unwrap();
        assert_eq!(teams.create_body()["type"], "microsoft_teams");

        let genie: NotificationEndpoint = toml::from_str(
            r#"
            name = "genie"
            config = { type = "opsgenie", api_key = "k" }
            "#,
        )
        .unwrap();
        assert_eq!(
            genie.create_body()["config"]["api_url"],
            "https://api.opsgenie.com"
        );
    }

    #[test]
    fn test_validate() {
        assert!(slack().validate().is_ok());

        let bad = NotificationEndpoint {
            name: "hook".to_string(),
            config: EndpointConfig::Webhook {
                url: "not-a-url".to_string(),
                headers: BTreeMap::new(),
            },
        };
        let err = bad.validate().unwrap_err();
        assert!(err.to_string().contains("invalid alert endpoint 'hook'"));

        let bad = NotificationEndpoint {
            name: "pd".to_string(),
            config: EndpointConfig::Pagerduty {
                integration_key: " ".to_string(),
            },
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_unknown_type_rejected() {
        let result: std::result::Result<NotificationEndpoint, _> = toml::from_str(
            r#"
            name = "x"
            config = { type = "carrier_pigeon" }
            "#,
        );
        assert!(result.is_err());
    }
}
