//! Connection settings: where the API lives and how to authenticate.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Public AxonOps SaaS API.
pub const SAAS_BASE_URL: &str = "https://api.axonops.cloud";

/// How AxonOps is deployed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeploymentMode {
    #[default]
    #[serde(rename = "saas")]
    Saas,
    #[serde(rename = "self-hosted")]
    SelfHosted,
}

/// Listen address of a self-hosted axon-server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerAddress {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
}

fn default_listen_address() -> String {
    "0.0.0.0".to_string()
}

fn default_listen_port() -> u16 {
    8080
}

impl Default for ServerAddress {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            listen_port: default_listen_port(),
        }
    }
}

/// The `[api]` section of the configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default)]
    pub deployment_mode: DeploymentMode,

    /// Overrides the URL derived from `deployment_mode`.
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub organization: Option<String>,

    /// Pre-issued bearer token.
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default)]
    pub server: ServerAddress,
}

/// Resolved authentication scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// `X-API-Key` header.
    ApiKey(String),
    /// `Authorization: Bearer` header.
    Bearer(String),
    /// Exchange for a bearer token via `/api/login` first.
    Login { username: String, password: String },
    /// No auth header (self-hosted only).
    Anonymous,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl ApiSettings {
    /// Resolve the base URL, without a trailing slash.
    pub fn base_url(&self) -> String {
        let url = match (non_empty(self.base_url.as_ref()), self.deployment_mode) {
            (Some(url), _) => url.to_string(),
            (None, DeploymentMode::SelfHosted) => format!(
                "http://{}:{}",
                self.server.listen_address, self.server.listen_port
            ),
            (None, DeploymentMode::Saas) => SAAS_BASE_URL.to_string(),
        };
        url.trim_end_matches('/').to_string()
    }

    /// Organization sent as `X-Organization`, if any.
    pub fn organization(&self) -> Option<&str> {
        non_empty(self.organization.as_ref())
    }

    /// Pick the authentication scheme.
    ///
    /// Precedence is API key, then bearer token, then username/password.
    /// SaaS requires one of them; self-hosted may be anonymous.
    pub fn credentials(&self) -> Result<Credentials> {
        if let Some(key) = non_empty(self.api_key.as_ref()) {
            return Ok(Credentials::ApiKey(key.to_string()));
        }
        if let Some(token) = non_empty(self.token.as_ref()) {
            return Ok(Credentials::Bearer(token.to_string()));
        }
        match (
            non_empty(self.username.as_ref()),
            non_empty(self.password.as_ref()),
        ) {
            (Some(username), Some(password)) => {
                return Ok(Credentials::Login {
                    username: username.to_string(),
                    password: password.to_string(),
                });
            }
            (Some(_), None) => {
                return Err(Error::MissingConfig(
                    "api.password is required when api.username is set".to_string(),
                ));
            }
            _ => {}
        }

        match self.deployment_mode {
            DeploymentMode::SelfHosted => Ok(Credentials::Anonymous),
            DeploymentMode::Saas => Err(Error::MissingConfig(
                "api.api_key (or api.token, or api.username/api.password) is required in saas mode"
                    .to_string(),
            )),
        }
    }
}
