//! The AxonOps API client.

use crate::error::{Error, Result};
use crate::response::ApiResponse;
use crate::settings::{ApiSettings, Credentials};
use crate::transport::http::UreqTransport;
use crate::transport::{HttpRequest, Method, Transport};
use serde_json::{Value, json};
use std::sync::Arc;

const USER_AGENT: &str = concat!("axonctl/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq)]
enum Auth {
    None,
    ApiKey(String),
    Bearer(String),
}

/// Client for one AxonOps API base URL.
///
/// Construct one per run and pass it to whatever needs it; the client holds
/// no per-request state and is cheap to clone.
///
/// # Example
///
/// ```no_run
/// use axonapi::{ApiClient, Method};
///
/// let client = ApiClient::new("https://api.axonops.cloud")
///     .with_api_key("my-key")
///     .with_organization("my-org");
///
/// let response = client.request(Method::Get, "/api/v1/alerts/rules", None);
/// if !response.success {
///     eprintln!("{}", response.error_message());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    auth: Auth,
    organization: Option<String>,
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    /// Create an anonymous client using the `ureq` transport.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_transport(base_url, Arc::new(UreqTransport::new()))
    }

    /// Create an anonymous client with a custom transport (for testing).
    #[must_use]
    pub fn with_transport(base_url: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth: Auth::None,
            organization: None,
            transport,
        }
    }

    /// Build a client from configuration, logging in when credentials require it.
    pub fn from_settings(settings: &ApiSettings, transport: Arc<dyn Transport>) -> Result<Self> {
        let credentials = settings.credentials()?;
        let mut client = Self::with_transport(settings.base_url(), transport);
        if let Some(org) = settings.organization() {
            client = client.with_organization(org);
        }

        log::info!("Initializing AxonOps client for {}", client.base_url);

        match credentials {
            Credentials::ApiKey(key) => Ok(client.with_api_key(key)),
            Credentials::Bearer(token) => Ok(client.with_bearer(token)),
            Credentials::Login { username, password } => {
                client.login(&username, &password)?;
                Ok(client)
            }
            Credentials::Anonymous => Ok(client),
        }
    }

    /// Authenticate with an `X-API-Key` header.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.auth = Auth::ApiKey(key.into());
        self
    }

    /// Authenticate with an `Authorization: Bearer` header.
    #[must_use]
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.auth = Auth::Bearer(token.into());
        self
    }

    /// Send `X-Organization` on every request.
    #[must_use]
    pub fn with_organization(mut self, org: impl Into<String>) -> Self {
        self.organization = Some(org.into());
        self
    }

    /// Base URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Exchange username/password for a bearer token.
    pub fn login(&mut self, username: &str, password: &str) -> Result<()> {
        log::debug!("Getting token for {username} on {}/api/login", self.base_url);

        let body = json!({ "username": username, "password": password });
        let response = self.request(Method::Post, "/api/login", Some(&body));
        if !response.success {
            return Err(Error::Login(response.error_message()));
        }

        match response.body.get("token").and_then(Value::as_str) {
            Some(token) if !token.is_empty() => {
                self.auth = Auth::Bearer(token.to_string());
                Ok(())
            }
            _ => Err(Error::Login(format!(
                "{}/api/login returned no token",
                self.base_url
            ))),
        }
    }

    fn build_request(&self, method: Method, path: &str, body: Option<&Value>) -> HttpRequest {
        let mut headers = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Accept".to_string(), "application/json".to_string()),
            ("User-Agent".to_string(), USER_AGENT.to_string()),
        ];

        match &self.auth {
            Auth::None => {}
            Auth::ApiKey(key) => headers.push(("X-API-Key".to_string(), key.clone())),
            Auth::Bearer(token) => {
                headers.push(("Authorization".to_string(), format!("Bearer {token}")));
            }
        }

        if let Some(org) = &self.organization {
            headers.push(("X-Organization".to_string(), org.clone()));
        }

        let path = path.trim_start_matches('/');
        HttpRequest {
            method,
            url: format!("{}/{}", self.base_url, path),
            headers,
            body: body.map(Value::to_string),
        }
    }

    /// Send one request and normalize the outcome.
    ///
    /// Never fails: transport and parse errors come back as a response with
    /// `code = 0` and `body = {"error": ...}`.
    pub fn request(&self, method: Method, path: &str, body: Option<&Value>) -> ApiResponse {
        let request = self.build_request(method, path, body);
        log::debug!("{} {}", request.method, request.url);

        match self.transport.send(&request) {
            Ok(raw) => {
                let response = ApiResponse::from_parts(raw.status, &raw.body);
                if !response.success {
                    log::debug!(
                        "Response from {}: {} {}",
                        request.url,
                        raw.status,
                        raw.body
                    );
                }
                response
            }
            Err(e) => {
                log::error!("AxonOps API request failed: {e}");
                ApiResponse::failure(match e {
                    Error::Transport { message, .. } => message,
                    other => other.to_string(),
                })
            }
        }
    }
}
