//! HTTP transport abstraction.
//!
//! [`ApiClient`](crate::ApiClient) builds an [`HttpRequest`] and hands it to a
//! [`Transport`]. The production implementation is [`http::UreqTransport`].
//!
//! # Testing
//!
//! Use [`MockTransport`] for testing without network access. It behaves like
//! a tiny AxonOps server: collections live in memory, POST assigns ids, PUT
//! replaces, DELETE removes, and every request is recorded.
//!
//! ```
//! use std::sync::Arc;
//! use axonapi::{ApiClient, Method, MockTransport};
//!
//! let mock = MockTransport::new();
//! let client = ApiClient::with_transport("http://axon.test", Arc::new(mock.clone()));
//!
//! let response = client.request(Method::Get, "/api/v1/alerts/rules", None);
//! assert!(response.success);
//! assert_eq!(mock.requests().len(), 1);
//! ```

pub mod http;

use crate::error::Result;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// HTTP methods used by the AxonOps API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Upper-case method name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully built request, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Look up a header value (case-insensitive name).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Parse the body as JSON, if present and valid.
    pub fn json(&self) -> Option<Value> {
        self.body
            .as_deref()
            .and_then(|b| serde_json::from_str(b).ok())
    }
}

/// Status and raw body of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }

    fn empty(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
        }
    }
}

/// Sends requests over the wire.
///
/// Non-2xx statuses are not errors at this layer; only a failed exchange is.
pub trait Transport: Send + Sync + fmt::Debug {
    fn send(&self, request: &HttpRequest) -> Result<RawResponse>;
}

#[derive(Debug, Default)]
struct MockState {
    collections: HashMap<String, Vec<Value>>,
    requests: Vec<HttpRequest>,
    failures: Vec<(Method, String, RawResponse)>,
    unreachable: bool,
    next_id: u64,
    login: Option<(String, String, String)>,
}

/// In-memory AxonOps API for tests.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Create an empty mock server.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// State guard, recovered if a panicking test poisoned it.
    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed an entity into a collection, as if created earlier.
    pub fn seed(&self, collection_path: &str, entity: Value) {
        let mut state = self.lock();
        state
            .collections
            .entry(collection_path.to_string())
            .or_default()
            .push(entity);
    }

    /// Current contents of a collection.
    pub fn entities(&self, collection_path: &str) -> Vec<Value> {
        let state = self.lock();
        state
            .collections
            .get(collection_path)
            .cloned()
            .unwrap_or_default()
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.lock().requests.clone()
    }

    /// Requests with the given method.
    pub fn requests_with(&self, method: Method) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method)
            .collect()
    }

    /// Answer requests matching `method` whose path starts with `path_prefix`
    /// with a fixed status and JSON body.
    pub fn fail(&self, method: Method, path_prefix: &str, status: u16, body: Value) {
        let mut state = self.lock();
        state.failures.push((
            method,
            path_prefix.to_string(),
            RawResponse::json(status, &body),
        ));
    }

    /// Make every request fail at the transport level.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.lock().unreachable = unreachable;
    }

    /// Accept `/api/login` for these credentials, issuing `token`.
    pub fn allow_login(&self, username: &str, password: &str, token: &str) {
        self.lock().login = Some((
            username.to_string(),
            password.to_string(),
            token.to_string(),
        ));
    }

    fn route(state: &mut MockState, request: &HttpRequest, path: &str) -> RawResponse {
        if path == "/api/login" && request.method == Method::Post {
            return Self::login(state, request);
        }

        let (collection, id) = split_item_path(path);
        if !collection.starts_with("/api/v1/") {
            return RawResponse::json(404, &json!({ "error": "no such route" }));
        }

        match (request.method, id) {
            (Method::Get, None) => {
                let items = state.collections.get(collection).cloned().unwrap_or_default();
                RawResponse::json(200, &json!({ "data": items }))
            }
            (Method::Post, None) => {
                let Some(Value::Object(mut body)) = request.json() else {
                    return RawResponse::json(400, &json!({ "error": "invalid JSON body" }));
                };
                state.next_id += 1;
                let id = state.next_id.to_string();
                body.insert("id".to_string(), Value::String(id));
                let entity = Value::Object(body);
                state
                    .collections
                    .entry(collection.to_string())
                    .or_default()
                    .push(entity.clone());
                RawResponse::json(201, &entity)
            }
            (Method::Put, Some(id)) => {
                let Some(Value::Object(mut body)) = request.json() else {
                    return RawResponse::json(400, &json!({ "error": "invalid JSON body" }));
                };
                let items = state.collections.entry(collection.to_string()).or_default();
                match items.iter_mut().find(|e| entity_id(e).as_deref() == Some(id)) {
                    Some(existing) => {
                        body.insert("id".to_string(), Value::String(id.to_string()));
                        *existing = Value::Object(body);
                        RawResponse::json(200, existing)
                    }
                    None => RawResponse::json(404, &json!({ "error": "not found" })),
                }
            }
            (Method::Delete, Some(id)) => {
                let items = state.collections.entry(collection.to_string()).or_default();
                let before = items.len();
                items.retain(|e| entity_id(e).as_deref() != Some(id));
                if items.len() < before {
                    RawResponse::empty(204)
                } else {
                    RawResponse::json(404, &json!({ "error": "not found" }))
                }
            }
            _ => RawResponse::json(405, &json!({ "error": "method not allowed" })),
        }
    }

    fn login(state: &MockState, request: &HttpRequest) -> RawResponse {
        let body = request.json().unwrap_or(Value::Null);
        match &state.login {
            Some((user, pass, token))
                if body["username"] == user.as_str() && body["password"] == pass.as_str() =>
            {
                RawResponse::json(200, &json!({ "token": token }))
            }
            _ => RawResponse::json(401, &json!({ "error": "invalid credentials" })),
        }
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &HttpRequest) -> Result<RawResponse> {
        let mut state = self.lock();
        state.requests.push(request.clone());

        if state.unreachable {
            return Err(crate::Error::Transport {
                url: request.url.clone(),
                message: "Connection refused".to_string(),
            });
        }

        let path = url_path(&request.url).to_string();
        if let Some((_, _, response)) = state
            .failures
            .iter()
            .find(|(m, prefix, _)| *m == request.method && path.starts_with(prefix.as_str()))
        {
            return Ok(response.clone());
        }

        Ok(Self::route(&mut state, request, &path))
    }
}

/// Path component of a URL (everything from the first `/` after the host).
fn url_path(url: &str) -> &str {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    without_scheme
        .find('/')
        .map_or("/", |idx| &without_scheme[idx..])
}

/// Split `/api/v1/alerts/rules/42` into the collection and the id.
///
/// A path is treated as an item path when its last segment is not one of
/// the known collection names.
fn split_item_path(path: &str) -> (&str, Option<&str>) {
    let is_collection = |p: &str| {
        crate::ResourceKind::ALL
            .iter()
            .any(|k| k.collection_path() == p)
    };
    if is_collection(path) {
        return (path, None);
    }
    match path.rsplit_once('/') {
        Some((collection, id)) if is_collection(collection) => (collection, Some(id)),
        _ => (path, None),
    }
}

fn entity_id(entity: &Value) -> Option<String> {
    match entity.get("id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: Method, path: &str, body: Option<Value>) -> HttpRequest {
        HttpRequest {
            method,
            url: format!("http://axon.test{path}"),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: body.map(|b| b.to_string()),
        }
    }

    #[test]
    fn test_url_path() {
        assert_eq!(url_path("http://host:8080/api/v1/x"), "/api/v1/x");
        assert_eq!(url_path("https://host"), "/");
        assert_eq!(url_path("/relative/path"), "/relative/path");
    }

    #[test]
    fn test_split_item_path() {
        assert_eq!(
            split_item_path("/api/v1/alerts/rules"),
            ("/api/v1/alerts/rules", None)
        );
        assert_eq!(
            split_item_path("/api/v1/alerts/rules/7"),
            ("/api/v1/alerts/rules", Some("7"))
        );
        assert_eq!(
            split_item_path("/api/v1/backups/configs/abc"),
            ("/api/v1/backups/configs", Some("abc"))
        );
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let req = request(Method::Get, "/x", None);
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header("X-API-Key"), None);
    }

    #[test]
    fn test_mock_crud_cycle() {
        let mock = MockTransport::new();
        let path = "/api/v1/alerts/rules";

        let created = mock
            .send(&request(Method::Post, path, Some(json!({ "name": "a" }))))
            .unwrap();
        assert_eq!(created.status, 201);
        assert_eq!(mock.entities(path).len(), 1);

        let id = entity_id(&mock.entities(path)[0]).unwrap();
        let updated = mock
            .send(&request(
                Method::Put,
                &format!("{path}/{id}"),
                Some(json!({ "name": "a", "threshold": 5 })),
            ))
            .unwrap();
        assert_eq!(updated.status, 200);
        assert_eq!(mock.entities(path)[0]["threshold"], 5);
        assert_eq!(mock.entities(path)[0]["id"], id.as_str());

        let deleted = mock
            .send(&request(Method::Delete, &format!("{path}/{id}"), None))
            .unwrap();
        assert_eq!(deleted.status, 204);
        assert!(mock.entities(path).is_empty());

        let missing = mock
            .send(&request(Method::Delete, &format!("{path}/{id}"), None))
            .unwrap();
        assert_eq!(missing.status, 404);
    }

    #[test]
    fn test_mock_forced_failure() {
        let mock = MockTransport::new();
        mock.fail(Method::Post, "/api/v1/alerts", 422, json!({ "error": "bad" }));

        let response = mock
            .send(&request(Method::Post, "/api/v1/alerts/rules", Some(json!({}))))
            .unwrap();
        assert_eq!(response.status, 422);
        assert!(mock.entities("/api/v1/alerts/rules").is_empty());
    }

    #[test]
    fn test_mock_unreachable() {
        let mock = MockTransport::new();
        mock.set_unreachable(true);
        let result = mock.send(&request(Method::Get, "/api/v1/alerts/rules", None));
        assert!(result.is_err());
        assert_eq!(mock.requests().len(), 1);
    }

    #[test]
    fn test_mock_login() {
        let mock = MockTransport::new();
        mock.allow_login("admin", "secret", "jwt-123");

        let ok = mock
            .send(&request(
                Method::Post,
                "/api/login",
                Some(json!({ "username": "admin", "password": "secret" })),
            ))
            .unwrap();
        assert_eq!(ok.status, 200);
        assert!(ok.body.contains("jwt-123"));

        let denied = mock
            .send(&request(
                Method::Post,
                "/api/login",
                Some(json!({ "username": "admin", "password": "wrong" })),
            ))
            .unwrap();
        assert_eq!(denied.status, 401);
    }
}
