//! Generic CRUD mapping from a declared entity onto the REST API.
//!
//! Every mutation of an existing entity resolves the server id by listing the
//! collection and matching on `name` (exact, case-sensitive). Nothing is
//! cached between calls, so a concurrent change between the lookup and the
//! PUT/DELETE is not detected.

use crate::client::ApiClient;
use crate::error::{Error, Result};
use crate::kind::ResourceKind;
use crate::response::ApiResponse;
use crate::transport::Method;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

/// A declared entity that can be sent to the API.
pub trait ApiResource: fmt::Debug + Send + Sync {
    /// Which collection this entity lives in.
    const KIND: ResourceKind;

    /// Unique key of the entity.
    fn name(&self) -> &str;

    /// Check the declared fields before anything is sent.
    fn validate(&self) -> Result<()>;

    /// JSON body for a POST.
    fn create_body(&self) -> Value;

    /// JSON body for a PUT, given the server's current representation.
    fn update_body(&self, existing: &Value) -> Value {
        let _ = existing;
        self.create_body()
    }

    /// Whether the server representation already reflects this declaration.
    fn matches(&self, existing: &Value) -> bool {
        is_subset(&self.update_body(existing), existing)
    }

    /// One-line description for plans and listings.
    fn summary(&self) -> String;
}

/// An entity as stored on the server.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteEntity {
    pub id: String,
    pub name: String,
    pub body: Value,
}

impl RemoteEntity {
    /// Read `id` and `name` out of a list entry.
    ///
    /// Numeric ids are accepted and rendered as strings. Entries without a
    /// string `name` are ignored by the caller.
    pub fn from_value(value: &Value) -> Option<Self> {
        let name = value.get("name")?.as_str()?.to_string();
        let id = match value.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        Some(Self {
            id,
            name,
            body: value.clone(),
        })
    }
}

/// Item id of a listed entity, required before a PUT or DELETE.
fn item_id(kind: ResourceKind, entity: &RemoteEntity) -> Result<&str> {
    if entity.id.is_empty() {
        return Err(Error::InvalidResponse(format!(
            "{kind} '{}' has no id",
            entity.name
        )));
    }
    Ok(&entity.id)
}

/// Result of a name lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Found(RemoteEntity),
    NotFound,
}

impl Lookup {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// What a mutating handler call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Updated,
    Deleted,
    AlreadyAbsent,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::AlreadyAbsent => "already absent",
        };
        f.write_str(s)
    }
}

/// CRUD operations for one entity kind.
///
/// ```
/// use std::sync::Arc;
/// use axonapi::models::{AlertRule, Condition};
/// use axonapi::{ApiClient, Handler, MockTransport};
///
/// let mock = MockTransport::new();
/// let client = ApiClient::with_transport("http://axon.test", Arc::new(mock.clone()));
/// let rules = Handler::<AlertRule>::new(&client);
///
/// let rule = AlertRule::new("high_cpu", "cpu_usage", Condition::Above, 90.0);
/// rules.create(&rule).unwrap();
/// assert!(rules.exists("high_cpu"));
/// ```
pub struct Handler<'a, R> {
    client: &'a ApiClient,
    _kind: PhantomData<fn() -> R>,
}

impl<R> fmt::Debug for Handler<'_, R>
where
    R: ApiResource,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("kind", &R::KIND)
            .field("base_url", &self.client.base_url())
            .finish()
    }
}

fn api_error(kind: ResourceKind, action: String, response: &ApiResponse) -> Error {
    Error::Api {
        kind,
        action,
        message: response.error_message(),
        status: response.code,
    }
}

impl<'a, R: ApiResource> Handler<'a, R> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            client,
            _kind: PhantomData,
        }
    }

    /// All entities of this kind.
    pub fn list(&self) -> Result<Vec<RemoteEntity>> {
        let response = self
            .client
            .request(Method::Get, R::KIND.collection_path(), None);
        if !response.success {
            return Err(api_error(
                R::KIND,
                format!("get {}", R::KIND.plural()),
                &response,
            ));
        }

        Ok(response
            .items()
            .iter()
            .filter_map(RemoteEntity::from_value)
            .collect())
    }

    /// Find an entity by exact name.
    pub fn find(&self, name: &str) -> Result<Lookup> {
        let found = self.list()?.into_iter().find(|e| e.name == name);
        Ok(found.map_or(Lookup::NotFound, Lookup::Found))
    }

    /// Whether an entity with this name exists. A failed lookup counts as absent.
    pub fn exists(&self, name: &str) -> bool {
        match self.find(name) {
            Ok(lookup) => lookup.is_found(),
            Err(e) => {
                log::debug!("Existence check for {} '{name}' failed: {e}", R::KIND);
                false
            }
        }
    }

    /// POST a new entity.
    pub fn create(&self, resource: &R) -> Result<Outcome> {
        log::info!("Creating {} '{}'", R::KIND, resource.name());

        let body = resource.create_body();
        let response = self
            .client
            .request(Method::Post, R::KIND.collection_path(), Some(&body));
        if !response.success {
            return Err(api_error(
                R::KIND,
                format!("create {}", R::KIND),
                &response,
            ));
        }

        log::info!("Created {} '{}'", R::KIND, resource.name());
        Ok(Outcome::Created)
    }

    /// PUT over the entity with the same name, or create it when absent.
    pub fn update(&self, resource: &R) -> Result<Outcome> {
        let existing = match self.find(resource.name())? {
            Lookup::Found(entity) => entity,
            Lookup::NotFound => {
                log::warn!(
                    "{} '{}' not found, creating it instead",
                    R::KIND,
                    resource.name()
                );
                return self.create(resource);
            }
        };

        let id = item_id(R::KIND, &existing)?;
        log::info!("Updating {} '{}' (id {id})", R::KIND, resource.name());

        let body = resource.update_body(&existing.body);
        let response = self
            .client
            .request(Method::Put, &R::KIND.item_path(id), Some(&body));
        if !response.success {
            return Err(api_error(
                R::KIND,
                format!("update {}", R::KIND),
                &response,
            ));
        }

        Ok(Outcome::Updated)
    }

    /// DELETE the entity with this name. Absent entities are left alone.
    pub fn delete(&self, name: &str) -> Result<Outcome> {
        let existing = match self.find(name)? {
            Lookup::Found(entity) => entity,
            Lookup::NotFound => {
                log::info!("{} '{name}' does not exist, nothing to delete", R::KIND);
                return Ok(Outcome::AlreadyAbsent);
            }
        };

        let id = item_id(R::KIND, &existing)?;
        log::info!("Deleting {} '{name}' (id {id})", R::KIND);

        let response = self
            .client
            .request(Method::Delete, &R::KIND.item_path(id), None);
        if !response.success {
            return Err(api_error(
                R::KIND,
                format!("delete {}", R::KIND),
                &response,
            ));
        }

        Ok(Outcome::Deleted)
    }
}

/// Whether every field in `desired` is present in `actual` with the same value.
///
/// Objects are compared key by key (extra keys in `actual` are ignored),
/// arrays element by element, numbers numerically. A `null` in `desired`
/// also matches a missing key.
pub fn is_subset(desired: &Value, actual: &Value) -> bool {
    match (desired, actual) {
        (Value::Object(want), Value::Object(have)) => want.iter().all(|(key, value)| {
            have.get(key)
                .map_or(value.is_null(), |current| is_subset(value, current))
        }),
        (Value::Array(want), Value::Array(have)) => {
            want.len() == have.len() && want.iter().zip(have).all(|(w, h)| is_subset(w, h))
        }
        (Value::Number(want), Value::Number(have)) => want.as_f64() == have.as_f64(),
        _ => desired == actual,
    }
}
