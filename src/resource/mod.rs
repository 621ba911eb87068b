//! Declared AxonOps entities as declarative resources
//!
//! Every `[[kind]]` entry of the config becomes a [`ManagedEntity`]:
//! - State detection looks the entity up by name on the server
//! - Apply goes through the generic [`Handler`] for its kind

use anyhow::Result;
use axonapi::{ApiClient, ApiResource, Handler, Lookup, Outcome, is_subset};
use serde_json::Value;
use std::sync::Arc;

use crate::schema::Declared;

use declarative::{ApplyContext, ApplyResult, Resource, ResourceState};

/// A declared entity bound to the client that converges it
#[derive(Debug)]
pub struct ManagedEntity<R> {
    declared: Declared<R>,
    client: Arc<ApiClient>,
}

impl<R: ApiResource> ManagedEntity<R> {
    pub fn new(declared: Declared<R>, client: Arc<ApiClient>) -> Self {
        Self { declared, client }
    }

    fn handler(&self) -> Handler<'_, R> {
        Handler::new(&self.client)
    }
}

impl<R: ApiResource> Resource for ManagedEntity<R> {
    fn id(&self) -> String {
        self.declared.name().to_string()
    }

    fn description(&self) -> String {
        match &self.declared {
            Declared::Create(resource) => format!("Create {}: {}", R::KIND, resource.summary()),
            Declared::Update(resource) => format!("Update {}: {}", R::KIND, resource.summary()),
            Declared::Delete(name) => format!("Delete {} '{name}'", R::KIND),
        }
    }

    fn resource_type(&self) -> &'static str {
        R::KIND.slug()
    }

    fn priority(&self) -> u8 {
        R::KIND.order()
    }

    fn current_state(&self) -> Result<ResourceState> {
        let lookup = self.handler().find(self.declared.name())?;

        Ok(match (&self.declared, lookup) {
            (_, Lookup::NotFound) => ResourceState::Absent,
            (Declared::Delete(_), Lookup::Found(entity)) => ResourceState::Present {
                details: Some(format!("id {}", entity.id)),
            },
            (Declared::Create(_), Lookup::Found(_)) => ResourceState::present(),
            (Declared::Update(resource), Lookup::Found(entity)) => {
                if resource.matches(&entity.body) {
                    ResourceState::present()
                } else {
                    let (from, to) = drift(&resource.update_body(&entity.body), &entity.body);
                    ResourceState::Modified { from, to }
                }
            }
        })
    }

    fn desired_state(&self) -> ResourceState {
        match self.declared {
            Declared::Delete(_) => ResourceState::Absent,
            _ => ResourceState::present(),
        }
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult> {
        if ctx.dry_run {
            return Ok(ApplyResult::Skipped {
                reason: "Dry run".to_string(),
            });
        }

        let handler = self.handler();
        let outcome = match &self.declared {
            Declared::Create(resource) => {
                if handler.find(resource.name())?.is_found() {
                    return Ok(ApplyResult::NoChange);
                }
                handler.create(resource)?
            }
            Declared::Update(resource) => handler.update(resource)?,
            Declared::Delete(name) => handler.delete(name)?,
        };

        if ctx.verbose {
            log::info!("{} '{}' {outcome}", R::KIND, self.declared.name());
        }

        Ok(match outcome {
            Outcome::Created => ApplyResult::Created,
            Outcome::Updated => ApplyResult::Modified,
            Outcome::Deleted => ApplyResult::Removed,
            Outcome::AlreadyAbsent => ApplyResult::NoChange,
        })
    }
}

/// Fields of `desired` that the server holds differently, as `(from, to)`
/// lists like `threshold=90` / `threshold=95`
fn drift(desired: &Value, existing: &Value) -> (String, String) {
    let Some(fields) = desired.as_object() else {
        return (render(existing), render(desired));
    };

    let mut from = Vec::new();
    let mut to = Vec::new();
    for (key, want) in fields {
        let have = existing.get(key).unwrap_or(&Value::Null);
        if !is_subset(want, have) {
            from.push(format!("{key}={}", render(have)));
            to.push(format!("{key}={}", render(want)));
        }
    }
    (from.join(", "), to.join(", "))
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => "unset".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
