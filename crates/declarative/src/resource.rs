//! Resource trait for declarative state management
//!
//! A Resource represents something that can be in a certain state,
//! and can be changed to reach a desired state.

use crate::context::ApplyContext;
use crate::types::{ApplyResult, ResourceState};
use anyhow::Result;
use std::fmt;

/// Core trait for declarative resources
///
/// Every resource in the system implements this trait, which provides:
/// - Identity (id, description, type)
/// - Ordering (priority)
/// - State detection (current vs desired)
/// - State convergence (apply)
///
/// # Example
///
/// ```
/// use declarative::{ApplyContext, ApplyResult, Resource, ResourceState};
///
/// #[derive(Debug)]
/// struct Flag {
///     name: String,
///     on: std::sync::atomic::AtomicBool,
/// }
///
/// impl Resource for Flag {
///     fn id(&self) -> String {
///         self.name.clone()
///     }
///
///     fn description(&self) -> String {
///         format!("Turn on {}", self.name)
///     }
///
///     fn resource_type(&self) -> &'static str {
///         "flag"
///     }
///
///     fn current_state(&self) -> anyhow::Result<ResourceState> {
///         if self.on.load(std::sync::atomic::Ordering::SeqCst) {
///             Ok(ResourceState::present())
///         } else {
///             Ok(ResourceState::Absent)
///         }
///     }
///
///     fn desired_state(&self) -> ResourceState {
///         ResourceState::present()
///     }
///
///     fn apply(&self, ctx: &mut ApplyContext) -> anyhow::Result<ApplyResult> {
///         if ctx.dry_run {
///             return Ok(ApplyResult::Skipped { reason: "Dry run".into() });
///         }
///         self.on.store(true, std::sync::atomic::Ordering::SeqCst);
///         Ok(ApplyResult::Created)
///     }
/// }
///
/// let flag = Flag { name: "beta".into(), on: Default::default() };
/// assert!(flag.needs_apply().unwrap());
/// ```
pub trait Resource: Send + Sync + fmt::Debug {
    /// Unique identifier for this resource
    ///
    /// This should be stable and uniquely identify the resource
    /// within its type, e.g. the name of an alert rule.
    fn id(&self) -> String;

    /// Human-readable description of what this resource does
    fn description(&self) -> String;

    /// Resource type category
    ///
    /// Used for grouping and filtering, e.g. "alert_rules".
    fn resource_type(&self) -> &'static str;

    /// Ordering key; lower values converge first and are removed last
    fn priority(&self) -> u8 {
        0
    }

    /// Detect the current state of this resource
    ///
    /// This should query the system to determine what state
    /// the resource is currently in.
    fn current_state(&self) -> Result<ResourceState>;

    /// Get the desired state for this resource
    ///
    /// This is typically derived from configuration.
    fn desired_state(&self) -> ResourceState;

    /// Check if the resource needs changes to reach desired state
    ///
    /// Default implementation compares current and desired states.
    fn needs_apply(&self) -> Result<bool> {
        let current = self.current_state()?;
        let desired = self.desired_state();
        Ok(current != desired)
    }

    /// Apply changes to reach the desired state
    ///
    /// This method should:
    /// 1. Respect ctx.dry_run (return Skipped if true)
    /// 2. Make the necessary changes
    /// 3. Return the appropriate ApplyResult
    fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult>;
}

/// A boxed resource for type-erased storage
pub type BoxedResource = Box<dyn Resource>;

/// Extension trait for working with boxed resources
pub trait ResourceExt {
    /// Whether this resource converges towards absence
    fn is_removal(&self) -> bool;

    /// `type.id`, the form accepted by target filters
    fn qualified_id(&self) -> String;
}

impl<R: Resource + ?Sized> ResourceExt for R {
    fn is_removal(&self) -> bool {
        self.desired_state().is_absent()
    }

    fn qualified_id(&self) -> String {
        format!("{}.{}", self.resource_type(), self.id())
    }
}
