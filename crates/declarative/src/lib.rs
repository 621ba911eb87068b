//! # Declarative
//!
//! A framework for declarative resource management.
//!
//! This crate provides the core abstractions for declaring desired state,
//! detecting current state, and converging systems to match the desired state.
//!
//! ## Core Concepts
//!
//! - **Resource**: Something with state that can be managed (a remote alert rule, an endpoint)
//! - **ResourceState**: The current or desired state of a resource
//! - **ExecutionPlan**: A plan split into a converge phase and a removal phase
//! - **Executor**: Applies resources sequentially, stopping at the first failure
//!
//! ## Example
//!
//! ```ignore
//! use declarative::{ExecutionPlan, ExecuteOptions, execute_simple};
//!
//! let mut plan = ExecutionPlan::new();
//! plan.add_resource(Box::new(my_resource));
//! plan.sort();
//!
//! let summary = execute_simple(plan.filter_by_target(Some("alert_rules")), ExecuteOptions::default())?;
//! println!("{} created, {} failed", summary.created, summary.failed);
//! ```
//!
//! ## Callback Traits
//!
//! The crate uses traits for dependency injection:
//!
//! - [`ProgressCallback`]: Receives progress updates
//! - [`ConfirmCallback`]: Handles user confirmations
//!
//! This allows the crate to be used without hard dependencies on
//! specific UI frameworks.

pub mod context;
pub mod diff;
pub mod executor;
pub mod planner;
pub mod resource;
pub mod types;

// Re-export main types at crate root
pub use context::{
    ApplyContext, AutoConfirm, AutoDecline, ConfirmCallback, NoProgress, Phase, ProgressCallback,
};
pub use diff::{DiffSummary, ResourceDiff, compute_diffs, group_by_type};
pub use executor::{execute, execute_simple};
pub use planner::ExecutionPlan;
pub use resource::{BoxedResource, Resource, ResourceExt};
pub use types::{ApplyResult, ExecuteOptions, ExecuteSummary, ResourceState};
