//! Execution planner - builds resource execution plans

use crate::resource::{BoxedResource, Resource, ResourceExt};

/// An execution plan with resources split into converge and removal phases
///
/// Converge resources run in ascending priority; removals run afterwards in
/// descending priority, so dependents are removed before what they refer to.
pub struct ExecutionPlan {
    /// Resources whose desired state is present
    pub converge: Vec<BoxedResource>,
    /// Resources whose desired state is absent
    pub removals: Vec<BoxedResource>,
}

impl ExecutionPlan {
    /// Create a new empty plan
    pub fn new() -> Self {
        Self {
            converge: Vec::new(),
            removals: Vec::new(),
        }
    }

    /// Add a resource to the plan, routing it by desired state
    pub fn add_resource(&mut self, resource: BoxedResource) {
        if resource.is_removal() {
            self.removals.push(resource);
        } else {
            self.converge.push(resource);
        }
    }

    /// Order both phases by priority
    ///
    /// The sort is stable, so resources of equal priority keep declaration order.
    pub fn sort(&mut self) {
        self.converge.sort_by_key(|r| r.priority());
        self.removals
            .sort_by_key(|r| std::cmp::Reverse(r.priority()));
    }

    /// Filter plan to only include resources matching a predicate
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&dyn Resource) -> bool,
    {
        Self {
            converge: self
                .converge
                .into_iter()
                .filter(|r| predicate(r.as_ref()))
                .collect(),
            removals: self
                .removals
                .into_iter()
                .filter(|r| predicate(r.as_ref()))
                .collect(),
        }
    }

    /// Filter plan to only include resources matching a target pattern
    ///
    /// Target format: "type" or "type.name"
    pub fn filter_by_target(self, target: Option<&str>) -> Self {
        match target {
            None => self,
            Some(t) => {
                let (resource_type, name) = parse_target(t);
                self.filter(|r| matches_filter(r, &resource_type, name.as_deref()))
            }
        }
    }

    /// All resources, converge phase first
    pub fn iter(&self) -> impl Iterator<Item = &BoxedResource> {
        self.converge.iter().chain(self.removals.iter())
    }

    /// Total number of resources in the plan
    pub fn total_resources(&self) -> usize {
        self.converge.len() + self.removals.len()
    }

    /// Check if plan is empty
    pub fn is_empty(&self) -> bool {
        self.converge.is_empty() && self.removals.is_empty()
    }

    /// Check if plan has any removals
    pub fn has_removals(&self) -> bool {
        !self.removals.is_empty()
    }
}

impl Default for ExecutionPlan {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a target string like "type.name" into (type, name)
///
/// Only the first dot separates; names may themselves contain dots.
fn parse_target(target: &str) -> (String, Option<String>) {
    match target.split_once('.') {
        Some((resource_type, name)) => (resource_type.to_string(), Some(name.to_string())),
        None => (target.to_string(), None),
    }
}

/// Check if a resource matches the filter criteria
fn matches_filter(resource: &dyn Resource, resource_type: &str, name: Option<&str>) -> bool {
    if resource.resource_type() != resource_type {
        return false;
    }

    if let Some(n) = name
        && resource.id() != n
    {
        return false;
    }

    true
}
