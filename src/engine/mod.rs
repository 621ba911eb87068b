//! Execution engine for axonctl
//!
//! The engine orchestrates:
//! 1. Planning - Build the resource plan from config
//! 2. Diffing - Compare declared entities with the server
//! 3. Executing - Apply changes in kind order with progress and confirmation

pub mod differ;
pub mod executor;
pub mod planner;

pub use executor::{ExecuteOptions, execute};
pub use planner::build_plan;
