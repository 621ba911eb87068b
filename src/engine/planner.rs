//! Execution planner - turns the config into a declarative plan

use axonapi::{ApiClient, ApiResource};
use declarative::ExecutionPlan;
use std::sync::Arc;

use crate::resource::ManagedEntity;
use crate::schema::{AxonConfig, Declared};

/// Build the plan for every declared entity, ordered for converge and removal
pub fn build_plan(config: AxonConfig, client: &Arc<ApiClient>) -> ExecutionPlan {
    let mut plan = ExecutionPlan::new();

    add_all(&mut plan, config.endpoints, client);
    add_all(&mut plan, config.routes, client);
    add_all(&mut plan, config.alert_rules, client);
    add_all(&mut plan, config.log_rules, client);
    add_all(&mut plan, config.service_checks, client);
    add_all(&mut plan, config.backups, client);

    plan.sort();
    plan
}

fn add_all<R>(plan: &mut ExecutionPlan, items: Vec<Declared<R>>, client: &Arc<ApiClient>)
where
    R: ApiResource + 'static,
{
    for declared in items {
        plan.add_resource(Box::new(ManagedEntity::new(declared, Arc::clone(client))));
    }
}
