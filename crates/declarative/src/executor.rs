//! Execution engine - applies resources sequentially, converge phase first

use crate::context::{ApplyContext, ConfirmCallback, Phase, ProgressCallback};
use crate::diff::{ResourceDiff, compute_diffs};
use crate::planner::ExecutionPlan;
use crate::resource::{BoxedResource, Resource};
use crate::types::{ApplyResult, ExecuteOptions, ExecuteSummary};
use anyhow::Result;

/// Execute a plan with the given options and callbacks
///
/// Only resources whose current state differs from the desired state are
/// applied. With `fail_fast`, the first failure stops the run and every
/// resource not yet applied is counted as skipped.
///
/// # Type Parameters
/// * `P` - Progress callback type
/// * `C` - Confirm callback type
///
/// # Returns
/// Summary of execution results
pub fn execute<P, C>(
    plan: ExecutionPlan,
    opts: ExecuteOptions,
    progress: &mut P,
    confirm: &mut C,
) -> Result<ExecuteSummary>
where
    P: ProgressCallback,
    C: ConfirmCallback,
{
    // Compute diffs up front; a failed lookup aborts before anything changes
    let converge_diffs = compute_diffs(&plan.converge)?;
    let removal_diffs = compute_diffs(&plan.removals)?;
    let total_changes = converge_diffs.len() + removal_diffs.len();

    if total_changes == 0 {
        return Ok(ExecuteSummary::default());
    }

    if opts.dry_run {
        return Ok(ExecuteSummary::default());
    }

    let prompt = format!(
        "Apply {total_changes} change{}?",
        if total_changes == 1 { "" } else { "s" }
    );
    if !confirm.confirm(&prompt)? {
        return Ok(ExecuteSummary {
            skipped: total_changes,
            ..Default::default()
        });
    }

    let converge = pending(&plan.converge, &converge_diffs);
    let removals = pending(&plan.removals, &removal_diffs);

    let mut summary = ExecuteSummary::default();
    let mut aborted = false;

    for (phase, batch) in [(Phase::Converge, converge), (Phase::Remove, removals)] {
        if batch.is_empty() {
            continue;
        }

        if aborted {
            skip_all(&batch, &mut summary);
            continue;
        }

        progress.on_batch_start(batch.len(), phase);
        for (idx, resource) in batch.iter().enumerate() {
            if aborted {
                skip_all(&batch[idx..], &mut summary);
                break;
            }

            let id = resource.id();
            progress.on_resource_start(&id, &resource.description());
            let result = apply_resource(*resource, opts.verbose);
            progress.on_resource_complete(&id, &result);

            if !result.is_success() && opts.fail_fast {
                aborted = true;
            }
            summary.add_result(&id, &result);
        }
        progress.on_batch_complete();
    }

    Ok(summary)
}

/// Resources of `resources` that have a diff, in plan order
fn pending<'a>(resources: &'a [BoxedResource], diffs: &[ResourceDiff]) -> Vec<&'a dyn Resource> {
    resources
        .iter()
        .map(|r| r.as_ref())
        .filter(|r| diffs.iter().any(|d| d.is_for(*r)))
        .collect()
}

fn skip_all(resources: &[&dyn Resource], summary: &mut ExecuteSummary) {
    for resource in resources {
        summary.add_result(
            &resource.id(),
            &ApplyResult::Skipped {
                reason: "Aborted after earlier failure".into(),
            },
        );
    }
}

/// Apply a single resource
fn apply_resource(resource: &dyn Resource, verbose: bool) -> ApplyResult {
    let mut ctx = ApplyContext::new(false, verbose);

    match resource.apply(&mut ctx) {
        Ok(result) => result,
        Err(e) => ApplyResult::Failed {
            error: format!("{e:#}"),
        },
    }
}

/// Simple execution without callbacks
///
/// For basic use cases where you don't need progress or confirmation.
pub fn execute_simple(plan: ExecutionPlan, opts: ExecuteOptions) -> Result<ExecuteSummary> {
    use crate::context::{AutoConfirm, NoProgress};

    execute(plan, opts, &mut NoProgress, &mut AutoConfirm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{AutoConfirm, AutoDecline, NoProgress};
    use crate::types::ResourceState;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<String>>>;

    #[derive(Debug)]
    struct TestResource {
        id: String,
        should_change: bool,
        fails: bool,
        remove: bool,
        priority: u8,
        log: Log,
    }

    impl TestResource {
        fn new(id: &str, log: &Log) -> Self {
            Self {
                id: id.into(),
                should_change: true,
                fails: false,
                remove: false,
                priority: 0,
                log: Arc::clone(log),
            }
        }
    }

    impl Resource for TestResource {
        fn id(&self) -> String {
            self.id.clone()
        }

        fn description(&self) -> String {
            format!("Test resource {}", self.id)
        }

        fn resource_type(&self) -> &'static str {
            "test"
        }

        fn priority(&self) -> u8 {
            self.priority
        }

        fn current_state(&self) -> Result<ResourceState> {
            match (self.should_change, self.remove) {
                (false, false) | (true, true) => Ok(ResourceState::present()),
                (true, false) | (false, true) => Ok(ResourceState::Absent),
            }
        }

        fn desired_state(&self) -> ResourceState {
            if self.remove {
                ResourceState::Absent
            } else {
                ResourceState::present()
            }
        }

        fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult> {
            if ctx.dry_run {
                return Ok(ApplyResult::Skipped {
                    reason: "Dry run".into(),
                });
            }
            self.log.lock().unwrap().push(self.id.clone());
            if self.fails {
                anyhow::bail!("server said no");
            }
            if self.remove {
                Ok(ApplyResult::Removed)
            } else {
                Ok(ApplyResult::Created)
            }
        }
    }

    fn plan_of(resources: Vec<TestResource>) -> ExecutionPlan {
        let mut plan = ExecutionPlan::new();
        for r in resources {
            plan.add_resource(Box::new(r));
        }
        plan.sort();
        plan
    }

    #[test]
    fn test_execute_empty_plan() {
        let result = execute_simple(ExecutionPlan::new(), ExecuteOptions::default()).unwrap();
        assert_eq!(result.total(), 0);
    }

    #[test]
    fn test_execute_no_changes() {
        let log = Log::default();
        let plan = plan_of(vec![TestResource {
            should_change: false,
            ..TestResource::new("test1", &log)
        }]);

        let result = execute_simple(plan, ExecuteOptions::default()).unwrap();

        // No diff means no execution
        assert_eq!(result.total(), 0);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_execute_with_changes() {
        let log = Log::default();
        let plan = plan_of(vec![TestResource::new("test1", &log)]);

        let result = execute(
            plan,
            ExecuteOptions::default(),
            &mut NoProgress,
            &mut AutoConfirm,
        )
        .unwrap();

        assert_eq!(result.created, 1);
    }

    #[test]
    fn test_only_changed_resources_are_applied() {
        let log = Log::default();
        let plan = plan_of(vec![
            TestResource::new("a", &log),
            TestResource {
                should_change: false,
                ..TestResource::new("b", &log)
            },
        ]);

        execute_simple(plan, ExecuteOptions::default()).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["a".to_string()]);
    }

    #[test]
    fn test_dry_run_applies_nothing() {
        let log = Log::default();
        let plan = plan_of(vec![TestResource::new("a", &log)]);
        let opts = ExecuteOptions {
            dry_run: true,
            ..Default::default()
        };

        let result = execute_simple(plan, opts).unwrap();
        assert_eq!(result.total(), 0);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_declined_confirmation_skips_all() {
        let log = Log::default();
        let plan = plan_of(vec![
            TestResource::new("a", &log),
            TestResource::new("b", &log),
        ]);

        let result = execute(
            plan,
            ExecuteOptions::default(),
            &mut NoProgress,
            &mut AutoDecline,
        )
        .unwrap();
        assert_eq!(result.skipped, 2);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_order_converge_then_reverse_removals() {
        let log = Log::default();
        let plan = plan_of(vec![
            TestResource {
                remove: true,
                priority: 0,
                ..TestResource::new("old_endpoint", &log)
            },
            TestResource {
                priority: 2,
                ..TestResource::new("rule", &log)
            },
            TestResource {
                remove: true,
                priority: 1,
                ..TestResource::new("old_route", &log)
            },
            TestResource {
                priority: 0,
                ..TestResource::new("endpoint", &log)
            },
        ]);

        let summary = execute_simple(plan, ExecuteOptions::default()).unwrap();
        assert_eq!(summary.created, 2);
        assert_eq!(summary.removed, 2);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["endpoint", "rule", "old_route", "old_endpoint"]
        );
    }

    #[test]
    fn test_fail_fast_skips_rest() {
        let log = Log::default();
        let plan = plan_of(vec![
            TestResource::new("a", &log),
            TestResource {
                fails: true,
                ..TestResource::new("b", &log)
            },
            TestResource::new("c", &log),
            TestResource {
                remove: true,
                ..TestResource::new("d", &log)
            },
        ]);

        let summary = execute_simple(plan, ExecuteOptions::default()).unwrap();
        assert_eq!(summary.created, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 2);
        assert_eq!(
            summary.failures,
            vec![("b".to_string(), "server said no".to_string())]
        );
        assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_keep_going_applies_rest() {
        let log = Log::default();
        let plan = plan_of(vec![
            TestResource {
                fails: true,
                ..TestResource::new("a", &log)
            },
            TestResource::new("b", &log),
        ]);
        let opts = ExecuteOptions {
            fail_fast: false,
            ..Default::default()
        };

        let summary = execute_simple(plan, opts).unwrap();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.created, 1);
        assert_eq!(summary.skipped, 0);
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl ProgressCallback for Recorder {
        fn on_batch_start(&mut self, count: usize, phase: Phase) {
            self.events.push(format!("batch {phase:?} {count}"));
        }

        fn on_resource_start(&mut self, id: &str, _description: &str) {
            self.events.push(format!("start {id}"));
        }

        fn on_resource_complete(&mut self, id: &str, result: &ApplyResult) {
            self.events.push(format!("done {id} {}", result.is_success()));
        }

        fn on_batch_complete(&mut self) {
            self.events.push("end".into());
        }
    }

    #[test]
    fn test_progress_events() {
        let log = Log::default();
        let plan = plan_of(vec![
            TestResource::new("a", &log),
            TestResource {
                remove: true,
                ..TestResource::new("z", &log)
            },
        ]);
        let mut recorder = Recorder::default();

        execute(
            plan,
            ExecuteOptions::default(),
            &mut recorder,
            &mut AutoConfirm,
        )
        .unwrap();

        assert_eq!(
            recorder.events,
            vec![
                "batch Converge 1",
                "start a",
                "done a true",
                "end",
                "batch Remove 1",
                "start z",
                "done z true",
                "end",
            ]
        );
    }
}
