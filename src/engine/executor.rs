//! Execution engine - declarative executor with terminal UI

use anyhow::Result;
use colored::Colorize;
use declarative::{
    ApplyResult, ConfirmCallback, ExecutionPlan, Phase, ProgressCallback, ResourceDiff,
    compute_diffs,
};
use indicatif::ProgressBar;

use crate::progress;

use super::differ::display_diff;

pub use declarative::ExecuteSummary;

/// Options for an apply run
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Don't make changes, just show what would happen
    pub dry_run: bool,
    /// Skip confirmation prompts
    pub yes: bool,
    /// Keep applying after a failure
    pub keep_going: bool,
    /// Verbose output
    pub verbose: bool,
}

/// Compute diffs for the whole plan, converge phase first
pub fn plan_diffs(plan: &ExecutionPlan) -> Result<Vec<ResourceDiff>> {
    let pb = progress::spinner(&format!(
        "Reading current state of {} resources...",
        plan.total_resources()
    ));
    let result = compute_diffs(&plan.converge).and_then(|mut diffs| {
        diffs.extend(compute_diffs(&plan.removals)?);
        Ok(diffs)
    });
    pb.finish_and_clear();
    result
}

/// Show the diff, confirm and apply the plan
pub fn execute(plan: ExecutionPlan, opts: &ExecuteOptions) -> Result<ExecuteSummary> {
    let diffs = plan_diffs(&plan)?;
    display_diff(&diffs);

    if diffs.is_empty() {
        return Ok(ExecuteSummary::default());
    }

    if opts.dry_run {
        println!();
        println!("  {} Dry run - no changes made", "ℹ".blue());
        return Ok(ExecuteSummary::default());
    }

    println!();
    let declarative_opts = declarative::ExecuteOptions {
        dry_run: false,
        fail_fast: !opts.keep_going,
        verbose: opts.verbose,
    };
    let summary = declarative::execute(
        plan,
        declarative_opts,
        &mut BarProgress::default(),
        &mut TerminalConfirm { yes: opts.yes },
    )?;

    // A declined prompt reports every pending change as skipped
    if summary.skipped > 0 && summary.skipped == summary.total() {
        println!();
        println!("  {} Aborted", "✗".red());
        return Ok(summary);
    }

    print_summary(&summary);
    Ok(summary)
}

/// Progress bar per phase, one tick per resource
#[derive(Default)]
struct BarProgress {
    bar: Option<ProgressBar>,
}

impl ProgressCallback for BarProgress {
    fn on_batch_start(&mut self, count: usize, phase: Phase) {
        let label = match phase {
            Phase::Converge => "Applying",
            Phase::Remove => "Removing",
        };
        println!("  {} {label} {count} resources...", "→".cyan());
        self.bar = Some(progress::bar(count as u64, label));
    }

    fn on_resource_start(&mut self, id: &str, _description: &str) {
        if let Some(pb) = &self.bar {
            pb.set_message(format!("○ {id}"));
        }
    }

    fn on_resource_complete(&mut self, id: &str, result: &ApplyResult) {
        let Some(pb) = &self.bar else {
            return;
        };

        let symbol = match result {
            ApplyResult::NoChange => "○",
            ApplyResult::Created | ApplyResult::Modified | ApplyResult::Removed => "✓",
            ApplyResult::Failed { .. } => "✗",
            ApplyResult::Skipped { .. } => "⊘",
        };
        pb.set_message(format!("{symbol} {id}"));
        pb.inc(1);

        if let ApplyResult::Failed { error } = result {
            pb.println(format!("    {} {id}: {error}", "✗".red()));
        }
    }

    fn on_batch_complete(&mut self) {
        if let Some(pb) = self.bar.take() {
            pb.finish_and_clear();
        }
    }
}

/// Prompt on the terminal unless `--yes` was given
struct TerminalConfirm {
    yes: bool,
}

impl ConfirmCallback for TerminalConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        if self.yes {
            return Ok(true);
        }

        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(true)
            .interact()?;

        Ok(confirmed)
    }
}

/// Print final summary
pub fn print_summary(summary: &ExecuteSummary) {
    println!();
    if summary.is_success() {
        println!(
            "  {} Configuration applied successfully!",
            "✓".green().bold()
        );
    } else {
        println!(
            "  {} Configuration applied with errors",
            "⚠".yellow().bold()
        );
    }

    if summary.created > 0 {
        println!("    • {} resources created", summary.created);
    }
    if summary.modified > 0 {
        println!("    • {} resources updated", summary.modified);
    }
    if summary.removed > 0 {
        println!("    • {} resources deleted", summary.removed);
    }
    if summary.no_change > 0 {
        println!("    • {} resources already up to date", summary.no_change);
    }
    if summary.skipped > 0 {
        println!("    • {} resources skipped", summary.skipped);
    }
    if summary.failed > 0 {
        println!("    • {} {} failed", summary.failed, "resources".red());
        for (id, error) in &summary.failures {
            println!("      {} {id}: {}", "✗".red(), error.dimmed());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::planner::build_plan;
    use crate::schema::AxonConfig;
    use axonapi::{ApiClient, Method, MockTransport};
    use serde_json::json;
    use std::sync::Arc;

    const RULES: &str = "/api/v1/alerts/rules";

    fn setup(config: &str) -> (MockTransport, ExecutionPlan) {
        let mock = MockTransport::new();
        let client = Arc::new(ApiClient::with_transport(
            "http://axon.test",
            Arc::new(mock.clone()),
        ));
        let config = AxonConfig::parse(config).unwrap();
        (mock, build_plan(config, &client))
    }

    const HIGH_CPU: &str = r#"
[[alert_rules]]
name = "high_cpu"
metric = "cpu_usage"
condition = "above"
threshold = 95
action = "update"

[[alert_rules]]
name = "nonexistent_rule"
action = "delete"
"#;

    #[test]
    fn test_apply_creates_and_skips_absent_delete() {
        let (mock, plan) = setup(HIGH_CPU);
        let opts = ExecuteOptions {
            yes: true,
            ..Default::default()
        };

        let summary = execute(plan, &opts).unwrap();

        assert_eq!(summary.created, 1);
        assert!(summary.is_success());
        assert_eq!(mock.entities(RULES).len(), 1);
        assert!(mock.requests_with(Method::Delete).is_empty());
    }

    #[test]
    fn test_apply_updates_drifted_rule() {
        let (mock, plan) = setup(HIGH_CPU);
        mock.seed(
            RULES,
            json!({
                "id": "1",
                "name": "high_cpu",
                "metric": "cpu_usage",
                "condition": "above",
                "threshold": 90,
            }),
        );
        let opts = ExecuteOptions {
            yes: true,
            ..Default::default()
        };

        let summary = execute(plan, &opts).unwrap();

        assert_eq!(summary.modified, 1);
        let stored = mock.entities(RULES);
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0]["name"], "high_cpu");
        assert_eq!(stored[0]["threshold"].as_f64(), Some(95.0));
    }

    #[test]
    fn test_dry_run_sends_only_reads() {
        let (mock, plan) = setup(HIGH_CPU);
        let opts = ExecuteOptions {
            dry_run: true,
            ..Default::default()
        };

        let summary = execute(plan, &opts).unwrap();

        assert_eq!(summary.total(), 0);
        assert!(
            mock.requests()
                .iter()
                .all(|r| r.method == Method::Get)
        );
    }

    #[test]
    fn test_failure_is_reported() {
        let (mock, plan) = setup(HIGH_CPU);
        mock.fail(Method::Post, RULES, 400, json!({"error": "invalid metric"}));
        let opts = ExecuteOptions {
            yes: true,
            ..Default::default()
        };

        let summary = execute(plan, &opts).unwrap();

        assert_eq!(summary.failed, 1);
        assert!(summary.failures[0].1.contains("invalid metric"));
    }

    #[test]
    fn test_unreachable_server_aborts_before_changes() {
        let (mock, plan) = setup(HIGH_CPU);
        mock.set_unreachable(true);

        let err = execute(plan, &ExecuteOptions::default()).unwrap_err();
        assert!(format!("{err:#}").contains("Connection refused"));
    }
}
