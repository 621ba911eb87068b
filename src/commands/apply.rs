use anyhow::{Result, bail};

use crate::Context;
use crate::cli::{ApplyArgs, DiffArgs};
use crate::config;
use crate::engine::{self, ExecuteOptions, differ, executor};
use crate::ui;

pub fn run(ctx: &Context, args: ApplyArgs) -> Result<()> {
    if !ctx.quiet {
        ui::header("Applying Configuration");
    }

    if args.dry_run {
        ui::warn("Dry run - no changes will be made");
    }

    let config = config::load(ctx)?;
    let client = super::connect(&config.api)?;
    let plan = engine::build_plan(config, &client).filter_by_target(args.target.as_deref());

    if plan.is_empty() {
        ui::info(&no_resources_message(args.target.as_deref()));
        return Ok(());
    }

    let opts = ExecuteOptions {
        dry_run: args.dry_run,
        yes: args.yes,
        keep_going: args.keep_going,
        verbose: ctx.verbose > 0,
    };
    let summary = engine::execute(plan, &opts)?;

    if !summary.is_success() {
        bail!(
            "{} of {} changes failed",
            summary.failed,
            summary.total()
        );
    }
    Ok(())
}

pub fn diff(ctx: &Context, args: DiffArgs) -> Result<()> {
    if !ctx.quiet {
        ui::header("Configuration Diff");
    }

    let config = config::load(ctx)?;
    let client = super::connect(&config.api)?;
    let plan = engine::build_plan(config, &client).filter_by_target(args.target.as_deref());

    if plan.is_empty() {
        ui::info(&no_resources_message(args.target.as_deref()));
        return Ok(());
    }

    let diffs = executor::plan_diffs(&plan)?;
    differ::display_diff(&diffs);
    Ok(())
}

fn no_resources_message(target: Option<&str>) -> String {
    match target {
        Some(target) => format!("No declared resources match '{target}'"),
        None => "No resources declared".to_string(),
    }
}
