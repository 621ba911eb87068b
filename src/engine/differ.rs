//! Diff display

use axonapi::ResourceKind;
use colored::Colorize;
use declarative::{DiffSummary, ResourceDiff, ResourceState, group_by_type};

use crate::ui;

/// Display a list of diffs in a user-friendly format
pub fn display_diff(diffs: &[ResourceDiff]) {
    if diffs.is_empty() {
        println!();
        println!("  {} No changes needed", "✓".green());
        return;
    }

    println!();
    println!(
        "┌─ {} ─────────────────────────────────────────┐",
        "Configuration Diff".bold()
    );
    println!("│");

    for (resource_type, type_diffs) in group_by_type(diffs) {
        println!("│ {}", section_title(&resource_type).bold());

        for diff in type_diffs {
            println!(
                "│   {} {:<30} {}",
                symbol(diff),
                diff.resource_id,
                state_desc(diff).dimmed()
            );
        }
        println!("│");
    }

    let summary = DiffSummary::from_diffs(diffs);
    println!("├─────────────────────────────────────────────────────┤");
    println!(
        "│ Summary: {} changes ({} to create, {} to update, {} to delete)",
        summary.total().to_string().bold(),
        summary.additions.to_string().green(),
        summary.modifications.to_string().yellow(),
        summary.removals.to_string().red()
    );
    println!("└─────────────────────────────────────────────────────┘");
}

fn section_title(resource_type: &str) -> String {
    match resource_type.parse::<ResourceKind>() {
        Ok(kind) => ui::capitalize(kind.plural()),
        Err(_) => resource_type.to_string(),
    }
}

fn symbol(diff: &ResourceDiff) -> colored::ColoredString {
    if diff.is_addition() {
        "+".green()
    } else if diff.is_removal() {
        "-".red()
    } else if diff.is_modification() {
        "~".yellow()
    } else {
        "?".dimmed()
    }
}

fn state_desc(diff: &ResourceDiff) -> String {
    match (&diff.current, &diff.desired) {
        (ResourceState::Absent, ResourceState::Present { .. }) => {
            format!("(not present) {}", diff.description)
        }
        (ResourceState::Modified { from, to }, _) => format!("{from} → {to}"),
        (ResourceState::Present { details }, ResourceState::Absent) => match details {
            Some(details) => format!("(will remove, {details})"),
            None => "(will remove)".to_string(),
        },
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff(current: ResourceState, desired: ResourceState) -> ResourceDiff {
        ResourceDiff {
            resource_id: "high_cpu".to_string(),
            resource_type: "alert_rules".to_string(),
            description: "Create alert rule: cpu_usage above 90".to_string(),
            current,
            desired,
        }
    }

    #[test]
    fn test_section_title() {
        assert_eq!(section_title("alert_rules"), "Alert rules");
        assert_eq!(section_title("backups"), "Backup configs");
        assert_eq!(section_title("widgets"), "widgets");
    }

    #[test]
    fn test_state_desc() {
        let added = diff(ResourceState::Absent, ResourceState::present());
        assert_eq!(
            state_desc(&added),
            "(not present) Create alert rule: cpu_usage above 90"
        );

        let changed = diff(
            ResourceState::Modified {
                from: "threshold=90.0".to_string(),
                to: "threshold=95.0".to_string(),
            },
            ResourceState::present(),
        );
        assert_eq!(state_desc(&changed), "threshold=90.0 → threshold=95.0");

        let removed = diff(
            ResourceState::Present {
                details: Some("id 7".to_string()),
            },
            ResourceState::Absent,
        );
        assert_eq!(state_desc(&removed), "(will remove, id 7)");
    }

    #[test]
    fn test_display_diff_does_not_panic() {
        display_diff(&[]);
        display_diff(&[diff(ResourceState::Absent, ResourceState::present())]);
    }
}
