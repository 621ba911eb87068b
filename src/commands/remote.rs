use anyhow::Result;
use axonapi::models::{
    AlertRoute, AlertRule, BackupConfig, LogRule, NotificationEndpoint, ServiceCheck,
};
use axonapi::{ApiClient, ApiResource, Handler, Outcome, RemoteEntity, ResourceKind};
use colored::Colorize;
use serde_json::Value;

use crate::Context;
use crate::config;
use crate::progress;
use crate::ui;

pub fn list(ctx: &Context, kind: ResourceKind) -> Result<()> {
    let config = config::load(ctx)?;
    let client = super::connect(&config.api)?;

    let pb = progress::spinner(&format!("Fetching {}...", kind.plural()));
    let entities = fetch(&client, kind);
    pb.finish_and_clear();
    let entities = entities?;

    ui::header(&format!("{} ({})", ui::capitalize(kind.plural()), entities.len()));
    if entities.is_empty() {
        ui::dim("none");
        return Ok(());
    }

    for entity in &entities {
        let status = match entity.body.get("enabled").and_then(Value::as_bool) {
            Some(false) => " (disabled)".yellow().to_string(),
            _ => String::new(),
        };
        println!("  {} {}{}", "•".cyan(), entity.name.bold(), status);
        if !entity.id.is_empty() {
            ui::dim(&format!("  id: {}", entity.id));
        }
        if ctx.verbose > 0 {
            let pretty = serde_json::to_string_pretty(&entity.body)?;
            for line in pretty.lines() {
                ui::dim(&format!("  {line}"));
            }
        }
    }
    Ok(())
}

pub fn delete(ctx: &Context, kind: ResourceKind, name: &str, yes: bool) -> Result<()> {
    let config = config::load(ctx)?;
    let client = super::connect(&config.api)?;

    if !yes {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!("Delete {kind} '{name}'?"))
            .default(false)
            .interact()?;
        if !confirmed {
            ui::info("Aborted");
            return Ok(());
        }
    }

    let pb = progress::spinner(&format!("Deleting {kind} '{name}'..."));
    match remove(&client, kind, name) {
        Ok(Outcome::Deleted) => progress::finish_success(&pb, &format!("Deleted {kind} '{name}'")),
        Ok(_) => {
            pb.finish_and_clear();
            ui::info(&format!("{kind} '{name}' does not exist, nothing to delete"));
        }
        Err(e) => {
            progress::finish_error(&pb, &format!("Could not delete {kind} '{name}'"));
            return Err(e);
        }
    }
    Ok(())
}

/// Every remote entity of `kind`
pub fn fetch(client: &ApiClient, kind: ResourceKind) -> Result<Vec<RemoteEntity>> {
    fn list_of<R: ApiResource>(client: &ApiClient) -> Result<Vec<RemoteEntity>> {
        Ok(Handler::<R>::new(client).list()?)
    }

    match kind {
        ResourceKind::Endpoint => list_of::<NotificationEndpoint>(client),
        ResourceKind::Route => list_of::<AlertRoute>(client),
        ResourceKind::AlertRule => list_of::<AlertRule>(client),
        ResourceKind::LogRule => list_of::<LogRule>(client),
        ResourceKind::ServiceCheck => list_of::<ServiceCheck>(client),
        ResourceKind::BackupConfig => list_of::<BackupConfig>(client),
    }
}

/// Delete the remote entity of `kind` named `name`, if there is one
pub fn remove(client: &ApiClient, kind: ResourceKind, name: &str) -> Result<Outcome> {
    fn delete_of<R: ApiResource>(client: &ApiClient, name: &str) -> Result<Outcome> {
        Ok(Handler::<R>::new(client).delete(name)?)
    }

    match kind {
        ResourceKind::Endpoint => delete_of::<NotificationEndpoint>(client, name),
        ResourceKind::Route => delete_of::<AlertRoute>(client, name),
        ResourceKind::AlertRule => delete_of::<AlertRule>(client, name),
        ResourceKind::LogRule => delete_of::<LogRule>(client, name),
        ResourceKind::ServiceCheck => delete_of::<ServiceCheck>(client, name),
        ResourceKind::BackupConfig => delete_of::<BackupConfig>(client, name),
    }
}
