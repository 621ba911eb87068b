use anyhow::Result;
use axonapi::{ApiSettings, Credentials};

use crate::Context;
use crate::config;
use crate::schema::AxonConfig;
use crate::ui;

pub fn run(ctx: &Context) -> Result<()> {
    ui::header("Configuration Check");

    let config = config::load(ctx)?;

    ui::section("API");
    ui::kv("URL", &config.api.base_url());
    ui::kv("Organization", config.api.organization().unwrap_or("(none)"));
    ui::kv("Auth", &auth_label(&config.api)?);

    ui::section("Resources");
    for (kind, declared) in counts(&config) {
        ui::kv(kind, &declared.to_string());
    }

    println!();
    ui::success(&format!(
        "Configuration is valid ({} resources declared)",
        config.total_declared()
    ));
    Ok(())
}

/// Authentication scheme, without revealing secrets
fn auth_label(settings: &ApiSettings) -> Result<String> {
    Ok(match settings.credentials()? {
        Credentials::ApiKey(_) => "API key".to_string(),
        Credentials::Bearer(_) => "bearer token".to_string(),
        Credentials::Login { username, .. } => format!("login as {username}"),
        Credentials::Anonymous => "none".to_string(),
    })
}

fn counts(config: &AxonConfig) -> [(&'static str, usize); 6] {
    [
        ("endpoints", config.endpoints.len()),
        ("routes", config.routes.len()),
        ("alert_rules", config.alert_rules.len()),
        ("log_rules", config.log_rules.len()),
        ("service_checks", config.service_checks.len()),
        ("backups", config.backups.len()),
    ]
}
