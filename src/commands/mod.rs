// Declarative commands
pub mod apply;

// Direct operations on remote entities
pub mod remote;

// Offline validation
pub mod check;

use anyhow::{Context as _, Result};
use axonapi::{ApiClient, ApiSettings, UreqTransport};
use std::sync::Arc;

/// Build the API client for a command, logging in when configured to
pub fn connect(settings: &ApiSettings) -> Result<Arc<ApiClient>> {
    log::debug!("Connecting to {}", settings.base_url());
    let client = ApiClient::from_settings(settings, Arc::new(UreqTransport::new()))
        .with_context(|| format!("Could not connect to {}", settings.base_url()))?;
    Ok(Arc::new(client))
}
