use anyhow::{Context as _, Result, bail};
use std::path::{Path, PathBuf};

use crate::Context;
use crate::cli::ApiOverrides;
use crate::schema::AxonConfig;

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("axonctl"))
}

/// Default config file location
pub fn default_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Expand `~` in a user-supplied path
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::tilde(&raw);
    PathBuf::from(expanded.as_ref())
}

/// Load, override and validate the configuration for a command
pub fn load(ctx: &Context) -> Result<AxonConfig> {
    let mut config = read(ctx.config.as_deref())?;
    apply_overrides(&mut config, &ctx.api);
    config.validate()?;
    Ok(config)
}

/// Read the config file.
///
/// An explicit path must exist. A missing default file yields an empty
/// config, so connection settings can come from flags or the environment.
pub fn read(explicit: Option<&Path>) -> Result<AxonConfig> {
    match explicit {
        Some(path) => {
            let path = expand_path(path);
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            AxonConfig::from_file(&path)
        }
        None => {
            let path = default_path()?;
            if !path.exists() {
                log::debug!("No config at {}, using defaults", path.display());
                return Ok(AxonConfig::default());
            }
            AxonConfig::from_file(&path)
        }
    }
}

/// Command-line and environment values win over the `[api]` table.
///
/// An API key, token or username given here replaces every credential from
/// the file, so it is used even where the file's would take precedence.
pub fn apply_overrides(config: &mut AxonConfig, overrides: &ApiOverrides) {
    let api = &mut config.api;
    if overrides.api_key.is_some() || overrides.token.is_some() || overrides.username.is_some() {
        log::debug!("Credentials from flags or environment replace those in the config file");
        api.api_key = None;
        api.token = None;
        api.username = None;
    }
    let pairs = [
        (&mut api.base_url, &overrides.url),
        (&mut api.api_key, &overrides.api_key),
        (&mut api.organization, &overrides.org),
        (&mut api.token, &overrides.token),
        (&mut api.username, &overrides.username),
        (&mut api.password, &overrides.password),
    ];
    for (field, value) in pairs {
        if let Some(value) = value {
            *field = Some(value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axonapi::Credentials;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_path_must_exist() {
        let dir = TempDir::new().unwrap();
        let err = read(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_read_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("axon.toml");
        std::fs::write(&path, "[api]\napi_key = \"from-file\"\n").unwrap();

        let config = read(Some(&path)).unwrap();
        assert_eq!(config.api.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_overrides_win() {
        let mut config = AxonConfig::parse(
            "[api]\napi_key = \"from-file\"\norganization = \"file-org\"\n",
        )
        .unwrap();
        let overrides = ApiOverrides {
            api_key: Some("from-flag".to_string()),
            url: Some("http://localhost:8080/".to_string()),
            ..Default::default()
        };

        apply_overrides(&mut config, &overrides);

        assert_eq!(config.api.api_key.as_deref(), Some("from-flag"));
        assert_eq!(config.api.organization.as_deref(), Some("file-org"));
        assert_eq!(config.api.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_token_override_replaces_file_api_key() {
        let mut config =
            AxonConfig::parse("[api]\napi_key = \"from-file\"\nusername = \"ops\"\n").unwrap();
        let overrides = ApiOverrides {
            token: Some("from-env".to_string()),
            ..Default::default()
        };

        apply_overrides(&mut config, &overrides);

        assert_eq!(config.api.api_key, None);
        assert_eq!(config.api.username, None);
        assert_eq!(
            config.api.credentials().unwrap(),
            Credentials::Bearer("from-env".to_string())
        );
    }

    #[test]
    fn test_org_override_keeps_file_credentials() {
        let mut config = AxonConfig::parse("[api]\napi_key = \"from-file\"\n").unwrap();
        let overrides = ApiOverrides {
            org: Some("acme".to_string()),
            ..Default::default()
        };

        apply_overrides(&mut config, &overrides);

        assert_eq!(config.api.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_expand_tilde() {
        let expanded = expand_path(Path::new("~/axon.toml"));
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.ends_with("axon.toml"));
    }
}
