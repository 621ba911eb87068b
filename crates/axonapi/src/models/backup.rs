//! Scheduled backup configurations.

use super::split_tagged;
use crate::error::{Error, Result};
use crate::handler::ApiResource;
use crate::kind::ResourceKind;
use crate::validate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_storage_class() -> String {
    "STANDARD".to_string()
}

fn default_acl() -> String {
    "private".to_string()
}

fn default_encryption() -> String {
    "AES256".to_string()
}

fn default_sftp_port() -> u16 {
    22
}

/// Where backups are written, tagged by `backup_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backup_type", rename_all = "snake_case")]
pub enum BackupTarget {
    Local,
    S3 {
        #[serde(default = "default_region")]
        region: String,
        #[serde(default)]
        access_key_id: Option<String>,
        #[serde(default)]
        secret_access_key: Option<String>,
        #[serde(default = "default_storage_class")]
        storage_class: String,
        #[serde(default = "default_acl")]
        acl: String,
        #[serde(default = "default_encryption")]
        encryption: String,
    },
    Azure {
        account: String,
        #[serde(default)]
        key: Option<String>,
        #[serde(default)]
        use_msi: bool,
        #[serde(default)]
        msi_client_id: Option<String>,
    },
    Gcs {
        bucket: String,
        #[serde(default)]
        service_account_file: Option<String>,
    },
    Sftp {
        host: String,
        #[serde(default = "default_sftp_port")]
        port: u16,
        user: String,
        #[serde(default)]
        password: Option<String>,
        #[serde(default)]
        key_file: Option<String>,
    },
}

impl BackupTarget {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::S3 { .. } => "s3",
            Self::Azure { .. } => "azure",
            Self::Gcs { .. } => "gcs",
            Self::Sftp { .. } => "sftp",
        }
    }

    fn check(&self) -> std::result::Result<(), String> {
        match self {
            Self::Local => Ok(()),
            Self::S3 {
                access_key_id,
                secret_access_key,
                ..
            } => match (access_key_id, secret_access_key) {
                (Some(_), None) | (None, Some(_)) => Err(
                    "access_key_id and secret_access_key must be set together".to_string(),
                ),
                _ => Ok(()),
            },
            Self::Azure {
                account,
                key,
                use_msi,
                ..
            } => {
                validate::required("account", account)?;
                if key.is_none() && !use_msi {
                    return Err("azure needs either key or use_msi = true".to_string());
                }
                Ok(())
            }
            Self::Gcs { bucket, .. } => validate::required("bucket", bucket),
            Self::Sftp {
                host,
                port,
                user,
                password,
                key_file,
            } => {
                validate::required("host", host)?;
                validate::required("user", user)?;
                if *port == 0 {
                    return Err("port must be > 0".to_string());
                }
                if password.is_none() && key_file.is_none() {
                    return Err("sftp needs either password or key_file".to_string());
                }
                Ok(())
            }
        }
    }
}

/// A named backup schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupConfig {
    pub name: String,
    /// Five-field cron expression.
    pub schedule: String,
    /// Days to keep each backup.
    pub retention: u32,
    /// Bucket, container or directory the backups land in.
    pub destination: String,
    #[serde(default)]
    pub keyspaces: Vec<String>,
    #[serde(default)]
    pub datacenters: Vec<String>,
    #[serde(default)]
    pub full_backup: bool,
    pub config: BackupTarget,
}

impl ApiResource for BackupConfig {
    const KIND: ResourceKind = ResourceKind::BackupConfig;

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Error::invalid(Self::KIND, &self.name, msg);

        validate::required("name", &self.name).map_err(invalid)?;
        validate::cron("schedule", &self.schedule).map_err(invalid)?;
        if self.retention == 0 {
            return Err(invalid("retention must be > 0".to_string()));
        }
        validate::required("destination", &self.destination).map_err(invalid)?;
        self.config.check().map_err(invalid)
    }

    fn create_body(&self) -> Value {
        let (backup_type, config) = split_tagged(&self.config, "backup_type");
        json!({
            "name": self.name,
            "backup_type": backup_type,
            "schedule": self.schedule,
            "retention": self.retention,
            "destination": self.destination,
            "keyspaces": self.keyspaces,
            "datacenters": self.datacenters,
            "full_backup": self.full_backup,
            "config": config,
        })
    }

    fn summary(&self) -> String {
        format!(
            "{} to {} at '{}', keep {}d",
            self.config.type_name(),
            self.destination,
            self.schedule,
            self.retention
        )
    }
}
