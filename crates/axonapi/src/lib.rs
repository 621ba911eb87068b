//! # axonapi
//!
//! Client for the AxonOps REST API and typed models for the alerting objects
//! it manages.
//!
//! This crate provides:
//! - [`ApiClient`]: one `request(method, path, body)` call returning a uniform
//!   [`ApiResponse`] (`code`, `body`, `success`), never an error
//! - [`Handler`]: list/find/create/update/delete by name for any entity kind
//! - [`models`]: alert rules, notification endpoints, alert routes, log rules,
//!   service checks and backup configs
//! - [`MockTransport`]: an in-memory AxonOps server for tests
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use axonapi::models::{AlertRule, Condition};
//! use axonapi::{ApiClient, ApiSettings, Handler, UreqTransport};
//!
//! let settings = ApiSettings {
//!     api_key: Some("my-key".into()),
//!     organization: Some("my-org".into()),
//!     ..Default::default()
//! };
//! let client = ApiClient::from_settings(&settings, Arc::new(UreqTransport::new()))?;
//!
//! let rules = Handler::<AlertRule>::new(&client);
//! rules.update(&AlertRule::new("high_cpu", "cpu_usage", Condition::Above, 95.0))?;
//! # Ok::<(), axonapi::Error>(())
//! ```
//!
//! ## Collections
//!
//! | Kind                  | Path                        |
//! |-----------------------|-----------------------------|
//! | notification endpoint | `/api/v1/alerts/endpoints`  |
//! | alert route           | `/api/v1/alerts/routes`     |
//! | alert rule            | `/api/v1/alerts/rules`      |
//! | log rule              | `/api/v1/logs/rules`        |
//! | service check         | `/api/v1/service-checks`    |
//! | backup config         | `/api/v1/backups/configs`   |

#![warn(clippy::all)]

pub mod client;
pub mod error;
pub mod handler;
pub mod kind;
pub mod models;
pub mod response;
pub mod settings;
pub mod transport;
pub mod validate;

pub use client::ApiClient;
pub use error::{Error, ErrorCategory, Result};
pub use handler::{ApiResource, Handler, Lookup, Outcome, RemoteEntity, is_subset};
pub use kind::ResourceKind;
pub use response::ApiResponse;
pub use settings::{ApiSettings, Credentials, DeploymentMode, ServerAddress};
pub use transport::http::UreqTransport;
pub use transport::{HttpRequest, Method, MockTransport, RawResponse, Transport};
