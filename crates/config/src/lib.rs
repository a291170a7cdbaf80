//! Configuration loading for sublog.
//!
//! Settings are resolved once per invocation from layered sources (later
//! layers win):
//! 1. built-in defaults, matching the production deployment;
//! 2. `sublog.toml` in the platform configuration directory;
//! 3. an explicit file passed on the command line (TOML, YAML or JSON);
//! 4. `SUBLOG_` environment variables, with `__` separating sections
//!    (`SUBLOG_STORAGE__BACKEND=local`).
//!
//! Credentials never live in the configuration itself: the webhook URL and
//! the bucket name are fetched from a [`SecretStore`].

mod aws;
mod config;
pub mod error;
mod secrets;

pub use crate::aws::load_sdk_config;
pub use crate::config::{
    AwsConfig, CatalogBackend, CatalogConfig, Config, NotifyConfig, ReconcileOptions, SecretsBackend, SecretsConfig,
    StorageBackendKind, StorageConfig,
};
pub use crate::secrets::{SecretStore, Secrets, SecretsManagerStore, StaticSecrets, secret_store};
