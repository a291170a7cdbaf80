use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const APPLICATION: &str = "sublog";
const CONFIG_FILE: &str = "sublog.toml";
const ENV_PREFIX: &str = "SUBLOG_";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub catalog: CatalogConfig,
    pub aws: AwsConfig,
    pub secrets: SecretsConfig,
    pub notify: NotifyConfig,
    pub reconcile: ReconcileOptions,
    /// Read everything, write nothing, notify nobody.
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
    #[default]
    S3,
    Local,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackendKind,
    /// Bucket name. When unset, it is read from the bucket secret.
    pub bucket: Option<String>,
    /// Key prefix inside the bucket, below which `meta/` lives.
    pub prefix: Option<String>,
    /// Path-style addressing, for S3-compatible services.
    pub force_path_style: bool,
    /// Directory standing in for the bucket with the local backend.
    pub root: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogBackend {
    #[default]
    DynamoDb,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub backend: CatalogBackend,
    pub table: String,
    pub file_name_index: String,
    pub media_index: String,
    /// Database file for the SQLite backend. Defaults to the platform data
    /// directory.
    pub sqlite_path: Option<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            backend: CatalogBackend::default(),
            table: "sublog".to_string(),
            file_name_index: "fileName-index".to_string(),
            media_index: "media-createdAt-index".to_string(),
            sqlite_path: None,
        }
    }
}

impl CatalogConfig {
    pub fn sqlite_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.sqlite_path {
            return Ok(path.clone());
        }
        let Some(dirs) = ProjectDirs::from("", "", APPLICATION) else {
            exn::bail!(ErrorKind::MissingSetting("catalog.sqlite_path"));
        };
        Ok(dirs.data_dir().join("catalog.sqlite"))
    }
}

/// Overrides for the AWS SDK. Anything unset falls back to the SDK's default
/// provider chain (environment, profile, instance metadata).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsConfig {
    pub region: Option<String>,
    /// Custom endpoint, e.g. LocalStack.
    pub endpoint: Option<String>,
    pub key_id: Option<String>,
    pub key_secret: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretsBackend {
    #[default]
    Aws,
    Static,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretsConfig {
    pub backend: SecretsBackend,
    pub webhook_secret: String,
    pub webhook_key: String,
    pub bucket_secret: String,
    pub bucket_key: String,
    /// Secret name to key/value map, served by the static backend.
    pub values: HashMap<String, HashMap<String, String>>,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            backend: SecretsBackend::default(),
            webhook_secret: "sublog_discord_url".to_string(),
            webhook_key: "url".to_string(),
            bucket_secret: "sublog_assets_bucket_name".to_string(),
            bucket_key: "name".to_string(),
            values: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub enabled: bool,
    /// Sender name shown in every message.
    pub source: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self { enabled: true, source: APPLICATION.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileOptions {
    /// Discriminator written to every record and used to list the catalog.
    pub media: String,
    pub key_prefix: String,
    pub key_suffix: String,
    /// Accent colours to pick from. Unset means the built-in palette.
    pub palette: Option<Vec<String>>,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            media: APPLICATION.to_string(),
            key_prefix: "meta/".to_string(),
            key_suffix: ".toml".to_string(),
            palette: None,
        }
    }
}

impl Config {
    /// Load the configuration from every layer.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let user_file = ProjectDirs::from("", "", APPLICATION).map(|dirs| dirs.config_dir().join(CONFIG_FILE));
        let config: Self = Self::figment(user_file.as_deref(), explicit)?.extract().or_raise(|| ErrorKind::Invalid)?;
        tracing::debug!(
            storage = ?config.storage.backend,
            catalog = ?config.catalog.backend,
            dry_run = config.dry_run,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Build the layered provider.
    ///
    /// A missing user file is skipped; a missing explicit file is an error.
    pub fn figment(user_file: Option<&Path>, explicit: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = user_file {
            figment = figment.merge(Toml::file(path));
        }
        if let Some(path) = explicit {
            if !path.is_file() {
                exn::bail!(ErrorKind::MissingFile(path.to_path_buf()));
            }
            figment = match path.extension().and_then(|e| e.to_str()) {
                Some("toml") => figment.merge(Toml::file(path)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
                Some("json") => figment.merge(Json::file(path)),
                _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }
}
