use crate::error::{ErrorKind, Result};
use crate::{Config, SecretsConfig, StorageBackendKind};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_secretsmanager::{Client, error::DisplayErrorContext};
use exn::{OptionExt, ResultExt};
use std::collections::HashMap;
use std::sync::Arc;

/// Source of named secrets, each a flat map of string keys to values.
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn get_secret(&self, name: &str) -> Result<HashMap<String, String>>;

    /// Fetch one key of one secret.
    async fn get_value(&self, name: &str, key: &str) -> Result<String> {
        let mut secret = self.get_secret(name).await?;
        secret
            .remove(key)
            .ok_or_raise(|| ErrorKind::MissingSecretKey { secret: name.to_string(), key: key.to_string() })
    }
}

/// AWS Secrets Manager, with secrets stored as JSON objects of strings.
#[derive(Debug, Clone)]
pub struct SecretsManagerStore {
    client: Client,
}

impl SecretsManagerStore {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self::from_client(Client::new(sdk_config))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

fn parse_secret(name: &str, secret_string: &str) -> Result<HashMap<String, String>> {
    serde_json::from_str(secret_string).or_raise(|| ErrorKind::InvalidSecret(name.to_string()))
}

#[async_trait]
impl SecretStore for SecretsManagerStore {
    async fn get_secret(&self, name: &str) -> Result<HashMap<String, String>> {
        let output = self.client.get_secret_value().secret_id(name).send().await.map_err(|err| {
            tracing::error!(secret = name, error = %DisplayErrorContext(&err), "Failed to fetch secret");
            ErrorKind::SecretUnavailable(name.to_string())
        })?;
        let secret_string = output.secret_string().ok_or_raise(|| ErrorKind::InvalidSecret(name.to_string()))?;
        parse_secret(name, secret_string)
    }
}

/// Secrets served from configuration, for local runs and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticSecrets {
    values: HashMap<String, HashMap<String, String>>,
}

impl StaticSecrets {
    pub fn new(values: HashMap<String, HashMap<String, String>>) -> Self {
        Self { values }
    }
}

#[async_trait]
impl SecretStore for StaticSecrets {
    async fn get_secret(&self, name: &str) -> Result<HashMap<String, String>> {
        self.values.get(name).cloned().ok_or_raise(|| ErrorKind::SecretUnavailable(name.to_string()))
    }
}

/// Secret values needed by one invocation, resolved up front so a missing
/// secret fails before anything is written.
#[derive(Clone, PartialEq, Eq)]
pub struct Secrets {
    /// `None` when notifications are disabled.
    pub webhook_url: Option<String>,
    /// `None` unless the S3 backend needs it.
    pub bucket: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("webhook_url", &self.webhook_url.as_ref().map(|_| "<redacted>"))
            .field("bucket", &self.bucket)
            .finish()
    }
}

impl Secrets {
    pub async fn resolve(config: &Config, store: &dyn SecretStore) -> Result<Self> {
        let SecretsConfig { webhook_secret, webhook_key, bucket_secret, bucket_key, .. } = &config.secrets;
        let webhook_url = match config.notify.enabled && !config.dry_run {
            true => Some(store.get_value(webhook_secret, webhook_key).await?),
            false => None,
        };
        let bucket = match (config.storage.backend, &config.storage.bucket) {
            (StorageBackendKind::S3, Some(bucket)) => Some(bucket.clone()),
            (StorageBackendKind::S3, None) => Some(store.get_value(bucket_secret, bucket_key).await?),
            (StorageBackendKind::Local, _) => None,
        };
        Ok(Self { webhook_url, bucket })
    }
}

/// Build the secret store selected by the configuration.
pub fn secret_store(config: &SecretsConfig, sdk_config: &SdkConfig) -> Arc<dyn SecretStore> {
    match config.backend {
        crate::SecretsBackend::Aws => Arc::new(SecretsManagerStore::new(sdk_config)),
        crate::SecretsBackend::Static => Arc::new(StaticSecrets::new(config.values.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_secretsmanager::operation::get_secret_value::{GetSecretValueError, GetSecretValueOutput};
    use aws_sdk_secretsmanager::types::error::ResourceNotFoundException;
    use aws_smithy_mocks::{mock, mock_client};
    use rstest::rstest;

    fn static_store() -> StaticSecrets {
        StaticSecrets::new(HashMap::from([
            (
                "sublog_discord_url".to_string(),
                HashMap::from([("url".to_string(), "https://example.com/hook".to_string())]),
            ),
            (
                "sublog_assets_bucket_name".to_string(),
                HashMap::from([("name".to_string(), "sublog-assets".to_string())]),
            ),
        ]))
    }

    #[rstest]
    #[case(r#"{"url": "https://example.com/hook"}"#, true)]
    #[case(r#"{"url": 42}"#, false)]
    #[case(r#"["https://example.com/hook"]"#, false)]
    #[case("https://example.com/hook", false)]
    fn test_parse_secret(#[case] secret_string: &str, #[case] valid: bool) {
        assert_eq!(parse_secret("sublog_discord_url", secret_string).is_ok(), valid);
    }

    #[tokio::test]
    async fn test_secrets_manager_store() {
        let rule = mock!(Client::get_secret_value)
            .match_requests(|req| req.secret_id() == Some("sublog_discord_url"))
            .then_output(|| GetSecretValueOutput::builder().secret_string(r#"{"url": "https://example.com/hook"}"#).build());
        let client = mock_client!(aws_sdk_secretsmanager, [&rule]);
        let store = SecretsManagerStore::from_client(client);
        assert_eq!(store.get_value("sublog_discord_url", "url").await.unwrap(), "https://example.com/hook");
    }

    #[tokio::test]
    async fn test_secrets_manager_missing_secret() {
        let rule = mock!(Client::get_secret_value)
            .then_error(|| GetSecretValueError::ResourceNotFoundException(ResourceNotFoundException::builder().build()));
        let client = mock_client!(aws_sdk_secretsmanager, [&rule]);
        let store = SecretsManagerStore::from_client(client);
        let err = store.get_secret("sublog_discord_url").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::SecretUnavailable(_)));
    }

    #[tokio::test]
    async fn test_missing_key() {
        let err = static_store().get_value("sublog_discord_url", "webhook").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::MissingSecretKey { key, .. } if key == "webhook"));
    }

    #[tokio::test]
    async fn test_resolve_production_defaults() {
        let secrets = Secrets::resolve(&Config::default(), &static_store()).await.unwrap();
        assert_eq!(secrets.webhook_url.as_deref(), Some("https://example.com/hook"));
        assert_eq!(secrets.bucket.as_deref(), Some("sublog-assets"));
    }

    #[tokio::test]
    async fn test_resolve_skips_unneeded_secrets() {
        let mut config = Config::default();
        config.dry_run = true;
        config.storage.bucket = Some("configured".to_string());
        let secrets = Secrets::resolve(&config, &StaticSecrets::default()).await.unwrap();
        assert_eq!(secrets, Secrets { webhook_url: None, bucket: Some("configured".to_string()) });
    }
}
