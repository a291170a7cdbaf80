//! S3-compatible storage backend.
//!
//! Holds the published metadata files. Object keys map one-to-one onto
//! storage paths, optionally below a configured key prefix.
//!
//! # Credentials
//!
//! The backend is built from a shared [`SdkConfig`], so credentials, region
//! and endpoint come from whatever produced that config (the default
//! provider chain inside Lambda, explicit keys for local runs).

use crate::{
    FileInfo, StorageBackend,
    backend::FileInfoStream,
    error::{ErrorKind, Result},
    models::key_of,
    validate_path,
};
use async_stream::stream;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::{Client, error::DisplayErrorContext, primitives::DateTime, types::Object};
use exn::{OptionExt, ResultExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Generous default for concurrent S3 requests.
const DEFAULT_CONCURRENT_REQUESTS: usize = 100;

/// S3-compatible storage backend.
///
/// # Examples
///
/// ```no_run
/// use sublog_storage::backend::S3Backend;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
/// let backend = S3Backend::new("assets", &sdk_config, "sublog-assets", None, false)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct S3Backend {
    name: String,
    client: Client,
    bucket: String,
    prefix: Option<String>,
    /// Rate limiter for concurrent S3 requests.
    rate_limiter: Arc<Semaphore>,
}

impl S3Backend {
    /// Create a new S3 storage backend.
    ///
    /// # Arguments
    /// * `name` - A name for this backend (used in logging)
    /// * `sdk_config` - Shared AWS configuration (region, credentials, endpoint)
    /// * `bucket` - S3 bucket name
    /// * `prefix` - Optional key prefix (acts as virtual directory)
    /// * `force_path_style` - Path-style addressing, for S3-compatible services (MinIO, LocalStack)
    pub fn new(
        name: impl Into<String>,
        sdk_config: &SdkConfig,
        bucket: impl Into<String>,
        prefix: Option<String>,
        force_path_style: bool,
    ) -> Result<Self> {
        let config = aws_sdk_s3::config::Builder::from(sdk_config).force_path_style(force_path_style).build();
        Self::from_client(name, Client::from_conf(config), bucket, prefix)
    }

    /// Wrap an already configured client.
    pub fn from_client(
        name: impl Into<String>,
        client: Client,
        bucket: impl Into<String>,
        prefix: Option<String>,
    ) -> Result<Self> {
        let prefix = prefix
            .map(validate_path)
            .transpose()?
            .map(|p| p.to_str().map(|s| s.to_string()).ok_or_raise(|| ErrorKind::InvalidPath(p)))
            .transpose()?;
        Ok(Self {
            name: name.into(),
            client,
            bucket: bucket.into(),
            prefix,
            rate_limiter: Arc::new(Semaphore::new(DEFAULT_CONCURRENT_REQUESTS)),
        })
    }

    /// Construct the full S3 key from a relative path.
    fn full_key(&self, path: &Path) -> Result<String> {
        let relative = key_of(&validate_path(path)?);
        Ok(match &self.prefix {
            Some(prefix) => format!("{prefix}/{relative}"),
            None => relative,
        })
    }

    /// Strip the configured prefix from an S3 key to get relative path.
    fn relative_path(&self, key: &str) -> Result<PathBuf> {
        let relative = match &self.prefix {
            Some(prefix) => key.strip_prefix(prefix.as_str()).and_then(|s| s.strip_prefix('/')).unwrap_or(key),
            None => key,
        };
        validate_path(relative)
    }

    /// Acquire a rate limiter permit before making an S3 API call.
    async fn acquire_permit(&self) -> Result<OwnedSemaphorePermit> {
        self.rate_limiter
            .clone()
            .acquire_owned()
            .await
            .or_raise(|| ErrorKind::BackendError("S3 rate limiter closed".to_string()))
    }

    /// Convert AWS DateTime to OffsetDateTime.
    fn parse_datetime(dt: &DateTime) -> Result<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp_nanos(dt.as_nanos())
            .or_raise(|| ErrorKind::BackendError("S3 datetime out of range".to_string()))
    }

    fn object_info(&self, object: &Object) -> Result<FileInfo> {
        let key = object.key().ok_or_raise(|| ErrorKind::BackendError("listed object without key".to_string()))?;
        let size = object.size().and_then(|s| u64::try_from(s).ok()).unwrap_or_default();
        let modified = match object.last_modified() {
            Some(dt) => Self::parse_datetime(dt)?,
            None => OffsetDateTime::UNIX_EPOCH,
        };
        Ok(FileInfo::new(self.relative_path(key)?, size, modified))
    }

    fn network(err: impl std::error::Error) -> ErrorKind {
        ErrorKind::Network(DisplayErrorContext(err).to_string())
    }
}

#[async_trait]
impl StorageBackend for S3Backend {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_stream<'a>(&'a self, prefix: Option<&'a Path>) -> FileInfoStream<'a> {
        // Trailing slash makes the S3 prefix match whole path components,
        // like the other backends.
        let list_prefix = match prefix {
            Some(p) => self.full_key(p).map(Some),
            None => Ok(self.prefix.clone()),
        };
        Box::pin(stream! {
            match list_prefix {
                Err(e) => yield Err(e),
                Ok(list_prefix) => {
                    let mut pages = self
                        .client
                        .list_objects_v2()
                        .bucket(&self.bucket)
                        .set_prefix(list_prefix.map(|p| format!("{p}/")))
                        .into_paginator()
                        .send();
                    loop {
                        let permit = match self.acquire_permit().await {
                            Ok(permit) => permit,
                            Err(err) => {
                                yield Err(err);
                                break;
                            },
                        };
                        let page = pages.next().await;
                        drop(permit);
                        let page = match page {
                            None => break,
                            Some(Ok(page)) => page,
                            Some(Err(err)) => {
                                yield Err(exn::Exn::from(Self::network(err)));
                                break;
                            },
                        };
                        for object in page.contents() {
                            yield self.object_info(object);
                        }
                    }
                },
            }
        })
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let key = self.full_key(path)?;
        let _permit = self.acquire_permit().await?;
        let output = match self.client.get_object().bucket(&self.bucket).key(&key).send().await {
            Ok(output) => output,
            Err(err) if err.as_service_error().is_some_and(|e| e.is_no_such_key()) => {
                exn::bail!(ErrorKind::NotFound(path.to_path_buf()))
            },
            Err(err) => exn::bail!(Self::network(err)),
        };
        let body = output.body.collect().await.map_err(Self::network)?;
        tracing::debug!(bucket = %self.bucket, key = %key, "Fetched object");
        Ok(body.into_bytes().to_vec())
    }
}
