mod cli;
mod error;
mod event;

use crate::cli::{Cli, Command};
use crate::error::{ErrorKind, Result};
use crate::event::S3Event;
use clap::Parser;
use exn::{OptionExt, ResultExt};
use std::path::Path;
use std::sync::Arc;
use sublog_catalog::TableHandle;
use sublog_catalog::table::{DynamoTable, ReadOnlyTable, SqliteTable};
use sublog_config::{CatalogBackend, Config, Secrets, StorageBackendKind};
use sublog_meta::KeyLayout;
use sublog_notify::{NotifierHandle, NullNotifier, WebhookNotifier};
use sublog_reconcile::{ReconcileConfig, Reconciler, palette};
use sublog_storage::BackendHandle;
use sublog_storage::backend::{LocalBackend, S3Backend};
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run(cli).await.map_err(|err| miette::miette!("{err:?}"))
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Configuration)?;
    config.dry_run |= cli.dry_run;
    if config.dry_run {
        tracing::warn!("Dry run: the catalog will not be modified");
    }
    let reconciler = build(&config).await?;
    let layout = &reconciler.config().layout;

    match cli.command {
        Command::Sync => {
            let report = reconciler.sync().await.or_raise(|| ErrorKind::Reconcile)?;
            tracing::debug!(?report, "Sync report");
        },
        Command::Upsert { key } => {
            reconciler.upsert(layout.resolve(&key)).await.or_raise(|| ErrorKind::Reconcile)?;
        },
        Command::Delete { key } => {
            reconciler.delete(layout.resolve(&key)).await.or_raise(|| ErrorKind::Reconcile)?;
        },
        Command::Event { file } => {
            let payload = read_input(file.as_deref()).await?;
            let event = S3Event::from_slice(&payload)?;
            tracing::info!(records = event.records.len(), "Processing object notification");
            event::dispatch(&reconciler, &event).await?;
        },
    }
    Ok(())
}

/// Resolve secrets and wire up the collaborators.
///
/// Everything here happens before the first read of storage or the catalog.
async fn build(config: &Config) -> Result<Reconciler> {
    let sdk_config = sublog_config::load_sdk_config(&config.aws).await;
    let store = sublog_config::secret_store(&config.secrets, &sdk_config);
    let secrets = Secrets::resolve(config, store.as_ref()).await.or_raise(|| ErrorKind::Configuration)?;
    tracing::debug!(?secrets, "Resolved secrets");

    let backend: BackendHandle = match config.storage.backend {
        StorageBackendKind::S3 => {
            let bucket = secrets.bucket.clone().ok_or_raise(|| ErrorKind::Configuration)?;
            let prefix = config.storage.prefix.clone();
            let backend = S3Backend::new("assets", &sdk_config, bucket, prefix, config.storage.force_path_style)
                .or_raise(|| ErrorKind::Configuration)?;
            Arc::new(backend)
        },
        StorageBackendKind::Local => {
            let root = config.storage.root.as_ref().ok_or_raise(|| ErrorKind::Configuration)?;
            Arc::new(LocalBackend::new("local", root).or_raise(|| ErrorKind::Configuration)?)
        },
    };

    let catalog = &config.catalog;
    let table: TableHandle = match catalog.backend {
        CatalogBackend::DynamoDb => Arc::new(DynamoTable::new(
            &sdk_config,
            &catalog.table,
            &catalog.file_name_index,
            &catalog.media_index,
        )),
        CatalogBackend::Sqlite => {
            let path = catalog.sqlite_path().or_raise(|| ErrorKind::Configuration)?;
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await.or_raise(|| ErrorKind::Configuration)?;
            }
            Arc::new(SqliteTable::connect(&path).await.or_raise(|| ErrorKind::Configuration)?)
        },
    };
    let table: TableHandle = match config.dry_run {
        true => Arc::new(ReadOnlyTable::new(table)),
        false => table,
    };

    let notifier: NotifierHandle = match &secrets.webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(url).or_raise(|| ErrorKind::Configuration)?),
        None => Arc::new(NullNotifier),
    };

    let options = &config.reconcile;
    let reconcile_config = ReconcileConfig {
        media: options.media.clone(),
        layout: KeyLayout::new(&options.key_prefix, &options.key_suffix),
        palette: options.palette.clone().unwrap_or_else(palette::default_palette),
        source: config.notify.source.clone(),
    };
    tracing::info!(
        storage = backend.name(),
        catalog = table.name(),
        media = %reconcile_config.media,
        "Reconciler ready"
    );
    Ok(Reconciler::new(backend, table, notifier, reconcile_config))
}

async fn read_input(file: Option<&Path>) -> Result<Vec<u8>> {
    match file {
        Some(path) => tokio::fs::read(path).await.or_raise(|| ErrorKind::InvalidEvent),
        None => {
            let mut payload = Vec::new();
            tokio::io::stdin().read_to_end(&mut payload).await.or_raise(|| ErrorKind::InvalidEvent)?;
            Ok(payload)
        },
    }
}
