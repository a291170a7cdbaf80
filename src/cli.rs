use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Keep the blog catalog in step with the metadata files in object storage.
#[derive(Debug, Parser)]
#[command(name = "sublog", version, about)]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, global = true, env = "SUBLOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Read everything, write nothing, send no notifications
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Reconcile every metadata file with the catalog
    Sync,
    /// Create or update the catalog record of one metadata file
    Upsert {
        /// Object key (`meta/post-1.toml`) or bare file name (`post-1`)
        key: String,
    },
    /// Delete the catalog record of a removed metadata file
    Delete {
        /// Object key (`meta/post-1.toml`) or bare file name (`post-1`)
        key: String,
    },
    /// Process an S3 object notification
    Event {
        /// JSON payload; read from stdin when omitted
        file: Option<PathBuf>,
    },
}
