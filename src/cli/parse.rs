//! CLI parse: clap types for dim. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// dim - Data-file dependency manager
#[derive(Parser, Debug)]
#[command(name = "dim")]
#[command(version)]
#[command(about = "Install, update and track remote data files through a manifest and lock file")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project root directory
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (sets level to debug)
    #[arg(long, global = true, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, global = true, default_value = "false", conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the data directory, manifest and lock file
    Init {
        /// Reset existing manifest and lock file to empty documents
        #[arg(long)]
        force: bool,
    },
    /// Install one URL, or everything in the manifest that is not installed yet
    Install {
        /// URL to install (omit to install from the manifest)
        url: Option<String>,
        /// Preprocess directive applied after download (repeatable), e.g. encoding-utf-8
        #[arg(short = 'p', long = "preprocess")]
        preprocess: Vec<String>,
    },
    /// Remove a URL from the manifest and lock file and delete its file
    Uninstall {
        /// URL to remove
        url: String,
    },
    /// Re-download one URL, or everything in the manifest
    Update {
        /// URL to update (omit to update every manifest entry)
        url: Option<String>,
        /// Preprocess directive applied after download (repeatable)
        #[arg(short = 'p', long = "preprocess")]
        preprocess: Vec<String>,
    },
    /// List installed contents
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
    /// Compare the manifest, the lock file and the data directory
    Status {
        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
}
