use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::constants::DEFAULT_CONFIG_NAME;

/// Command-line arguments for the ufile-upload tool.
///
/// Global options override values from the configuration file; the
/// subcommand selects what to do with the resulting configuration.
#[derive(Parser, Debug)]
#[clap(name = "ufile-upload", about = "Upload files to a UCloud UFile bucket")]
pub struct Args {
    /// Path to configuration file (YAML, or JSON with a .json extension)
    #[clap(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Bucket to upload into, overriding the configured one
    #[clap(short, long)]
    pub bucket: Option<String>,

    /// Maximum number of parts uploaded at the same time
    #[clap(long)]
    pub concurrency: Option<usize>,

    /// Verbose logging
    #[clap(short, long)]
    pub verbose: bool,

    /// Subcommands
    #[clap(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload a local file
    Upload {
        /// File to upload
        file: PathBuf,

        /// Object key (default: the file name)
        #[clap(short, long)]
        key: Option<String>,
    },

    /// Create a template configuration file
    InitConfig {
        /// Path to output configuration file
        #[clap(default_value = DEFAULT_CONFIG_NAME)]
        path: PathBuf,
    },

    /// Print the signature and Authorization header for a request
    Sign {
        /// HTTP method
        #[clap(short, long, default_value = "PUT")]
        method: String,

        /// Content-Type of the request
        #[clap(short = 't', long, default_value = "application/octet-stream")]
        content_type: String,

        /// Object key
        #[clap(short, long)]
        key: String,
    },

    /// Print the effective configuration with secrets redacted
    ShowConfig,
}
