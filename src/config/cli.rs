use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "registry-s3-store")]
#[command(about = "Store and fetch registry package tarballs in object storage")]
pub struct CliConfig {
    /// Path to a TOML configuration file. Falls back to environment variables.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Upload a file, streaming it from disk
    Upload {
        file: PathBuf,
        #[arg(short, long)]
        key: String,
    },
    /// Read a file into memory and upload it as a gzip buffer
    UploadBuffer {
        file: PathBuf,
        #[arg(short, long)]
        key: String,
    },
    /// Download an object to a local path
    Download { key: String, dest: PathBuf },
    /// Delete an object
    Remove { key: String },
    /// Print the storage path a key maps to
    Path { key: String },
    /// Load and validate the configuration
    CheckConfig,
}
