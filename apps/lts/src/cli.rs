//! Command line interface definition

use clap::{Parser, Subcommand};
use lts_types::ColorChoice;
use std::path::PathBuf;

/// lts - installs the LanguageTool language server and a Java runtime for it
#[derive(Parser)]
#[command(name = "lts")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Installs the LanguageTool language server and its Java runtime")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Never ask; show the offline instructions when installation fails
    #[arg(long, global = true)]
    pub non_interactive: bool,

    /// Managed library directory
    #[arg(long, global = true, value_name = "DIR")]
    pub lib_dir: Option<String>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Locate or download the server and a runtime, then validate them
    #[command(alias = "i")]
    Install {
        /// Use this server installation instead of searching
        #[arg(long, value_name = "DIR")]
        bundle_path: Option<String>,

        /// Use this Java home instead of searching
        #[arg(long, value_name = "DIR")]
        runtime_path: Option<String>,

        /// Highest server version to accept
        #[arg(long, value_name = "VERSION")]
        max_version: Option<String>,

        /// Probe the system Java even on macOS
        #[arg(long)]
        force_system_probe: bool,
    },

    /// Run the version check against a server and runtime
    Probe {
        /// Server installation directory
        bundle: PathBuf,

        /// Java home; the system runtime is used when omitted
        #[arg(long, value_name = "DIR")]
        runtime: Option<PathBuf>,
    },

    /// Show the platform tokens and archive names used for downloads
    Platform {
        /// Operating system (linux, darwin, win32, ...)
        #[arg(long)]
        os: Option<String>,

        /// Architecture (x64, arm64, ia32, ...)
        #[arg(long)]
        arch: Option<String>,
    },

    /// List published and installed server versions
    Versions {
        /// Ask the public release list when no manifest URL is configured
        #[arg(long)]
        remote: bool,
    },
}
