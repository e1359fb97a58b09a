//! Command-line definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// FARMAVET Web administration tool
#[derive(Parser, Debug)]
#[command(name = "farmavet", version)]
#[command(about = "FARMAVET Web server and administration tool", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "FARMAVET_CONFIG")]
    pub config: Option<String>,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Migrate, seed the default admin and serve HTTP until Ctrl-C
    Serve,
    /// Apply pending database migrations
    Migrate,
    /// Admin account management
    Admin {
        /// Admin action
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Methodology catalogue operations
    Methodologies {
        /// Methodology action
        #[command(subcommand)]
        action: MethodologyAction,
    },
    /// Configuration file management
    Config {
        /// Config action
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// `farmavet admin ...`
#[derive(Subcommand, Debug)]
pub enum AdminAction {
    /// Create an admin account
    Create {
        /// Login name
        #[arg(long)]
        username: String,
        /// Initial password
        #[arg(long)]
        password: String,
    },
    /// Replace an admin's password
    SetPassword {
        /// Login name
        #[arg(long)]
        username: String,
        /// New password
        #[arg(long)]
        password: String,
    },
}

/// `farmavet methodologies ...`
#[derive(Subcommand, Debug)]
pub enum MethodologyAction {
    /// Import the laboratory summary sheet (Excel workbook or CSV export)
    Import {
        /// `.xlsx` workbook or CSV file to read
        file: PathBuf,
        /// Parse and report without writing
        #[arg(long)]
        dry_run: bool,
    },
    /// Show unique, accredited and total counts
    Count,
}

/// `farmavet config ...`
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path
    Path,
    /// Print a value by dotted key
    Get {
        /// Dotted key, e.g. `server.port`
        key: String,
    },
    /// Set a value by dotted key in the config file
    Set {
        /// Dotted key
        key: String,
        /// New value
        value: String,
    },
    /// Write a default config file
    Init {
        /// Target file (defaults to the platform config dir)
        #[arg(long)]
        file: Option<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the configuration as environment variables
    Export {
        /// Format as `--env KEY=VALUE` for `docker run`
        #[arg(long)]
        docker_env: bool,
    },
}
