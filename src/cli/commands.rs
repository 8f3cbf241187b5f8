//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Madrasa content portal
#[derive(Parser, Debug)]
#[command(name = "madrasa-portal")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the proxy server
    Serve {
        /// Port to listen on (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Page through one content kind
    List {
        /// Content kind (articles, courses, books, authors, events, iftah, graduations, blogs)
        kind: String,

        /// Page to start at
        #[arg(long, default_value = "1")]
        page: f64,

        /// Page size (defaults to the configured size)
        #[arg(short, long)]
        limit: Option<u32>,

        /// Additional pages to append after the first
        #[arg(long, default_value = "0")]
        more: u32,

        /// Filter field sent with every request (repeatable)
        #[arg(long = "filter", value_name = "KEY=VALUE", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
    },

    /// Search every content source at once
    Search {
        /// Search text
        query: String,

        /// Results per source
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Show or resend submissions stored while the backend was down
    Pending {
        /// Try to deliver them now
        #[arg(long)]
        retry: bool,
    },

    /// Print the effective configuration
    Config,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON
    Json,
    /// Human-readable output
    Pretty,
}

/// Parse `key=value`
fn parse_filter(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}
