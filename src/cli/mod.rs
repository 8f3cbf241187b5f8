//! CLI module
//!
//! Command-line interface for the portal.
//!
//! # Commands
//!
//! - `serve` - Start the proxy server
//! - `list` - Page through a content kind
//! - `search` - Federated search
//! - `pending` - Inspect or resend locally stored submissions
//! - `config` - Print the effective configuration

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
