//! Voyage CLI library.
//!
//! This library provides the core functionality for the Voyage command-line
//! interface: configuration management, the chat REPL, and output
//! formatting. The dialogue engine runs in-process.

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod repl;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
