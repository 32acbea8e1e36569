//! CLI module for shopgraph
//!
//! Provides command-line interface for:
//! - run: execute JSON operations from stdin
//! - demo: scripted walkthrough with change events

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{demo, run, run_command, run_demo, serve, serve_lines, SessionSummary};
pub use errors::{CliError, CliResult};
pub use io::{read_lines, write_error, write_event, write_json, write_response};
