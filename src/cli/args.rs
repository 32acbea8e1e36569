//! CLI argument definitions using clap
//!
//! Commands:
//! - shopgraph run --config <path> [--events]
//! - shopgraph demo --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// shopgraph - graph-shaped reads and change events over products, users and orders
#[derive(Parser, Debug)]
#[command(name = "shopgraph")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Execute newline-delimited JSON operations from stdin
    Run {
        /// Path to configuration file
        #[arg(long, default_value = "./shopgraph.json")]
        config: PathBuf,

        /// Also write every change event to stdout
        #[arg(long)]
        events: bool,
    },

    /// Run a scripted walkthrough against a fresh store
    Demo {
        /// Path to configuration file
        #[arg(long, default_value = "./shopgraph.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let cli = Cli::parse_from(["shopgraph", "run", "--events"]);
        match cli.command {
            Command::Run { config, events } => {
                assert_eq!(config, PathBuf::from("./shopgraph.json"));
                assert!(events);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_demo_with_config() {
        let cli = Cli::parse_from(["shopgraph", "demo", "--config", "/tmp/shop.json"]);
        assert!(matches!(cli.command, Command::Demo { ref config } if config == &PathBuf::from("/tmp/shop.json")));
    }
}
