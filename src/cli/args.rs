//! CLI argument definitions using clap
//!
//! Commands:
//! - indexbench serve [--config <path>] [--port <n>]
//! - indexbench compare [--config <path>] [--runs <n>] search --name <name>
//! - indexbench compare [--config <path>] [--runs <n>] join --nation <n> --position <p>
//! - indexbench check-config [--config <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// indexbench - time the same player queries with and without index access paths
#[derive(Parser, Debug)]
#[command(name = "indexbench")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Path to JSON configuration file (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the configured listen port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run one query repeatedly in both planner modes and print the timings
    Compare {
        /// Path to JSON configuration file (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Executions per mode
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..))]
        runs: u32,

        #[command(subcommand)]
        target: CompareTarget,
    },

    /// Load and validate the configuration, then print it with secrets redacted
    CheckConfig {
        /// Path to JSON configuration file (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Operation a compare run executes
#[derive(Subcommand, Debug, Clone)]
pub enum CompareTarget {
    /// Case-insensitive name substring search
    Search {
        #[arg(long)]
        name: String,
    },

    /// Nation + position join search
    Join {
        #[arg(long)]
        nation: String,

        #[arg(long)]
        position: String,
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
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["indexbench", "serve", "--port", "8080"]).unwrap();
        match cli.command {
            Command::Serve { config, port } => {
                assert!(config.is_none());
                assert_eq!(port, Some(8080));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_compare_join() {
        let cli = Cli::try_parse_from([
            "indexbench",
            "compare",
            "--runs",
            "10",
            "join",
            "--nation",
            "England",
            "--position",
            "CB",
        ])
        .unwrap();

        match cli.command {
            Command::Compare { runs, target, .. } => {
                assert_eq!(runs, 10);
                assert!(matches!(
                    target,
                    CompareTarget::Join { ref nation, ref position }
                        if nation == "England" && position == "CB"
                ));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_compare_runs_must_be_positive() {
        assert!(Cli::try_parse_from(["indexbench", "compare", "--runs", "0", "search", "--name", "x"])
            .is_err());
        assert!(Cli::try_parse_from([
            "indexbench",
            "compare",
            "--runs",
            "99999999999",
            "search",
            "--name",
            "x"
        ])
        .is_err());
    }

    #[test]
    fn test_compare_search_requires_name() {
        assert!(Cli::try_parse_from(["indexbench", "compare", "search"]).is_err());
    }
}
