//! Command-line interface for neighborly.
//!
//! This module provides the CLI structure for the `neighborlyd` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// neighborlyd - Proximity search for your community directory
///
/// Serves a small HTTP API that finds the people and groups located near
/// the caller's addresses.
#[derive(Debug, Parser)]
#[command(name = "neighborlyd")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve {
        /// Bind address, overriding the configured one
        #[arg(short, long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_verify() {
        // Verify the CLI structure is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "neighborlyd");
    }

    #[test]
    fn test_parse_serve() {
        let args = vec!["neighborlyd", "serve"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(cli.command, Command::Serve { bind: None }));
    }

    #[test]
    fn test_parse_serve_with_bind() {
        let args = vec!["neighborlyd", "serve", "--bind", "0.0.0.0:9090"];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Serve { bind } => assert_eq!(bind.as_deref(), Some("0.0.0.0:9090")),
            Command::Config(_) => panic!("expected serve command"),
        }
    }

    #[test]
    fn test_parse_config_show() {
        let args = vec!["neighborlyd", "config", "show", "--json"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Show { json: true })
        ));
    }

    #[test]
    fn test_parse_config_validate_with_file() {
        let args = vec!["neighborlyd", "config", "validate", "-f", "/tmp/c.toml"];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Config(ConfigCommand::Validate { file }) => {
                assert_eq!(file, Some(PathBuf::from("/tmp/c.toml")));
            }
            _ => panic!("expected config validate"),
        }
    }

    #[test]
    fn test_parse_with_config() {
        let args = vec!["neighborlyd", "-c", "/custom/config.toml", "serve"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_verbosity_quiet() {
        let args = vec!["neighborlyd", "-q", "serve"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.verbosity(), crate::logging::Verbosity::Quiet);
    }

    #[test]
    fn test_verbosity_normal() {
        let args = vec!["neighborlyd", "serve"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.verbosity(), crate::logging::Verbosity::Normal);
    }

    #[test]
    fn test_verbosity_verbose() {
        let args = vec!["neighborlyd", "-v", "serve"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.verbosity(), crate::logging::Verbosity::Verbose);
    }

    #[test]
    fn test_verbosity_trace() {
        let args = vec!["neighborlyd", "-vv", "serve"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.verbosity(), crate::logging::Verbosity::Trace);
    }
}
