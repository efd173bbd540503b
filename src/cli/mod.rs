//! CLI interface using clap.
//!
//! Provides command-line arguments and subcommands for the tool.

pub mod shell;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::application::OutputFormat;

/// Quote Generator - show, collect and sync quotes.
#[derive(Parser, Debug)]
#[command(name = "quotes")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (use multiple times for more verbosity).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output format: text, json, or table.
    #[arg(short, long, default_value = "text")]
    pub format: String,

    /// Data directory (defaults to ~/.quote-generator).
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show a random quote from the selected category.
    Show {
        /// Pick from this category instead of the selected one (does not persist).
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Add a new quote.
    Add {
        /// Quote text.
        text: String,

        /// Quote category.
        category: String,

        /// Also send the quote to the remote endpoint.
        #[arg(long)]
        push: bool,
    },

    /// List quotes, optionally for one category.
    List {
        /// Category to list ("all" for every quote).
        #[arg(short, long)]
        category: Option<String>,
    },

    /// List categories, marking the selected one.
    Categories,

    /// Select and persist the category filter, then list its quotes.
    Filter {
        /// Category name or "all".
        category: String,
    },

    /// Export all quotes as JSON to a file or stdout.
    Export {
        /// Output file path (stdout if not specified).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import quotes from a JSON file.
    Import {
        /// JSON file holding an array of quotes.
        file: PathBuf,
    },

    /// Sync once with the remote endpoint.
    Sync,

    /// Sync periodically until interrupted.
    Daemon {
        /// Interval between syncs in seconds (overrides config).
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Interactive session with background sync.
    Shell,

    /// Show store and sync status.
    Status,

    /// Show the effective configuration.
    Config {
        /// Write a default config file if none exists.
        #[arg(long)]
        init: bool,
    },
}

impl Cli {
    /// Parse the output format argument.
    pub fn output_format(&self) -> Result<OutputFormat, String> {
        self.format.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add() {
        let cli = Cli::try_parse_from(["quotes", "add", "Be kind.", "Life", "--push"]).unwrap();
        match cli.command {
            Commands::Add {
                text,
                category,
                push,
            } => {
                assert_eq!(text, "Be kind.");
                assert_eq!(category, "Life");
                assert!(push);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["quotes", "-vv", "-f", "json", "list", "--data-dir", "/tmp/q"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.output_format(), Ok(OutputFormat::Json));
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/q")));
    }

    #[test]
    fn test_bad_format_is_reported() {
        let cli = Cli::try_parse_from(["quotes", "-f", "xml", "status"]).unwrap();
        assert!(cli.output_format().is_err());
    }
}
