//! # CLI Structure and Argument Parsing
//!
//! `vitrine` drives a static fragment-routed site from the terminal. It
//! fetches the shell, navigates the way a visitor's browser would, and prints
//! what the visitor would see.
//!
//! ## Usage Patterns
//!
//! ```bash
//! # Render the landing page
//! vitrine --base-url http://127.0.0.1:8080/ show
//!
//! # Render a page as JSON, after warming the whole menu
//! vitrine show '#/about' --format json --warm
//!
//! # Pre-fetch every menu page and report failures
//! vitrine warm
//!
//! # Feed fragments one per line
//! printf '#/about\n#/contact\n' | vitrine browse
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

/// Main CLI structure for the `vitrine` command
#[derive(Parser, Clone, Debug)]
#[command(name = "vitrine")]
#[command(version)]
#[command(about = "vitrine - Fragment router for static multi-page sites", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show debug logs
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages (only show errors)
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable all ANSI colors in output (also respects `NO_COLOR` env)
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Configuration file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Root URL of the site, overriding configuration and `VITRINE_BASE_URL`
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Navigate to a page and print the resulting shell
    Show {
        /// Address fragment, e.g. `#/about` (a bare `about` is accepted too)
        fragment: Option<String>,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Wait for the menu warm-up before printing
        #[arg(long)]
        warm: bool,
    },

    /// Show the initial page and pre-fetch every page the menu links to
    Warm {
        /// Fragment of the initial page
        #[arg(long)]
        from: Option<String>,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Read fragments from stdin, one per line, and navigate to each
    Browse {
        /// Fragment of the initial page
        #[arg(long)]
        from: Option<String>,
    },
}

impl Commands {
    /// Output format selected by the command, if it has one.
    pub const fn format(&self) -> Option<OutputFormat> {
        match self {
            Self::Show { format, .. } | Self::Warm { format, .. } => Some(*format),
            Self::Browse { .. } => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_show_arguments() {
        let cli = Cli::try_parse_from([
            "vitrine",
            "--base-url",
            "http://localhost:8080/",
            "show",
            "#/about",
            "--format",
            "json",
            "--warm",
        ])
        .unwrap();

        assert_eq!(cli.base_url.as_deref(), Some("http://localhost:8080/"));
        match cli.command {
            Commands::Show {
                fragment,
                format,
                warm,
            } => {
                assert_eq!(fragment.as_deref(), Some("#/about"));
                assert_eq!(format, OutputFormat::Json);
                assert!(warm);
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["vitrine", "warm", "-q"]).unwrap();
        assert!(cli.quiet);
        assert_eq!(cli.command.format(), Some(OutputFormat::Text));
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["vitrine", "-v", "-q", "browse"]).is_err());
    }
}
