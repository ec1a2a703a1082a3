//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use domain::Locale;

/// Voice Buddy CLI
#[derive(Debug, Parser)]
#[command(name = "voice-buddy")]
#[command(author, version, about = "Voice Buddy assistant for government schemes", long_about = None)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (defaults to ./config.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start an interactive voice session
    ///
    /// Typed lines stand in for speech while listening.
    /// Example: voice-buddy talk --lang hi
    Talk {
        /// Session language (en or hi); defaults to the saved preference
        #[arg(short, long, value_parser = parse_locale)]
        lang: Option<Locale>,

        /// Backend URL
        #[arg(short, long)]
        url: Option<String>,
    },

    /// Ask a single question and print the reply
    Ask {
        /// Question text
        query: String,

        /// Question language (en or hi)
        #[arg(short, long, value_parser = parse_locale, default_value = "en")]
        lang: Locale,

        /// Backend URL
        #[arg(short, long)]
        url: Option<String>,
    },

    /// Inspect or edit the stored history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum HistoryAction {
    /// List exchanges, most recent first
    List,
    /// Delete every exchange
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Delete one exchange by id
    Remove {
        /// Exchange id as shown by `history list`
        id: String,
    },
}

/// Parse a locale argument
pub fn parse_locale(value: &str) -> Result<Locale, String> {
    Locale::from_code(value).map_err(|e| e.to_string())
}

/// Determine log filter level from verbosity count
pub const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_filter_verbosity_zero() {
        assert_eq!(log_filter_from_verbosity(0), "warn");
    }

    #[test]
    fn log_filter_verbosity_one() {
        assert_eq!(log_filter_from_verbosity(1), "info");
    }

    #[test]
    fn log_filter_verbosity_two() {
        assert_eq!(log_filter_from_verbosity(2), "debug");
    }

    #[test]
    fn log_filter_verbosity_three_or_more() {
        assert_eq!(log_filter_from_verbosity(3), "trace");
        assert_eq!(log_filter_from_verbosity(10), "trace");
    }

    #[test]
    fn locale_argument_accepts_wire_codes_only() {
        assert_eq!(parse_locale("hi"), Ok(Locale::Hi));
        assert_eq!(parse_locale("en"), Ok(Locale::En));
        assert!(parse_locale("EN").is_err());
        assert!(parse_locale("fr").is_err());
    }
}
