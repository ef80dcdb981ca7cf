//! CLI module
//!
//! - `serve`: HTTP API for uploading lists and polling jobs
//! - `generate`: one batch from local files, in the foreground
//! - `clear-cache`: forget every stored geocode

pub mod clear_cache;
pub mod generate;
pub mod serve;

use clap::{Parser, Subcommand};

/// Sold-comps mailer - one letter per client listing the closest recent sales
#[derive(Parser)]
#[command(name = "sold-comps-mailer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API
    Serve,

    /// Generate mailers for one pair of CSV files
    Generate(generate::GenerateArgs),

    /// Delete the geocode cache
    ClearCache,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::geocoding::GeocodingProviderKind;
    use std::path::PathBuf;

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from([
            "sold-comps-mailer",
            "generate",
            "--clients",
            "clients.csv",
            "--sold",
            "sold.csv",
            "--num-clients",
            "25",
            "--provider",
            "tomtom",
            "--no-cache",
        ])
        .unwrap();

        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.clients, PathBuf::from("clients.csv"));
        assert_eq!(args.num_clients, "25");
        assert_eq!(args.provider, Some(GeocodingProviderKind::TomTom));
        assert!(args.no_cache);
        assert!(args.output.is_none());
    }

    #[test]
    fn test_generate_requires_both_lists() {
        let result = Cli::try_parse_from(["sold-comps-mailer", "generate", "--clients", "a.csv"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_clear_cache() {
        let cli = Cli::try_parse_from(["sold-comps-mailer", "clear-cache"]).unwrap();
        assert!(matches!(cli.command, Command::ClearCache));
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let result = Cli::try_parse_from([
            "sold-comps-mailer",
            "generate",
            "--clients",
            "a.csv",
            "--sold",
            "b.csv",
            "--provider",
            "google",
        ]);
        assert!(result.is_err());
    }
}
