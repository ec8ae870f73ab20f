//! # sfid CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sfid_cli::account::{run_account, AccountArgs};
use sfid_cli::config::Settings;
use sfid_cli::generate::{run_generate, GenerateArgs};
use sfid_cli::parse::{run_parse, ParseArgs};
use sfid_cli::provinces::{run_provinces, ProvincesArgs};
use sfid_cli::verify::{run_verify, VerifyArgs};

/// Identity-code tool
///
/// Generates, verifies, and parses `A3-R5-T2P1C1-N9-D*` identity codes and
/// derives their account identifiers.
#[derive(Parser, Debug)]
#[command(name = "sfid", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Issue a new code from field values.
    Generate(GenerateArgs),

    /// Verify a code, including its check character.
    Verify(VerifyArgs),

    /// Show every field of a code.
    Parse(ParseArgs),

    /// Print the account identifier of a verified code.
    Account(AccountArgs),

    /// List the configured provinces.
    Provinces(ProvincesArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("sfid CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(1);
        }
    };

    let result = match cli.command {
        Commands::Generate(args) => run_generate(&args, &settings),
        Commands::Verify(args) => run_verify(&args, &settings),
        Commands::Parse(args) => run_parse(&args, &settings),
        Commands::Account(args) => run_account(&args, &settings),
        Commands::Provinces(args) => run_provinces(&args, &settings),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parse_generate_minimal() {
        let cli = Cli::try_parse_from([
            "sfid",
            "generate",
            "--category",
            "GMR",
            "--province",
            "ZS",
            "--city",
            "001",
        ])
        .unwrap();
        if let Commands::Generate(args) = cli.command {
            assert_eq!(args.category, "GMR");
            assert_eq!(args.province, "ZS");
            assert_eq!(args.city, "001");
            assert!(args.org.is_none());
            assert!(args.profit.is_none());
            assert!(args.date.is_none());
            assert!(args.db.is_none());
            assert!(!args.json);
        } else {
            panic!("expected generate");
        }
    }

    #[test]
    fn cli_parse_generate_all_options() {
        let cli = Cli::try_parse_from([
            "sfid",
            "generate",
            "--category",
            "GFR",
            "--province",
            "GD",
            "--city",
            "123",
            "--org",
            "ZF",
            "--profit",
            "0",
            "--date",
            "20240229",
            "--db",
            "/tmp/seq.db",
            "--secret",
            "s",
            "--json",
        ])
        .unwrap();
        if let Commands::Generate(args) = cli.command {
            assert_eq!(args.org.as_deref(), Some("ZF"));
            assert_eq!(args.profit.as_deref(), Some("0"));
            assert_eq!(args.date.as_deref(), Some("20240229"));
            assert_eq!(args.db, Some(PathBuf::from("/tmp/seq.db")));
            assert_eq!(args.secret.as_deref(), Some("s"));
            assert!(args.json);
        } else {
            panic!("expected generate");
        }
    }

    #[test]
    fn cli_parse_generate_requires_region() {
        assert!(Cli::try_parse_from(["sfid", "generate", "--category", "GMR"]).is_err());
    }

    #[test]
    fn cli_parse_verify() {
        let cli = Cli::try_parse_from(["sfid", "verify", "--code", "X"]).unwrap();
        assert!(matches!(cli.command, Commands::Verify(ref a) if a.code == "X"));
    }

    #[test]
    fn cli_parse_parse_json() {
        let cli = Cli::try_parse_from(["sfid", "parse", "--code", "X", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Parse(ref a) if a.json));
    }

    #[test]
    fn cli_parse_account_and_provinces() {
        let cli = Cli::try_parse_from(["sfid", "account", "--code", "X"]).unwrap();
        assert!(matches!(cli.command, Commands::Account(_)));
        let cli = Cli::try_parse_from(["sfid", "provinces"]).unwrap();
        assert!(matches!(cli.command, Commands::Provinces(ref a) if !a.cities));
    }

    #[test]
    fn cli_parse_verbose_levels() {
        let cli0 = Cli::try_parse_from(["sfid", "provinces"]).unwrap();
        assert_eq!(cli0.verbose, 0);

        let cli2 = Cli::try_parse_from(["sfid", "-vv", "provinces"]).unwrap();
        assert_eq!(cli2.verbose, 2);

        let cli3 = Cli::try_parse_from(["sfid", "provinces", "-vvv"]).unwrap();
        assert_eq!(cli3.verbose, 3);
    }

    #[test]
    fn cli_parse_config_option() {
        let cli = Cli::try_parse_from(["sfid", "--config", "sfid.yaml", "provinces"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("sfid.yaml")));
    }

    #[test]
    fn cli_parse_no_subcommand_errors() {
        assert!(Cli::try_parse_from(["sfid"]).is_err());
        assert!(Cli::try_parse_from(["sfid", "nonexistent"]).is_err());
    }
}
