//! # CLI Interface
//!
//! Defines the command-line argument structure for `cloak-wallet` using
//! `clap` derive. Five subcommands: `keygen`, `estimate`, `build`,
//! `inspect`, and `version`.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::logging::LogFormat;

/// Cloak command-line wallet.
///
/// Generates keys, estimates transaction sizes, and assembles signed
/// confidential transactions from JSON requests. Never talks to the
/// network: output goes to stdout for whatever submits it.
#[derive(Parser, Debug)]
#[command(
    name = "cloak-wallet",
    about = "Cloak command-line wallet",
    version,
    propagate_version = true
)]
pub struct CloakWalletCli {
    /// Log output format. Logs go to stderr.
    #[arg(long, global = true, value_enum, default_value_t = LogFormatArg::Pretty)]
    pub log_format: LogFormatArg,

    /// Default log filter when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "cloak_wallet=info,cloak_protocol=info")]
    pub log_level: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormatArg {
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a key set, or derive one from an existing spending key.
    Keygen(KeygenArgs),
    /// Estimate the size of a transaction, in KB.
    Estimate(EstimateArgs),
    /// Build and sign a transaction from a JSON request.
    Build(BuildArgs),
    /// Decode a transaction, print its hash and check its signature.
    Inspect(InspectArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `keygen` subcommand.
#[derive(Parser, Debug)]
pub struct KeygenArgs {
    /// Hex spending key to derive from instead of generating a new one.
    #[arg(long, env = "CLOAK_SPENDING_KEY")]
    pub spending_key: Option<String>,
}

/// Arguments for the `estimate` subcommand.
#[derive(Parser, Debug)]
pub struct EstimateArgs {
    /// Number of input coins.
    #[arg(long, default_value_t = 1)]
    pub inputs: usize,

    /// Number of payments.
    #[arg(long, default_value_t = 1)]
    pub payments: usize,

    /// Estimate for a privacy-mode transaction.
    #[arg(long)]
    pub privacy: bool,

    /// Fee floor; a nonzero floor reserves room for a 1-in/1-out proof.
    #[arg(long, default_value_t = 0)]
    pub limit_fee: u64,
}

/// Arguments for the `build` subcommand.
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Path to the JSON build request. `-` reads stdin.
    #[arg(long, short = 'r')]
    pub request: PathBuf,

    /// Path to a JSON `BuilderConfig`. Missing fields take defaults.
    #[arg(long, short = 'c', env = "CLOAK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Pretty-print the resulting transaction JSON.
    #[arg(long)]
    pub pretty: bool,
}

/// Arguments for the `inspect` subcommand.
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Path to the transaction JSON. `-` reads stdin.
    #[arg(long, short = 't')]
    pub tx: PathBuf,

    /// Decode as a token transaction.
    #[arg(long)]
    pub token: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        CloakWalletCli::command().debug_assert();
    }

    #[test]
    fn parses_estimate_flags() {
        let cli = CloakWalletCli::parse_from([
            "cloak-wallet",
            "--log-format",
            "json",
            "estimate",
            "--inputs",
            "3",
            "--privacy",
        ]);
        assert_eq!(cli.log_format, LogFormatArg::Json);
        match cli.command {
            Commands::Estimate(args) => {
                assert_eq!(args.inputs, 3);
                assert_eq!(args.payments, 1);
                assert!(args.privacy);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
