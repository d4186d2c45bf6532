// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Cloak Wallet
//!
//! Entry point for the `cloak-wallet` binary. Parses CLI arguments,
//! initializes logging, and drives the transaction builder.
//!
//! The binary supports five subcommands:
//!
//! - `keygen`   — generate or derive a key set and print the payment address
//! - `estimate` — estimate a transaction's size in KB
//! - `build`    — assemble and sign a transaction from a JSON request
//! - `inspect`  — decode a transaction, print its hash, check signatures
//! - `version`  — print build version information
//!
//! Transaction JSON is written to stdout; everything else the wallet has
//! to say goes through `tracing` on stderr.

mod cli;
mod logging;
mod request;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use std::path::Path;

use cloak_protocol::config::{BuilderConfig, TX_VERSION};
use cloak_protocol::crypto::{KeySet, SpendingKey};
use cloak_protocol::transaction::{
    estimate_tx_size, verify_signature, verify_token_tx, EstimateTxSizeParams, SignedTx,
    TxBuilder, TxCustomTokenPrivacy,
};
use cloak_protocol::zkp::ReferenceProver;

use cli::{CloakWalletCli, Commands};
use request::{BuildRequest, Request};

fn main() -> Result<()> {
    let cli = CloakWalletCli::parse();
    logging::init_logging(&cli.log_level, cli.log_format.into());

    match cli.command {
        Commands::Keygen(args) => keygen(args),
        Commands::Estimate(args) => estimate(args),
        Commands::Build(args) => build(args),
        Commands::Inspect(args) => inspect(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Reads a file, or stdin when the path is `-`.
fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn load_config(path: Option<&Path>) -> Result<BuilderConfig> {
    let Some(path) = path else {
        return Ok(BuilderConfig::default());
    };
    let raw = read_input(path)?;
    let config: BuilderConfig = serde_json::from_str(&raw)
        .with_context(|| format!("invalid builder config in {}", path.display()))?;
    tracing::debug!(?config, "loaded builder config");
    Ok(config)
}

fn keygen(args: cli::KeygenArgs) -> Result<()> {
    let ks = match args.spending_key {
        Some(hex_key) => {
            let sk = SpendingKey::from_hex(hex_key.trim()).context("invalid spending key")?;
            KeySet::from_spending_key(sk)
        }
        None => KeySet::generate(),
    };

    println!("Spending key    : {}", ks.spending_key.to_hex());
    println!("Payment address : {}", ks.payment_address.to_base58());
    println!("Shard           : {}", ks.shard_id());
    Ok(())
}

fn estimate(args: cli::EstimateArgs) -> Result<()> {
    let params = EstimateTxSizeParams {
        num_input_coins: args.inputs,
        num_payments: args.payments,
        has_privacy: args.privacy,
        limit_fee: args.limit_fee,
        ..Default::default()
    };
    let kb = estimate_tx_size(&ReferenceProver::new(), &params);
    println!("{kb}");
    Ok(())
}

fn build(args: cli::BuildArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let raw = read_input(&args.request)?;
    let request = BuildRequest::from_json(&raw)?.into_request()?;
    let builder = TxBuilder::new(ReferenceProver::new()).with_config(config);

    let value = match request {
        Request::Native(params) => {
            let tx = builder.build(&params).context("transaction build failed")?;
            tracing::info!(hash = %tx.hash(), size = tx.actual_size(), "built transaction");
            serde_json::to_value(&tx)?
        }
        Request::Token(params) => {
            let tx = builder
                .build_token(&params)
                .context("token transaction build failed")?;
            tracing::info!(hash = %tx.hash(), "built token transaction");
            serde_json::to_value(&tx)?
        }
    };

    let out = if args.pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    println!("{out}");
    Ok(())
}

fn inspect(args: cli::InspectArgs) -> Result<()> {
    let raw = read_input(&args.tx)?;

    if args.token {
        let tx = TxCustomTokenPrivacy::from_json(&raw).context("not a token transaction")?;
        let data = tx.token_data();
        println!("Hash        : {}", tx.hash());
        println!("Outer hash  : {}", tx.tx().hash());
        println!("Token hash  : {}", data.tx_normal.hash());
        println!("Property ID : {}", data.property_id);
        println!("Action      : {}", data.action);
        println!("Size (KB)   : {}", tx.tx().actual_size_kb());
        verify_token_tx(&tx).context("signature check failed")?;
    } else {
        let tx = SignedTx::from_json(&raw).context("not a transaction")?;
        println!("Hash      : {}", tx.hash());
        println!("Type      : {}", tx.tx_type);
        println!("Fee       : {}", tx.fee);
        println!("Size (KB) : {}", tx.actual_size_kb());
        verify_signature(&tx).context("signature check failed")?;
    }
    println!("Signature : ok");
    Ok(())
}

fn print_version() {
    println!("cloak-wallet {}", env!("CARGO_PKG_VERSION"));
    println!("tx version   {}", TX_VERSION);
}
