mod commands;

use std::fs::File;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use commands::Args;
use ledger_engine::{CallContext, InMemoryLedger, StoreConfig, TransferEngine};

fn main() -> Result<()> {
    // Parse the CLI arguments
    let args = Args::parse();

    // Initialize logger with default level of info (can be overridden with RUST_LOG)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 1. Initialize the ledger and the TransferEngine
    let ledger = InMemoryLedger::with_config(StoreConfig {
        lock_timeout: Duration::from_millis(args.lock_timeout_ms),
    });
    let engine = TransferEngine::new(ledger.clone(), ledger);
    let ctx = CallContext::background();

    // 2. Load the accounts
    log::info!("Loading accounts from {}", args.accounts_file.display());
    let file = File::open(&args.accounts_file).with_context(|| {
        format!(
            "Failed to open accounts file: {}",
            args.accounts_file.display()
        )
    })?;
    ledger_engine::load_accounts(&engine, &ctx, file).context("Failed to load accounts")?;

    // 3. Apply the transfers, if any
    if let Some(path) = &args.transfers_file {
        log::info!("Processing transfers from {}", path.display());
        let file = File::open(path)
            .with_context(|| format!("Failed to open transfers file: {}", path.display()))?;
        ledger_engine::process_transfers(&engine, &ctx, file)
            .context("Failed to process transfers")?;
    }

    // 4. Export the payment log, if requested
    if let Some(path) = &args.payments_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create payments file: {}", path.display()))?;
        ledger_engine::export_payments(&engine, file)
            .context("Failed to export payments")?;
    }

    // 5. Export the accounts to stdout
    ledger_engine::export_accounts(&engine, std::io::stdout())
        .context("Failed to export accounts to stdout")?;

    log::info!("Export complete");

    Ok(())
}
