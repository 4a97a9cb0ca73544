//! Basic example of using the `TransferEngine`.
//!
//! Run with: `cargo run --example basic`

use ledger_engine::api::Api;
use ledger_engine::{CallContext, InMemoryLedger, TransferEngine};
use std::io::Cursor;

fn main() {
    // Initialize logger (optional, but shows what's happening)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Sample accounts and transfers as CSV
    let accounts = r"id,currency,balance
5136843a-0948-432d-8ce6-060362edb538,USD,100.00
b0505aa0-b927-4667-a484-906b4e2a410b,USD,0
e76c0e9d-499f-4759-ae40-895fec818035,SGD,50.00
";
    let transfers = r"to,from,amount
b0505aa0-b927-4667-a484-906b4e2a410b,5136843a-0948-432d-8ce6-060362edb538,30.33
5136843a-0948-432d-8ce6-060362edb538,b0505aa0-b927-4667-a484-906b4e2a410b,10.11
e76c0e9d-499f-4759-ae40-895fec818035,5136843a-0948-432d-8ce6-060362edb538,1.00
b0505aa0-b927-4667-a484-906b4e2a410b,5136843a-0948-432d-8ce6-060362edb538,500.00
";

    // Create engine and process the batches
    let ledger = InMemoryLedger::new();
    let engine = TransferEngine::new(ledger.clone(), ledger);
    let ctx = CallContext::background();

    ledger_engine::load_accounts(&engine, &ctx, Cursor::new(accounts))
        .expect("Failed to load accounts");
    ledger_engine::process_transfers(&engine, &ctx, Cursor::new(transfers))
        .expect("Failed to process transfers");

    // Export results to stdout
    println!("\n=== Final Account State ===");
    ledger_engine::export_accounts(&engine, std::io::stdout())
        .expect("Failed to export accounts");

    println!("\n=== Payment Log ===");
    ledger_engine::export_payments(&engine, std::io::stdout())
        .expect("Failed to export payments");

    // The same engine behind the JSON API
    let api = Api::new(engine);
    let response = api.handle(&ctx, "GET", "/v1/accounts", b"");
    println!("\n=== GET /v1/accounts ({}) ===\n{}", response.status, response.body);
}
