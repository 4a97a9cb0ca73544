//! Integration tests for the `TransferEngine`.
//!
//! These tests exercise the full E2E flow: accounts CSV + transfers CSV →
//! processing → CSV output.
use ledger_engine::{
    export_accounts, export_payments, load_accounts, process_transfers, BatchError,
    BatchSummary, CallContext, InMemoryLedger, TransferEngine,
};
use serde::Deserialize;
use std::io::Cursor;

const A: &str = "5136843a-0948-432d-8ce6-060362edb538";
const B: &str = "b0505aa0-b927-4667-a484-906b4e2a410b";
const C: &str = "e76c0e9d-499f-4759-ae40-895fec818035";

type Engine = TransferEngine<InMemoryLedger, InMemoryLedger>;

#[derive(Debug, Deserialize)]
struct AccountRow {
    id: String,
    currency: String,
    balance: String,
}

fn new_engine() -> Engine {
    let ledger = InMemoryLedger::new();
    TransferEngine::new(ledger.clone(), ledger)
}

/// Helper that returns Result to test error cases
fn try_process_csv(accounts: &str, transfers: &str) -> Result<String, BatchError> {
    let engine = new_engine();
    let ctx = CallContext::background();
    load_accounts(&engine, &ctx, Cursor::new(accounts))?;
    process_transfers(&engine, &ctx, Cursor::new(transfers))?;

    let mut output = Vec::new();
    export_accounts(&engine, &mut output)?;
    Ok(String::from_utf8(output).expect("CSV output is UTF-8"))
}

/// Helper to run accounts and transfers through the engine and get output
fn process_csv(accounts: &str, transfers: &str) -> String {
    try_process_csv(accounts, transfers).unwrap()
}

/// Parse CSV output into rows ordered by account id
fn parse_output(output: &str) -> Vec<AccountRow> {
    let mut rdr = csv::Reader::from_reader(output.as_bytes());
    rdr.deserialize::<AccountRow>().map(|r| r.unwrap()).collect()
}

fn seed() -> String {
    format!(
        "id,currency,balance
{A},USD,100.00
{B},USD,0
{C},SGD,50.00"
    )
}

#[test]
fn test_load_only() {
    let output = process_csv(&seed(), "to,from,amount");
    let accounts = parse_output(&output);

    assert_eq!(accounts.len(), 3);
    assert_eq!(accounts[0].id, A);
    assert_eq!(accounts[0].currency, "USD");
    assert_eq!(accounts[0].balance, "100.00");
    assert_eq!(accounts[1].id, B);
    assert_eq!(accounts[1].balance, "0.00");
    assert_eq!(accounts[2].id, C);
    assert_eq!(accounts[2].currency, "SGD");
}

#[test]
fn test_single_transfer() {
    let transfers = format!("to,from,amount\n{B},{A},1.23");

    let output = process_csv(&seed(), &transfers);
    let accounts = parse_output(&output);

    assert_eq!(accounts[0].balance, "98.77");
    assert_eq!(accounts[1].balance, "1.23");
}

#[test]
fn test_transfer_back_and_forth() {
    let transfers = format!(
        "to,from,amount
{B},{A},30.33
{A},{B},10.11
{B},{A},0.01"
    );

    let output = process_csv(&seed(), &transfers);
    let accounts = parse_output(&output);

    assert_eq!(accounts[0].balance, "79.77");
    assert_eq!(accounts[1].balance, "20.23");
}

#[test]
fn test_currency_mismatch_is_skipped() {
    let transfers = format!("to,from,amount\n{C},{A},1.00");

    let output = process_csv(&seed(), &transfers);
    let accounts = parse_output(&output);

    assert_eq!(accounts[0].balance, "100.00");
    assert_eq!(accounts[2].balance, "50.00");
}

#[test]
fn test_insufficient_balance_is_skipped() {
    let transfers = format!(
        "to,from,amount
{B},{A},100.01
{B},{A},100.00"
    );

    let output = process_csv(&seed(), &transfers);
    let accounts = parse_output(&output);

    // First transfer skipped, second drains the account exactly
    assert_eq!(accounts[0].balance, "0.00");
    assert_eq!(accounts[1].balance, "100.00");
}

#[test]
fn test_unknown_account_is_skipped() {
    let ghost = "1024abad-6de0-466f-9022-4499a97c3f87";
    let transfers = format!(
        "to,from,amount
{ghost},{A},1.00
{A},{ghost},1.00"
    );

    let output = process_csv(&seed(), &transfers);
    let accounts = parse_output(&output);

    assert_eq!(accounts.len(), 3);
    assert_eq!(accounts[0].balance, "100.00");
}

#[test]
fn test_summary_counts() {
    let engine = new_engine();
    let ctx = CallContext::background();
    let loaded = load_accounts(&engine, &ctx, Cursor::new(seed())).unwrap();
    assert_eq!(loaded, BatchSummary { processed: 3, skipped: 0 });

    let transfers = format!(
        "to,from,amount
{B},{A},1.00
{A},{A},1.00
{C},{A},1.00
{B},{A},0.00"
    );
    let summary = process_transfers(&engine, &ctx, Cursor::new(transfers)).unwrap();
    assert_eq!(summary, BatchSummary { processed: 1, skipped: 3 });
}

// ============================================================================
// Invalid Input Tests - These should cause errors
// ============================================================================

#[test]
fn test_rejects_malformed_account_id() {
    let transfers = format!("to,from,amount\nnot-a-uuid,{A},1.00");
    assert!(matches!(
        try_process_csv(&seed(), &transfers),
        Err(BatchError::InvalidRecord { row: 1, .. })
    ));
}

#[test]
fn test_rejects_negative_amount() {
    let transfers = format!("to,from,amount\n{B},{A},-1.00");
    assert!(try_process_csv(&seed(), &transfers).is_err());
}

#[test]
fn test_rejects_more_than_2_decimals() {
    let transfers = format!("to,from,amount\n{B},{A},1.001");
    assert!(try_process_csv(&seed(), &transfers).is_err());
}

#[test]
fn test_rejects_non_finite_amount() {
    for amount in ["NaN", "Inf", "-Infinity"] {
        let transfers = format!("to,from,amount\n{B},{A},{amount}");
        assert!(
            try_process_csv(&seed(), &transfers).is_err(),
            "Should reject: {amount}"
        );
    }
}

#[test]
fn test_rejects_unknown_currency() {
    let accounts = format!("id,currency,balance\n{A},JPY,100");
    assert!(try_process_csv(&accounts, "to,from,amount").is_err());
}

#[test]
fn test_rejects_missing_column() {
    let transfers = format!("to,from\n{B},{A}");
    assert!(matches!(
        try_process_csv(&seed(), &transfers),
        Err(BatchError::Csv(_))
    ));
}

#[test]
fn test_accepts_valid_precision_variants() {
    // All of these should be valid
    for amount in ["1", "1.0", "1.00", "0.01", "1e1", "0100.50"] {
        let transfers = format!("to,from,amount\n{B},{A},{amount}");
        assert!(
            try_process_csv(&seed(), &transfers).is_ok(),
            "Should accept: {amount}"
        );
    }
}

#[test]
fn test_whitespace_handling() {
    let accounts = format!("id,  currency,  balance\n  {A},  USD,  12.5");
    let output = process_csv(&accounts, "to,from,amount");
    let accounts = parse_output(&output);

    assert_eq!(accounts[0].balance, "12.50");
}

// ============================================================================
// Payment Log
// ============================================================================

#[test]
fn test_payment_log_in_commit_order() {
    let engine = new_engine();
    let ctx = CallContext::background();
    load_accounts(&engine, &ctx, Cursor::new(seed())).unwrap();
    process_transfers(
        &engine,
        &ctx,
        Cursor::new(format!("to,from,amount\n{B},{A},30.33\n{A},{B},10.11")),
    )
    .unwrap();

    let mut output = Vec::new();
    export_payments(&engine, &mut output).unwrap();

    let mut rdr = csv::Reader::from_reader(output.as_slice());
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();

    // Two seed credits (A and C) followed by the two transfers
    assert_eq!(rows.len(), 4);
    assert_eq!((&rows[0][1], &rows[0][2], &rows[0][3]), (A, "", "100.00"));
    assert_eq!((&rows[1][1], &rows[1][2], &rows[1][3]), (C, "", "50.00"));
    assert_eq!((&rows[2][1], &rows[2][2], &rows[2][3]), (B, A, "30.33"));
    assert_eq!((&rows[3][1], &rows[3][2], &rows[3][3]), (A, B, "10.11"));
}
