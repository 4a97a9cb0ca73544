use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "ledger-engine",
    author,
    version,
    about = "Loads ledger accounts and applies transfers between them",
    long_about = None,
    after_help = "OUTPUT:\n    Final account balances are printed to stdout in CSV format.\n    Use shell redirection to save to a file:\n\n    ledger-engine accounts.csv transfers.csv > balances.csv"
)]
pub struct Args {
    /// Path to the accounts CSV file
    #[arg(
        index = 1,
        value_name = "ACCOUNTS",
        help = "Input CSV file with columns: id, currency, balance"
    )]
    pub accounts_file: PathBuf,

    /// Path to the transfers CSV file
    #[arg(
        index = 2,
        value_name = "TRANSFERS",
        help = "Optional CSV file with columns: to, from, amount"
    )]
    pub transfers_file: Option<PathBuf>,

    /// Write the payment log to this file
    #[arg(long = "payments", value_name = "FILE")]
    pub payments_file: Option<PathBuf>,

    /// Maximum time to wait for an account lock, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 5000)]
    pub lock_timeout_ms: u64,
}
