use std::time::Duration;

use super::account::Currency;
use super::id::{AccountId, PaymentId};
use super::money::Money;

/// Errors while parsing or validating a monetary amount.
///
/// These are pure input validation errors, raised before any storage access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("amount is required")]
    Missing,

    #[error("Amount {input:?} is not a valid decimal number")]
    InvalidFormat { input: String },

    #[error("Amount is not finite")]
    NotFinite,

    #[error("Amount must not be negative")]
    Negative,

    #[error("Amount must be greater than zero")]
    NotPositive,

    #[error("Amount must not have more than 2 fractional digits (got {scale})")]
    InvalidPrecision { scale: u32 },

    #[error("Amount is out of the supported range")]
    Overflow,
}

/// Errors while parsing an identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("{kind} ID must not be empty")]
    Empty { kind: &'static str },

    #[error("invalid {kind} ID: {reason}")]
    Malformed { kind: &'static str, reason: String },
}

/// Failures of the backing store. The transaction is always rolled back.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("timed out after {waited:?} waiting for the lock on account {account}")]
    LockTimeout { account: AccountId, waited: Duration },

    #[error("account {account} was written without holding its lock")]
    NotLocked { account: AccountId },

    #[error("payment {payment} already exists")]
    DuplicatePayment { payment: PaymentId },

    #[error("store lock poisoned")]
    Poisoned,

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Top-level error type for ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Amount(#[from] AmountError),

    #[error(transparent)]
    Id(#[from] IdError),

    #[error("Invalid currency code {code:?}")]
    InvalidCurrency { code: String },

    #[error("Transfers must be between different accounts")]
    SameAccount { account: AccountId },

    #[error("Account {account} does not exist")]
    AccountNotFound { account: AccountId },

    #[error("Account {account} already exists")]
    AccountExists { account: AccountId },

    #[error("Transfers must use the same currency ({from_currency} -> {to_currency})")]
    CurrencyMismatch {
        to: AccountId,
        to_currency: Currency,
        from: AccountId,
        from_currency: Currency,
    },

    #[error("Account {account} has an insufficient balance: has {balance}, requested {requested}")]
    InsufficientBalance {
        account: AccountId,
        balance: Money,
        requested: Money,
    },

    #[error("Invalid amount {amount} for account {account}")]
    InvalidAmount { account: AccountId, amount: Money },

    #[error("operation cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
}

/// The stable category an [`Error`] maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Client-correctable input, detected before any I/O.
    Validation,
    /// A referenced account does not exist.
    NotFound,
    /// A business rule rejected the operation inside the transaction.
    Business,
    /// The caller cancelled or the deadline passed before commit.
    Interrupted,
    /// The store failed; details are for logs only.
    Infrastructure,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Amount(_) | Error::Id(_) | Error::InvalidCurrency { .. } => {
                ErrorKind::Validation
            }
            Error::AccountNotFound { .. } => ErrorKind::NotFound,
            Error::SameAccount { .. }
            | Error::AccountExists { .. }
            | Error::CurrencyMismatch { .. }
            | Error::InsufficientBalance { .. }
            | Error::InvalidAmount { .. } => ErrorKind::Business,
            Error::Cancelled | Error::DeadlineExceeded => ErrorKind::Interrupted,
            Error::Storage(_) => ErrorKind::Infrastructure,
        }
    }
}

/// Errors while loading or exporting CSV batches.
#[derive(Debug, thiserror::Error)]
#[allow(clippy::enum_variant_names)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid record at row {row}: {source}")]
    InvalidRecord { row: u64, source: Error },

    #[error("Ledger error: {0}")]
    Ledger(#[from] Error),
}
