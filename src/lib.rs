//! A ledger transfer engine.
//!
//! Accounts hold a non-negative balance in one currency. [`TransferEngine`]
//! moves money between two accounts of the same currency, or credits an
//! account from outside the ledger, and records every movement as an
//! immutable [`Payment`]. Each operation runs in a single store transaction:
//! both balances and the payment commit together or not at all.
//!
//! Storage is abstracted behind [`AccountStore`] and [`PaymentStore`];
//! [`InMemoryLedger`] implements both with row locks and staged writes.
//! The [`api`] module exposes the engine through JSON request handling, and
//! the CSV helpers load and export batches.

pub mod api;
mod engine;

pub use engine::{
    export_accounts, export_payments, load_accounts, process_transfers, Account, AccountId,
    AccountRecord, AccountStore, AmountError, BatchError, BatchSummary, CallContext, CancelHandle,
    Currency, Decimal, Error, ErrorKind, IdError, InMemoryLedger, MemoryScope, Money, Payment,
    PaymentId, PaymentKind, PaymentRecord, PaymentStore, StorageError, StoreConfig,
    TransferAmount, TransferEngine, TransferRecord, MINOR_UNIT_DIGITS,
};
