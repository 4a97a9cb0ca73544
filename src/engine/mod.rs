//! Ledger engine module.
//!
//! This module contains the core transfer logic including:
//! - `TransferEngine` - Validates and atomically applies transfers
//! - `Money` - Exact, non-negative 2-digit decimal amounts
//! - `Account` / `Payment` - Ledger entities
//! - `AccountStore` / `PaymentStore` - Storage contracts, with `InMemoryLedger`
//! - CSV batch loading and export
//! - `Error` types - Validation, business and storage failures

mod account;
mod batch;
mod context;
mod error;
mod id;
mod memory;
mod money;
mod payment;
mod record;
mod store;
mod transfer_engine;

pub use rust_decimal::Decimal;

pub use account::{Account, Currency};
pub use batch::{export_accounts, export_payments, load_accounts, process_transfers, BatchSummary};
pub use context::{CallContext, CancelHandle};
pub use error::{AmountError, BatchError, Error, ErrorKind, IdError, StorageError};
pub use id::{AccountId, PaymentId};
pub use memory::{InMemoryLedger, MemoryScope, StoreConfig};
pub use money::{Money, MINOR_UNIT_DIGITS};
pub use payment::{Payment, PaymentKind};
pub use record::{AccountRecord, PaymentRecord, TransferRecord};
pub use store::{AccountStore, PaymentStore};
pub use transfer_engine::{TransferAmount, TransferEngine};
