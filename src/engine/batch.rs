//! CSV batch loading and export.
//!
//! Rows that cannot be parsed abort the batch, since the input itself is
//! broken. Rows that parse but are rejected by the ledger (unknown account,
//! insufficient balance, ...) are logged and skipped. Storage failures and
//! cancellation abort.

use std::io::{Read, Write};

use super::context::CallContext;
use super::error::{BatchError, Error, ErrorKind};
use super::record::{AccountRecord, OpeningBalance, PaymentRecord, TransferRecord, TransferRequest};
use super::store::{AccountStore, PaymentStore};
use super::transfer_engine::TransferEngine;

/// Row counts of a processed batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: u64,
    pub skipped: u64,
}

impl BatchSummary {
    fn next_row(&self) -> u64 {
        self.processed + self.skipped + 1
    }

    /// Count a row's outcome; errors the batch cannot skip are returned.
    fn record(&mut self, row: u64, outcome: Result<(), Error>) -> Result<(), BatchError> {
        match outcome {
            Ok(()) => {
                self.processed += 1;
                Ok(())
            }
            Err(e) if is_skippable(&e) => {
                log::warn!("[row {row}] - Skipped: {e}");
                self.skipped += 1;
                Ok(())
            }
            Err(e) => Err(BatchError::Ledger(e)),
        }
    }
}

fn is_skippable(e: &Error) -> bool {
    matches!(
        e.kind(),
        ErrorKind::Validation | ErrorKind::NotFound | ErrorKind::Business
    )
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

/// Register the accounts listed in a `id,currency,balance` CSV. A positive
/// opening balance is recorded as an external credit.
///
/// The CSV reader is buffered internally, so `reader` does not need to be.
pub fn load_accounts<A, P, R>(
    engine: &TransferEngine<A, P>,
    ctx: &CallContext,
    reader: R,
) -> Result<BatchSummary, BatchError>
where
    P: PaymentStore,
    A: AccountStore<Scope = P::Scope>,
    R: Read,
{
    log::info!("Starting account loading");

    let mut summary = BatchSummary::default();
    for result in csv_reader(reader).deserialize() {
        let record: AccountRecord = result?;
        let row = summary.next_row();
        log::trace!(
            "[row {row}] Parsing: id={} currency={} balance={}",
            record.id,
            record.currency,
            record.balance
        );

        let opening = OpeningBalance::try_from(record)
            .map_err(|source| BatchError::InvalidRecord { row, source })?;

        let outcome = engine
            .open_account_with_balance(ctx, opening.id, opening.currency, opening.balance)
            .map(|_| ());
        summary.record(row, outcome)?;
    }

    log::info!(
        "Account loading complete: {} processed, {} skipped",
        summary.processed,
        summary.skipped
    );
    Ok(summary)
}

/// Apply every transfer in a `to,from,amount` CSV, in order.
pub fn process_transfers<A, P, R>(
    engine: &TransferEngine<A, P>,
    ctx: &CallContext,
    reader: R,
) -> Result<BatchSummary, BatchError>
where
    P: PaymentStore,
    A: AccountStore<Scope = P::Scope>,
    R: Read,
{
    log::info!("Starting transfer processing");

    let mut summary = BatchSummary::default();
    for result in csv_reader(reader).deserialize() {
        // Step 1: Parse CSV row into a raw TransferRecord
        let record: TransferRecord = result?;
        let row = summary.next_row();
        log::trace!("[row {row}] Parsing: {record}");

        // Step 2: Validate ids and amount text
        let request = TransferRequest::try_from(record)
            .map_err(|source| BatchError::InvalidRecord { row, source })?;

        // Step 3: Apply through the engine
        let outcome = engine
            .transfer(ctx, request.to, request.from, request.amount)
            .map(|_| ());
        summary.record(row, outcome)?;
    }

    log::info!(
        "Transfer processing complete: {} processed, {} skipped",
        summary.processed,
        summary.skipped
    );
    Ok(summary)
}

/// Write all accounts as `id,currency,balance` CSV.
///
/// The CSV writer is buffered internally, so `writer` does not need to be.
pub fn export_accounts<A, P, W>(engine: &TransferEngine<A, P>, writer: W) -> Result<(), BatchError>
where
    P: PaymentStore,
    A: AccountStore<Scope = P::Scope>,
    W: Write,
{
    let accounts = engine.accounts()?;
    log::info!("Exporting {} accounts", accounts.len());

    let mut csv_writer = csv::Writer::from_writer(writer);
    for account in &accounts {
        csv_writer.serialize(account)?;
    }
    csv_writer.flush()?;

    log::trace!("Account export complete");
    Ok(())
}

/// Write all payments as `id,to,from,amount,timestamp` CSV, in commit order.
pub fn export_payments<A, P, W>(engine: &TransferEngine<A, P>, writer: W) -> Result<(), BatchError>
where
    P: PaymentStore,
    A: AccountStore<Scope = P::Scope>,
    W: Write,
{
    let payments = engine.payments()?;
    log::info!("Exporting {} payments", payments.len());

    let mut csv_writer = csv::Writer::from_writer(writer);
    for payment in &payments {
        csv_writer.serialize(PaymentRecord::from(payment))?;
    }
    csv_writer.flush()?;

    log::trace!("Payment export complete");
    Ok(())
}
