//! Storage contracts the transfer engine depends on.
//!
//! The engine never touches storage outside a scope handed out by
//! [`PaymentStore::run_in_transaction`]. Implementations own the locking
//! primitive that keeps concurrent transfers from spending the same balance
//! twice: [`AccountStore::get_for_update`] must take a write-intent lock that
//! is held until the scope commits or rolls back.

use super::account::Account;
use super::context::CallContext;
use super::error::Error;
use super::id::AccountId;
use super::payment::Payment;

/// Account persistence.
pub trait AccountStore: Send + Sync {
    /// Transactional scope shared with the [`PaymentStore`].
    type Scope;

    /// Read the committed state of an account.
    fn get(&self, id: AccountId) -> Result<Account, Error>;

    /// Read an account inside `scope`, locking it against concurrent writers
    /// until the scope ends. Fails with [`Error::AccountNotFound`].
    fn get_for_update(&self, id: AccountId, scope: &mut Self::Scope) -> Result<Account, Error>;

    /// Register a new account inside `scope`. Fails with [`Error::AccountExists`].
    fn create(&self, account: &Account, scope: &mut Self::Scope) -> Result<(), Error>;

    /// Write back an account read with `get_for_update` or registered with
    /// `create` in `scope`.
    fn store(&self, account: &Account, scope: &mut Self::Scope) -> Result<(), Error>;

    /// All committed accounts.
    fn list(&self) -> Result<Vec<Account>, Error>;
}

/// Payment persistence and transaction demarcation.
pub trait PaymentStore: Send + Sync {
    type Scope;

    /// Append a payment record inside `scope`.
    fn store(&self, payment: &Payment, scope: &mut Self::Scope) -> Result<(), Error>;

    /// All committed payments.
    fn list(&self) -> Result<Vec<Payment>, Error>;

    /// Open a scope, run `f` in it, and commit if `f` succeeds.
    ///
    /// If `f` fails (or unwinds) the scope is rolled back and nothing `f`
    /// wrote becomes visible. A failed commit is returned as an error, never
    /// as success. Lock waits inside the scope stop as soon as `ctx` is
    /// cancelled or past its deadline.
    fn run_in_transaction<T, F>(&self, ctx: &CallContext, f: F) -> Result<T, Error>
    where
        F: FnOnce(&mut Self::Scope) -> Result<T, Error>;
}
