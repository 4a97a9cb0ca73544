use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use super::account::Account;
use super::context::CallContext;
use super::error::{Error, StorageError};
use super::id::{AccountId, PaymentId};
use super::payment::Payment;
use super::store::{AccountStore, PaymentStore};

/// Tuning for [`InMemoryLedger`].
#[derive(Debug, Clone, Copy)]
pub struct StoreConfig {
    /// How long `get_for_update` waits for another scope to release a lock.
    pub lock_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(5),
        }
    }
}

/// Upper bound on one condvar wait, so a cancelled caller stops waiting soon.
const CANCEL_POLL: Duration = Duration::from_millis(10);

#[derive(Debug, Default)]
struct Committed {
    accounts: BTreeMap<AccountId, Account>,
    payments: Vec<Payment>,
    payment_ids: HashSet<PaymentId>,
}

#[derive(Debug)]
struct Shared {
    committed: Mutex<Committed>,
    /// Accounts currently write-locked by some open scope.
    locked: Mutex<HashSet<AccountId>>,
    released: Condvar,
    config: StoreConfig,
}

/// Transactional in-memory store backing both [`AccountStore`] and
/// [`PaymentStore`].
///
/// Each scope buffers its writes and applies them in one step on commit.
/// Accounts read with `get_for_update` stay locked until the scope ends, so a
/// second scope touching the same account waits instead of reading a stale
/// balance. Cloning yields another handle to the same ledger.
#[derive(Debug, Clone)]
pub struct InMemoryLedger {
    shared: Arc<Shared>,
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        log::trace!("InMemoryLedger initialized with {config:?}");
        Self {
            shared: Arc::new(Shared {
                committed: Mutex::new(Committed::default()),
                locked: Mutex::new(HashSet::new()),
                released: Condvar::new(),
                config,
            }),
        }
    }

    fn committed(&self) -> Result<MutexGuard<'_, Committed>, Error> {
        Ok(self
            .shared
            .committed
            .lock()
            .map_err(|_| StorageError::Poisoned)?)
    }

    fn check_scope(&self, scope: &MemoryScope) -> Result<(), Error> {
        if Arc::ptr_eq(&self.shared, &scope.shared) {
            Ok(())
        } else {
            Err(StorageError::Backend("scope belongs to a different ledger".to_string()).into())
        }
    }

    fn exists(&self, id: AccountId, scope: &MemoryScope) -> Result<bool, Error> {
        Ok(scope.accounts.contains_key(&id) || self.committed()?.accounts.contains_key(&id))
    }
}

/// An open transaction on an [`InMemoryLedger`].
///
/// Dropping a scope without committing discards its writes and releases its
/// locks, which is what happens on error and on unwinding.
#[derive(Debug)]
pub struct MemoryScope {
    shared: Arc<Shared>,
    ctx: CallContext,
    held: Vec<AccountId>,
    accounts: HashMap<AccountId, Account>,
    payments: Vec<Payment>,
}

impl MemoryScope {
    fn new(shared: Arc<Shared>, ctx: CallContext) -> Self {
        Self {
            shared,
            ctx,
            held: Vec::new(),
            accounts: HashMap::new(),
            payments: Vec::new(),
        }
    }

    fn holds(&self, id: AccountId) -> bool {
        self.held.contains(&id)
    }

    fn lock(&mut self, id: AccountId) -> Result<(), Error> {
        if self.holds(id) {
            return Ok(());
        }

        let timeout = self.shared.config.lock_timeout;
        let started = Instant::now();
        let mut locked = self
            .shared
            .locked
            .lock()
            .map_err(|_| StorageError::Poisoned)?;

        while locked.contains(&id) {
            if let Err(e) = self.ctx.check() {
                log::debug!("[lock] account={id} wait abandoned: {e}");
                return Err(e);
            }
            let waited = started.elapsed();
            if waited >= timeout {
                log::debug!("[lock] account={id} timed out after {waited:?}");
                return Err(StorageError::LockTimeout {
                    account: id,
                    waited,
                }
                .into());
            }

            let mut wait = (timeout - waited).min(CANCEL_POLL);
            if let Some(deadline) = self.ctx.deadline() {
                wait = wait.min(deadline.saturating_duration_since(Instant::now()));
            }
            let (guard, _) = self
                .shared
                .released
                .wait_timeout(locked, wait)
                .map_err(|_| StorageError::Poisoned)?;
            locked = guard;
        }

        locked.insert(id);
        self.held.push(id);
        log::trace!("[lock] account={id} acquired");
        Ok(())
    }

    fn commit(mut self) -> Result<(), Error> {
        let shared = Arc::clone(&self.shared);
        let mut committed = shared
            .committed
            .lock()
            .map_err(|_| StorageError::Poisoned)?;

        // Validate everything before applying anything.
        if let Some(payment) = self
            .payments
            .iter()
            .find(|p| committed.payment_ids.contains(&p.id()))
        {
            return Err(StorageError::DuplicatePayment {
                payment: payment.id(),
            }
            .into());
        }

        for (id, account) in self.accounts.drain() {
            committed.accounts.insert(id, account);
        }
        for payment in self.payments.drain(..) {
            committed.payment_ids.insert(payment.id());
            committed.payments.push(payment);
        }
        Ok(())
    }
}

impl Drop for MemoryScope {
    fn drop(&mut self) {
        if self.held.is_empty() {
            return;
        }
        let mut locked = match self.shared.locked.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        for id in self.held.drain(..) {
            locked.remove(&id);
        }
        drop(locked);
        self.shared.released.notify_all();
    }
}

impl AccountStore for InMemoryLedger {
    type Scope = MemoryScope;

    fn get(&self, id: AccountId) -> Result<Account, Error> {
        self.committed()?
            .accounts
            .get(&id)
            .cloned()
            .ok_or(Error::AccountNotFound { account: id })
    }

    fn get_for_update(&self, id: AccountId, scope: &mut MemoryScope) -> Result<Account, Error> {
        self.check_scope(scope)?;
        scope.lock(id)?;

        if let Some(account) = scope.accounts.get(&id) {
            return Ok(account.clone());
        }
        self.get(id)
    }

    fn create(&self, account: &Account, scope: &mut MemoryScope) -> Result<(), Error> {
        self.check_scope(scope)?;
        let id = account.id();
        scope.lock(id)?;

        if self.exists(id, scope)? {
            return Err(Error::AccountExists { account: id });
        }
        scope.accounts.insert(id, account.clone());
        Ok(())
    }

    fn store(&self, account: &Account, scope: &mut MemoryScope) -> Result<(), Error> {
        self.check_scope(scope)?;
        let id = account.id();
        if !scope.holds(id) {
            return Err(StorageError::NotLocked { account: id }.into());
        }
        if !self.exists(id, scope)? {
            return Err(Error::AccountNotFound { account: id });
        }
        scope.accounts.insert(id, account.clone());
        Ok(())
    }

    fn list(&self) -> Result<Vec<Account>, Error> {
        Ok(self.committed()?.accounts.values().cloned().collect())
    }
}

impl PaymentStore for InMemoryLedger {
    type Scope = MemoryScope;

    fn store(&self, payment: &Payment, scope: &mut MemoryScope) -> Result<(), Error> {
        self.check_scope(scope)?;
        let id = payment.id();
        if scope.payments.iter().any(|p| p.id() == id)
            || self.committed()?.payment_ids.contains(&id)
        {
            return Err(StorageError::DuplicatePayment { payment: id }.into());
        }
        scope.payments.push(payment.clone());
        Ok(())
    }

    fn list(&self) -> Result<Vec<Payment>, Error> {
        Ok(self.committed()?.payments.clone())
    }

    fn run_in_transaction<T, F>(&self, ctx: &CallContext, f: F) -> Result<T, Error>
    where
        F: FnOnce(&mut MemoryScope) -> Result<T, Error>,
    {
        let mut scope = MemoryScope::new(Arc::clone(&self.shared), ctx.clone());
        match f(&mut scope) {
            Ok(value) => {
                scope.commit()?;
                log::trace!("[tx] committed");
                Ok(value)
            }
            Err(e) => {
                log::debug!("[tx] rolled back: {e}");
                Err(e)
            }
        }
    }
}
