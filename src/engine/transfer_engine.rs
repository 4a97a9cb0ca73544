use super::account::{Account, Currency};
use super::context::CallContext;
use super::error::{AmountError, Error};
use super::id::AccountId;
use super::money::Money;
use super::payment::Payment;
use super::store::{AccountStore, PaymentStore};
use super::Decimal;

/// The amount of a transfer as supplied by a caller, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferAmount {
    /// Decimal text such as `"12.34"`.
    Text(String),
    /// An already-parsed decimal of arbitrary sign and scale.
    Value(Decimal),
    Money(Money),
}

impl TransferAmount {
    /// Validate into a strictly positive [`Money`].
    pub fn resolve(&self) -> Result<Money, AmountError> {
        match self {
            TransferAmount::Text(text) if text.is_empty() => Err(AmountError::Missing),
            TransferAmount::Text(text) => {
                let parsed = Money::parse(text)?;
                Money::validate_transfer_amount(Some(parsed.as_decimal()))
            }
            TransferAmount::Value(value) => Money::validate_transfer_amount(Some(*value)),
            TransferAmount::Money(money) => {
                Money::validate_transfer_amount(Some(money.as_decimal()))
            }
        }
    }
}

impl From<&str> for TransferAmount {
    fn from(text: &str) -> Self {
        TransferAmount::Text(text.to_string())
    }
}

impl From<String> for TransferAmount {
    fn from(text: String) -> Self {
        TransferAmount::Text(text)
    }
}

impl From<Decimal> for TransferAmount {
    fn from(value: Decimal) -> Self {
        TransferAmount::Value(value)
    }
}

impl From<Money> for TransferAmount {
    fn from(money: Money) -> Self {
        TransferAmount::Money(money)
    }
}

/// Moves money between accounts.
///
/// Every mutation runs inside one scope from [`PaymentStore::run_in_transaction`]:
/// both balances and the payment record are committed together or not at all.
/// The engine keeps no mutable state of its own and holds no lock across store
/// calls, so one instance can be shared by any number of threads.
#[derive(Debug, Clone)]
pub struct TransferEngine<A, P> {
    accounts: A,
    payments: P,
}

impl<A, P> TransferEngine<A, P>
where
    P: PaymentStore,
    A: AccountStore<Scope = P::Scope>,
{
    pub fn new(accounts: A, payments: P) -> Self {
        log::trace!("TransferEngine initialized");
        Self { accounts, payments }
    }

    /// Move `amount` from `from` to `to`.
    ///
    /// Amount and participants are validated before storage is touched. Both
    /// accounts are then locked, checked for matching currency and sufficient
    /// balance, updated, and committed together with the new payment.
    pub fn transfer(
        &self,
        ctx: &CallContext,
        to: AccountId,
        from: AccountId,
        amount: impl Into<TransferAmount>,
    ) -> Result<Payment, Error> {
        let amount = amount.into().resolve()?;
        if to == from {
            return Err(Error::SameAccount { account: to });
        }
        ctx.check()?;

        log::trace!("[transfer] to={to} from={from} amount={amount}");

        let payment = self.payments.run_in_transaction(ctx, |scope| {
            let (mut to_account, mut from_account) = self.lock_pair(to, from, scope)?;
            ctx.check()?;

            if to_account.currency() != from_account.currency() {
                return Err(Error::CurrencyMismatch {
                    to,
                    to_currency: to_account.currency(),
                    from,
                    from_currency: from_account.currency(),
                });
            }

            if from_account.balance() < amount {
                return Err(Error::InsufficientBalance {
                    account: from,
                    balance: from_account.balance(),
                    requested: amount,
                });
            }

            #[cfg(debug_assertions)]
            let before = (to_account.balance(), from_account.balance());

            let payment = Payment::transfer(to, from, amount);
            from_account.debit(amount)?;
            to_account.credit(amount)?;

            #[cfg(debug_assertions)]
            assert_conserved(before, (to_account.balance(), from_account.balance()));

            self.accounts.store(&from_account, scope)?;
            self.accounts.store(&to_account, scope)?;
            self.payments.store(&payment, scope)?;

            ctx.check()?;
            Ok(payment)
        })?;

        log::debug!(
            "[transfer] payment={} to={to} from={from} amount={amount} committed",
            payment.id()
        );
        Ok(payment)
    }

    /// Credit `to` with funds entering the ledger from outside, with no
    /// paired debit. The payment is recorded without a source account.
    pub fn credit_external(
        &self,
        ctx: &CallContext,
        to: AccountId,
        amount: impl Into<TransferAmount>,
    ) -> Result<Payment, Error> {
        let amount = amount.into().resolve()?;
        ctx.check()?;

        log::trace!("[credit] to={to} amount={amount}");

        let payment = self.payments.run_in_transaction(ctx, |scope| {
            let mut to_account = self.accounts.get_for_update(to, scope)?;
            ctx.check()?;

            let payment = Payment::external_credit(to, amount);
            to_account.credit(amount)?;

            self.accounts.store(&to_account, scope)?;
            self.payments.store(&payment, scope)?;

            ctx.check()?;
            Ok(payment)
        })?;

        log::debug!(
            "[credit] payment={} to={to} amount={amount} committed",
            payment.id()
        );
        Ok(payment)
    }

    /// Register a new account with a zero balance.
    pub fn open_account(
        &self,
        ctx: &CallContext,
        id: AccountId,
        currency: Currency,
    ) -> Result<Account, Error> {
        self.open_account_with_balance(ctx, id, currency, Money::ZERO)
    }

    /// Register a new account holding `balance`.
    ///
    /// A non-zero balance is recorded as an external credit in the same
    /// transaction as the registration, so the account either exists with its
    /// full opening balance or does not exist at all.
    pub fn open_account_with_balance(
        &self,
        ctx: &CallContext,
        id: AccountId,
        currency: Currency,
        balance: Money,
    ) -> Result<Account, Error> {
        ctx.check()?;

        let account = self.payments.run_in_transaction(ctx, |scope| {
            let mut account = Account::new(id, currency);
            self.accounts.create(&account, scope)?;

            if !balance.is_zero() {
                account.credit(balance)?;
                self.accounts.store(&account, scope)?;
                self.payments.store(&Payment::external_credit(id, balance), scope)?;
            }

            ctx.check()?;
            Ok(account)
        })?;

        log::debug!("[open] account={id} currency={currency} balance={balance} created");
        Ok(account)
    }

    /// Committed state of one account.
    pub fn account(&self, id: AccountId) -> Result<Account, Error> {
        self.accounts.get(id)
    }

    /// All committed accounts, in the store's order.
    pub fn accounts(&self) -> Result<Vec<Account>, Error> {
        self.accounts.list()
    }

    /// All committed payments, in the store's order.
    pub fn payments(&self) -> Result<Vec<Payment>, Error> {
        self.payments.list()
    }

    /// Lock both accounts in ascending id order so that two transfers over the
    /// same pair in opposite directions cannot deadlock.
    fn lock_pair(
        &self,
        to: AccountId,
        from: AccountId,
        scope: &mut P::Scope,
    ) -> Result<(Account, Account), Error> {
        if to < from {
            let to_account = self.accounts.get_for_update(to, scope)?;
            let from_account = self.accounts.get_for_update(from, scope)?;
            Ok((to_account, from_account))
        } else {
            let from_account = self.accounts.get_for_update(from, scope)?;
            let to_account = self.accounts.get_for_update(to, scope)?;
            Ok((to_account, from_account))
        }
    }
}

/// Debug-only check that a transfer neither created nor destroyed value.
#[cfg(debug_assertions)]
fn assert_conserved(before: (Money, Money), after: (Money, Money)) {
    let total = |(a, b): (Money, Money)| a.minor_units() + b.minor_units();
    debug_assert_eq!(
        total(before),
        total(after),
        "Invariant violated: balances before {before:?} != after {after:?}"
    );
}
