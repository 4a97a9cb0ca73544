use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::Error;
use super::id::AccountId;
use super::money::Money;

/// Currencies an account can be denominated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Sgd,
    Gbp,
}

impl Currency {
    pub const ALL: [Currency; 4] = [Currency::Usd, Currency::Eur, Currency::Sgd, Currency::Gbp];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Sgd => "SGD",
            Currency::Gbp => "GBP",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::ALL
            .into_iter()
            .find(|currency| currency.code() == s)
            .ok_or_else(|| Error::InvalidCurrency {
                code: s.to_string(),
            })
    }
}

/// A balance-holding ledger account.
///
/// The currency is fixed at registration. Only the balance changes afterwards,
/// through [`Account::credit`] and [`Account::debit`], which keep it non-negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    id: AccountId,
    currency: Currency,
    balance: Money,
}

impl Account {
    /// A freshly registered account with a zero balance.
    pub fn new(id: AccountId, currency: Currency) -> Self {
        Self {
            id,
            currency,
            balance: Money::ZERO,
        }
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    /// Increase the balance by a strictly positive amount.
    pub(crate) fn credit(&mut self, amount: Money) -> Result<(), Error> {
        if amount.is_zero() {
            return Err(Error::InvalidAmount {
                account: self.id,
                amount,
            });
        }
        self.balance = self.balance.checked_add(amount)?;
        Ok(())
    }

    /// Decrease the balance by a strictly positive amount.
    ///
    /// Never overdraws: an amount above the balance fails and leaves the
    /// account untouched.
    pub(crate) fn debit(&mut self, amount: Money) -> Result<(), Error> {
        if amount.is_zero() {
            return Err(Error::InvalidAmount {
                account: self.id,
                amount,
            });
        }
        let remaining = self
            .balance
            .checked_sub(amount)
            .ok_or(Error::InsufficientBalance {
                account: self.id,
                balance: self.balance,
                requested: amount,
            })?;
        self.balance = remaining;
        Ok(())
    }
}
