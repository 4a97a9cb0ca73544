use chrono::{DateTime, Utc};

use super::id::{AccountId, PaymentId};
use super::money::Money;

/// Which balances a payment moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentKind {
    /// Value moved from one ledger account to another.
    Transfer { to: AccountId, from: AccountId },
    /// Value entered the ledger from outside; only `to` was credited.
    ExternalCredit { to: AccountId },
}

/// Immutable, append-only record of one completed balance movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    id: PaymentId,
    kind: PaymentKind,
    amount: Money,
    timestamp: DateTime<Utc>,
}

impl Payment {
    pub(crate) fn transfer(to: AccountId, from: AccountId, amount: Money) -> Self {
        Self {
            id: PaymentId::new(),
            kind: PaymentKind::Transfer { to, from },
            amount,
            timestamp: Utc::now(),
        }
    }

    pub(crate) fn external_credit(to: AccountId, amount: Money) -> Self {
        Self {
            id: PaymentId::new(),
            kind: PaymentKind::ExternalCredit { to },
            amount,
            timestamp: Utc::now(),
        }
    }

    pub fn id(&self) -> PaymentId {
        self.id
    }

    pub fn kind(&self) -> PaymentKind {
        self.kind
    }

    /// The credited account.
    pub fn to(&self) -> AccountId {
        match self.kind {
            PaymentKind::Transfer { to, .. } | PaymentKind::ExternalCredit { to } => to,
        }
    }

    /// The debited account, absent for external credits.
    pub fn from(&self) -> Option<AccountId> {
        match self.kind {
            PaymentKind::Transfer { from, .. } => Some(from),
            PaymentKind::ExternalCredit { .. } => None,
        }
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
