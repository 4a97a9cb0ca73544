use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::account::Currency;
use super::error::Error;
use super::id::{AccountId, PaymentId};
use super::money::Money;
use super::payment::Payment;

/// Raw account row (`id,currency,balance`) as parsed from CSV input.
/// This is the unvalidated form; the batch loader validates each row.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountRecord {
    pub id: String,
    pub currency: String,
    pub balance: String,
}

/// Raw transfer row (`to,from,amount`) as parsed from CSV input.
#[derive(Debug, Clone, Deserialize)]
pub struct TransferRecord {
    pub to: String,
    pub from: String,
    pub amount: String,
}

/// Exported payment row. `from` is empty for external credits.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentRecord {
    pub id: PaymentId,
    pub to: AccountId,
    pub from: Option<AccountId>,
    pub amount: Money,
    pub timestamp: DateTime<Utc>,
}

/// A validated account row: the account to register and its starting funds.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OpeningBalance {
    pub id: AccountId,
    pub currency: Currency,
    pub balance: Money,
}

/// A validated transfer row. The amount is well-formed but not yet checked
/// for being positive; that is left to the engine.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TransferRequest {
    pub to: AccountId,
    pub from: AccountId,
    pub amount: Money,
}

impl TryFrom<AccountRecord> for OpeningBalance {
    type Error = Error;

    fn try_from(record: AccountRecord) -> Result<Self, Self::Error> {
        Ok(OpeningBalance {
            id: record.id.parse()?,
            currency: record.currency.parse()?,
            balance: Money::parse(&record.balance)?,
        })
    }
}

impl TryFrom<TransferRecord> for TransferRequest {
    type Error = Error;

    fn try_from(record: TransferRecord) -> Result<Self, Self::Error> {
        Ok(TransferRequest {
            to: record.to.parse()?,
            from: record.from.parse()?,
            amount: Money::parse(&record.amount)?,
        })
    }
}

impl From<&Payment> for PaymentRecord {
    fn from(payment: &Payment) -> Self {
        PaymentRecord {
            id: payment.id(),
            to: payment.to(),
            from: payment.from(),
            amount: payment.amount(),
            timestamp: payment.timestamp(),
        }
    }
}

impl std::fmt::Display for TransferRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "transfer (to: {}, from: {}, amount: {})",
            self.to, self.from, self.amount
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::error::{AmountError, IdError};

    const A: &str = "b0505aa0-b927-4667-a484-906b4e2a410b";
    const B: &str = "5d4bc7a4-9f5f-4b0e-8a5f-3f1c6a7e2d11";

    fn account_record(id: &str, currency: &str, balance: &str) -> AccountRecord {
        AccountRecord {
            id: id.to_string(),
            currency: currency.to_string(),
            balance: balance.to_string(),
        }
    }

    fn transfer_record(to: &str, from: &str, amount: &str) -> TransferRecord {
        TransferRecord {
            to: to.to_string(),
            from: from.to_string(),
            amount: amount.to_string(),
        }
    }

    #[test]
    fn test_valid_account_record() {
        let opening = OpeningBalance::try_from(account_record(A, "USD", "30.33")).unwrap();
        assert_eq!(opening.id.to_string(), A);
        assert_eq!(opening.currency, Currency::Usd);
        assert_eq!(opening.balance.format(), "30.33");
    }

    #[test]
    fn test_account_record_zero_balance() {
        let opening = OpeningBalance::try_from(account_record(A, "GBP", "0")).unwrap();
        assert_eq!(opening.balance, Money::ZERO);
    }

    #[test]
    fn test_account_record_unknown_currency() {
        let err = OpeningBalance::try_from(account_record(A, "JPY", "1.00")).unwrap_err();
        assert!(matches!(err, Error::InvalidCurrency { code } if code == "JPY"));
    }

    #[test]
    fn test_account_record_lowercase_currency() {
        let err = OpeningBalance::try_from(account_record(A, "usd", "1.00")).unwrap_err();
        assert!(matches!(err, Error::InvalidCurrency { .. }));
    }

    #[test]
    fn test_account_record_negative_balance() {
        let err = OpeningBalance::try_from(account_record(A, "USD", "-5.00")).unwrap_err();
        assert!(matches!(err, Error::Amount(AmountError::Negative)));
    }

    #[test]
    fn test_valid_transfer_record() {
        let request = TransferRequest::try_from(transfer_record(B, A, "1.23")).unwrap();
        assert_eq!(request.to.to_string(), B);
        assert_eq!(request.from.to_string(), A);
        assert_eq!(request.amount.format(), "1.23");
    }

    #[test]
    fn test_transfer_record_bad_id() {
        let err = TransferRequest::try_from(transfer_record("not-a-uuid", A, "1.00")).unwrap_err();
        assert!(matches!(
            err,
            Error::Id(IdError::Malformed { kind: "account", .. })
        ));

        let err = TransferRequest::try_from(transfer_record(B, "", "1.00")).unwrap_err();
        assert!(matches!(err, Error::Id(IdError::Empty { .. })));
    }

    #[test]
    fn test_transfer_record_bad_amount() {
        let err = TransferRequest::try_from(transfer_record(B, A, "12abc")).unwrap_err();
        assert!(matches!(
            err,
            Error::Amount(AmountError::InvalidFormat { .. })
        ));

        let err = TransferRequest::try_from(transfer_record(B, A, "0.001")).unwrap_err();
        assert!(matches!(
            err,
            Error::Amount(AmountError::InvalidPrecision { scale: 3 })
        ));
    }

    #[test]
    fn test_payment_record_from_external_credit() {
        let to: AccountId = A.parse().unwrap();
        let payment = Payment::external_credit(to, Money::parse("5.00").unwrap());
        let record = PaymentRecord::from(&payment);
        assert_eq!(record.to, to);
        assert_eq!(record.from, None);
        assert_eq!(record.id, payment.id());
    }
}
