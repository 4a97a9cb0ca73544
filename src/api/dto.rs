//! JSON bodies of the HTTP interface.

use serde::{Deserialize, Serialize};

use crate::engine::{Account, AccountId, Money, Payment, PaymentId};

/// Body of `POST /v1/transfer`. Fields are kept as text so that each can be
/// reported individually when missing or malformed.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TransferRequest {
    pub to: Option<String>,
    pub from: Option<String>,
    pub amount: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PaymentDto {
    pub id: PaymentId,
    pub to: AccountId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<AccountId>,
    pub amount: Money,
}

impl From<&Payment> for PaymentDto {
    fn from(payment: &Payment) -> Self {
        PaymentDto {
            id: payment.id(),
            to: payment.to(),
            from: payment.from(),
            amount: payment.amount(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransferResponse {
    pub payment: PaymentDto,
}

/// Serializes as `{}` when there are no payments.
#[derive(Debug, Serialize)]
pub struct PaymentsResponse {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub payments: Vec<PaymentDto>,
}

/// Serializes as `{}` when there are no accounts.
#[derive(Debug, Serialize)]
pub struct AccountsResponse {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub accounts: Vec<Account>,
}
