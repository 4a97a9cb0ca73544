//! HTTP-shaped front end over a [`TransferEngine`].
//!
//! [`Api::handle`] takes a method, path and body and returns the status and
//! JSON body to send, so it can sit behind any HTTP server.
//!
//! | Endpoint       | Method | Success body                          |
//! |----------------|--------|---------------------------------------|
//! | `/v1/transfer` | POST   | `{"payment":{"id","to","from","amount"}}` |
//! | `/v1/payments` | GET    | `{"payments":[...]}`, `{}` when empty |
//! | `/v1/accounts` | GET    | `{"accounts":[...]}`, `{}` when empty |
//!
//! Errors are `{"error":"<message>"}`.

mod dto;
mod errors;

use serde::Serialize;

use crate::engine::{
    AccountId, AccountStore, CallContext, IdError, Money, PaymentStore, TransferEngine,
};
use dto::{AccountsResponse, PaymentDto, PaymentsResponse, TransferRequest, TransferResponse};
use errors::{json_error, ledger_error_to_response, BAD_REQUEST};

/// Content type of every response.
pub const CONTENT_TYPE: &str = "application/json; charset=utf-8";

const OK: u16 = 200;

/// Status code and JSON body of a handled request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => ApiResponse { status, body },
            Err(e) => {
                log::error!("[api] failed to encode response: {e}");
                errors::internal_error()
            }
        }
    }

    pub fn content_type(&self) -> &'static str {
        CONTENT_TYPE
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Routes requests to a shared [`TransferEngine`].
#[derive(Debug, Clone)]
pub struct Api<A, P> {
    engine: TransferEngine<A, P>,
}

impl<A, P> Api<A, P>
where
    P: PaymentStore,
    A: AccountStore<Scope = P::Scope>,
{
    pub fn new(engine: TransferEngine<A, P>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &TransferEngine<A, P> {
        &self.engine
    }

    pub fn handle(&self, ctx: &CallContext, method: &str, path: &str, body: &[u8]) -> ApiResponse {
        log::trace!("[api] {method} {path}");

        let response = match (path, method) {
            ("/v1/transfer", "POST") => self.transfer(ctx, body).unwrap_or_else(|e| e),
            ("/v1/payments", "GET") => self.payments(),
            ("/v1/accounts", "GET") => self.accounts(),
            ("/v1/transfer" | "/v1/payments" | "/v1/accounts", _) => errors::method_not_allowed(),
            _ => errors::not_found(),
        };

        log::debug!("[api] {method} {path} -> {}", response.status);
        response
    }

    fn transfer(&self, ctx: &CallContext, body: &[u8]) -> Result<ApiResponse, ApiResponse> {
        let request: TransferRequest =
            serde_json::from_slice(body).map_err(|e| json_error(BAD_REQUEST, e.to_string()))?;

        let from = required("from", request.from)?;
        let to = required("to", request.to)?;
        let amount = required("amount", request.amount)?;

        let from = account_id("from", &from)?;
        let to = account_id("to", &to)?;
        let amount = Money::parse(&amount).map_err(|e| ledger_error_to_response(&e.into()))?;

        let payment = self
            .engine
            .transfer(ctx, to, from, amount)
            .map_err(|e| ledger_error_to_response(&e))?;

        Ok(ApiResponse::json(
            OK,
            &TransferResponse {
                payment: PaymentDto::from(&payment),
            },
        ))
    }

    fn payments(&self) -> ApiResponse {
        match self.engine.payments() {
            Ok(payments) => ApiResponse::json(
                OK,
                &PaymentsResponse {
                    payments: payments.iter().map(PaymentDto::from).collect(),
                },
            ),
            Err(e) => ledger_error_to_response(&e),
        }
    }

    fn accounts(&self) -> ApiResponse {
        match self.engine.accounts() {
            Ok(accounts) => ApiResponse::json(OK, &AccountsResponse { accounts }),
            Err(e) => ledger_error_to_response(&e),
        }
    }
}

fn required(field: &str, value: Option<String>) -> Result<String, ApiResponse> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(json_error(BAD_REQUEST, format!("{field} is required"))),
    }
}

fn account_id(field: &str, value: &str) -> Result<AccountId, ApiResponse> {
    value.parse().map_err(|e: IdError| {
        let reason = match &e {
            IdError::Malformed { reason, .. } => reason.clone(),
            IdError::Empty { .. } => e.to_string(),
        };
        json_error(
            BAD_REQUEST,
            format!("Invalid account ID for field {field:?}: {reason}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Currency, InMemoryLedger};

    fn api() -> Api<InMemoryLedger, InMemoryLedger> {
        let ledger = InMemoryLedger::new();
        Api::new(TransferEngine::new(ledger.clone(), ledger))
    }

    #[test]
    fn test_required_fields_in_order() {
        let api = api();
        let ctx = CallContext::background();

        let cases = [
            (r#"{}"#, "from is required"),
            (r#"{"from":""}"#, "from is required"),
            (r#"{"from":"x"}"#, "to is required"),
            (r#"{"from":"x","to":"y","amount":null}"#, "amount is required"),
        ];
        for (body, message) in cases {
            let response = api.handle(&ctx, "POST", "/v1/transfer", body.as_bytes());
            assert_eq!(response.status, 400, "{body}");
            assert_eq!(response.body, format!(r#"{{"error":"{message}"}}"#));
        }
    }

    #[test]
    fn test_nil_account_id_is_rejected() {
        let api = api();
        let body = r#"{"from":"00000000-0000-0000-0000-000000000000","to":"b0505aa0-b927-4667-a484-906b4e2a410b","amount":"1.00"}"#;
        let response = api.handle(&CallContext::background(), "POST", "/v1/transfer", body.as_bytes());
        assert_eq!(response.status, 400);
        assert!(response.body.contains(r#"Invalid account ID for field \"from\""#));
    }

    #[test]
    fn test_cancelled_request_maps_to_unavailable() {
        let api = api();
        let ctx = CallContext::background();
        let a = AccountId::new();
        let b = AccountId::new();
        api.engine().open_account(&ctx, a, Currency::Usd).unwrap();
        api.engine().open_account(&ctx, b, Currency::Usd).unwrap();
        api.engine().credit_external(&ctx, a, "5.00").unwrap();

        let (cancelled, handle) = CallContext::cancellable();
        handle.cancel();
        let body = format!(r#"{{"from":"{a}","to":"{b}","amount":"1.00"}}"#);
        let response = api.handle(&cancelled, "POST", "/v1/transfer", body.as_bytes());

        assert_eq!(response.status, 503);
        assert_eq!(api.engine().account(a).unwrap().balance().format(), "5.00");
    }

    #[test]
    fn test_content_type() {
        let response = api().handle(&CallContext::background(), "GET", "/nope", b"");
        assert_eq!(response.content_type(), "application/json; charset=utf-8");
        assert!(!response.is_success());
    }
}
