use serde_json::json;

use super::ApiResponse;
use crate::engine::{Error, ErrorKind};

pub const BAD_REQUEST: u16 = 400;
pub const NOT_FOUND: u16 = 404;
pub const METHOD_NOT_ALLOWED: u16 = 405;
pub const INTERNAL_SERVER_ERROR: u16 = 500;
pub const SERVICE_UNAVAILABLE: u16 = 503;

pub fn json_error(status: u16, message: impl Into<String>) -> ApiResponse {
    ApiResponse {
        status,
        body: json!({ "error": message.into() }).to_string(),
    }
}

pub fn not_found() -> ApiResponse {
    json_error(NOT_FOUND, "Not Found")
}

pub fn method_not_allowed() -> ApiResponse {
    json_error(METHOD_NOT_ALLOWED, "Method Not Allowed")
}

/// Store failures are logged in full but reported generically.
pub fn internal_error() -> ApiResponse {
    json_error(INTERNAL_SERVER_ERROR, "Internal Server Error")
}

pub fn ledger_error_to_response(err: &Error) -> ApiResponse {
    match err.kind() {
        ErrorKind::Validation | ErrorKind::Business => json_error(BAD_REQUEST, err.to_string()),
        ErrorKind::NotFound => json_error(NOT_FOUND, err.to_string()),
        ErrorKind::Interrupted => {
            log::warn!("[api] request interrupted: {err}");
            json_error(SERVICE_UNAVAILABLE, err.to_string())
        }
        ErrorKind::Infrastructure => {
            log::error!("[api] {err}");
            internal_error()
        }
    }
}
