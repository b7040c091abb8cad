//! Response envelope shared by every service result.
//!
//! ```json
//! { "responseCode": "00", "message": "Transaction created", "data": 17 }
//! { "responseCode": "01", "message": "Validation failed",
//!   "errors": [{ "field": "items", "message": "items must not be empty" }] }
//! ```

use serde::Serialize;

use crate::error::{ApiError, ApiResult, FieldError};

/// Response code for success.
pub const RESPONSE_OK: &str = "00";

/// Response code for any failure.
pub const RESPONSE_FAILED: &str = "01";

/// The JSON envelope a router writes back to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub response_code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl<T: Serialize> ApiResponse<T> {
    /// A successful response carrying `data`.
    pub fn success(message: impl Into<String>, data: T) -> Self {
        ApiResponse {
            response_code: RESPONSE_OK,
            message: message.into(),
            data: Some(data),
            errors: None,
        }
    }

    /// A failed response for `err`.
    pub fn failure(err: &ApiError) -> Self {
        ApiResponse {
            response_code: RESPONSE_FAILED,
            message: err.message.clone(),
            data: None,
            errors: if err.errors.is_empty() {
                None
            } else {
                Some(err.errors.clone())
            },
        }
    }

    /// Turns a service result into `(http_status, envelope)`.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let (status, body) = ApiResponse::respond(
    ///     services.transactions().create(user_id, &request).await,
    ///     201,
    ///     "Transaction created",
    /// );
    /// ```
    pub fn respond(result: ApiResult<T>, success_status: u16, message: &str) -> (u16, Self) {
        match result {
            Ok(data) => (success_status, ApiResponse::success(message, data)),
            Err(err) => (err.status(), ApiResponse::failure(&err)),
        }
    }
}
