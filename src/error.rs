//! Error types and the central error translator.
//!
//! Two families live here:
//!
//! - [`ServerError`] covers infrastructure failures at startup (binding a
//!   socket, parsing configuration). Clients never see these.
//! - [`ApiError`] is what handlers return. Its [`IntoResponse`] impl is the
//!   single place in the crate that writes an error body, so every failure
//!   leaves as `{"success":false,"error":"…"}`.

use http::StatusCode;
use thiserror::Error;
use tracing::{error, warn};

use crate::response::{Envelope, IntoResponse, Response};
use crate::store::{FieldError, StoreError};

/// Startup and transport failures returned by [`Server`](crate::Server) and
/// [`Config`](crate::Config).
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid socket address `{addr}`: {source}")]
    InvalidAddress {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("config: {0}")]
    Config(String),
}

// ── ErrorResponse ─────────────────────────────────────────────────────────────

/// An application error with an explicit HTTP status.
///
/// Handlers build one at the point a semantic failure is detected (a missing
/// entity, an unreadable body) and return it; the translator sends the
/// message and status unchanged.
///
/// ```rust
/// use devcamper::ErrorResponse;
/// use http::StatusCode;
///
/// let err = ErrorResponse::new("Bootcamp not found with id of 42", StatusCode::NOT_FOUND);
/// assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorResponse {
    message: String,
    status_code: StatusCode,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, status_code: StatusCode) -> Self {
        Self { message: message.into(), status_code }
    }

    pub fn message(&self) -> &str { &self.message }
    pub fn status_code(&self) -> StatusCode { self.status_code }
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.status_code.as_u16())
    }
}

impl std::error::Error for ErrorResponse {}

// ── ApiError ──────────────────────────────────────────────────────────────────

/// Every failure a handler can propagate, tagged by kind.
///
/// | Variant | Status | Client message |
/// |---|---|---|
/// | `Application` | its own | its own |
/// | `InvalidId` | 404 | `Resource not found with id of <value>` |
/// | `Duplicate` | 400 | `Duplicate field value entered` |
/// | `Validation` | 400 | field messages joined with `, ` |
/// | `Unclassified` | 500 | `Server Error` |
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Application(#[from] ErrorResponse),

    #[error("malformed identifier `{value}`")]
    InvalidId { value: String },

    #[error("duplicate value `{value}` for unique field `{field}`")]
    Duplicate { field: String, value: String },

    #[error("validation failed: {}", join_messages(.0))]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    Unclassified(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Application(e) => e.status_code(),
            Self::InvalidId { .. } => StatusCode::NOT_FOUND,
            Self::Duplicate { .. } | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unclassified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message sent to the client. Unclassified details stay in the logs.
    pub fn client_message(&self) -> String {
        match self {
            Self::Application(e) => e.message().to_owned(),
            Self::InvalidId { value } => format!("Resource not found with id of {value}"),
            Self::Duplicate { .. } => "Duplicate field value entered".to_owned(),
            Self::Validation(errors) => join_messages(errors),
            Self::Unclassified(_) => "Server Error".to_owned(),
        }
    }
}

fn join_messages(errors: &[FieldError]) -> String {
    errors.iter().map(FieldError::message).collect::<Vec<_>>().join(", ")
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::InvalidId { value } => Self::InvalidId { value },
            StoreError::Validation(errors) => Self::Validation(errors),
            StoreError::Duplicate { field, value } => Self::Duplicate { field: field.to_owned(), value },
            StoreError::Backend(detail) => Self::Unclassified(detail),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::Unclassified(format!("json: {e}"))
    }
}

// ── Translation ───────────────────────────────────────────────────────────────

/// The central error translator.
///
/// Logs the failure, then writes the JSON error envelope with the status the
/// variant maps to. Runs exactly once per failed request.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "request rejected");
        }

        let body = serde_json::to_vec(&Envelope::<()>::error(self.client_message()))
            .unwrap_or_else(|_| br#"{"success":false,"error":"Server Error"}"#.to_vec());

        Response::builder().status(status).json(body)
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_json(response: &Response) -> serde_json::Value {
        serde_json::from_slice(response.body()).unwrap()
    }

    #[test]
    fn application_error_keeps_status_and_message() {
        let response = ErrorResponse::new("Bootcamp not found with id of 7", StatusCode::NOT_FOUND)
            .into_response();

        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(&response),
            serde_json::json!({ "success": false, "error": "Bootcamp not found with id of 7" })
        );
    }

    #[test]
    fn invalid_id_translates_to_not_found() {
        let response = ApiError::from(StoreError::InvalidId { value: "abc".into() }).into_response();

        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(&response)["error"], "Resource not found with id of abc");
    }

    #[test]
    fn duplicate_translates_to_bad_request() {
        let err = ApiError::from(StoreError::Duplicate { field: "name", value: "Foo".into() });
        let response = err.into_response();

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(&response)["error"], "Duplicate field value entered");
    }

    #[test]
    fn validation_joins_every_field_message() {
        let err = ApiError::from(StoreError::Validation(vec![
            FieldError::new("name", "Please add a name"),
            FieldError::new("email", "Please add a valid email"),
        ]));
        let response = err.into_response();

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(&response)["error"], "Please add a name, Please add a valid email");
    }

    #[test]
    fn unclassified_hides_detail() {
        let response = ApiError::Unclassified("connection reset by peer".into()).into_response();

        assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(&response),
            serde_json::json!({ "success": false, "error": "Server Error" })
        );
    }

    #[test]
    fn backend_store_failure_is_unclassified() {
        let err = ApiError::from(StoreError::Backend("disk full".into()));
        assert!(matches!(err, ApiError::Unclassified(ref d) if d == "disk full"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
