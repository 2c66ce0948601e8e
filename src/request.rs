//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use http::request::Parts;
use http::StatusCode;

use crate::error::{ApiError, ErrorResponse};
use crate::store::Document;

/// An incoming HTTP request with its body fully buffered and its route
/// parameters resolved.
pub struct Request {
    pub(crate) parts: Parts,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    pub(crate) fn new(parts: Parts, body: Bytes, params: HashMap<String, String>) -> Self {
        Self { parts, body, params }
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/bootcamps/{id}`, `req.param("id")` on `/bootcamps/42`
    /// returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Like [`param`](Self::param), but a missing parameter is an error.
    ///
    /// Only a route registered without the placeholder can trigger this, so
    /// it is reported as a server fault.
    pub fn require_param(&self, key: &str) -> Result<&str, ApiError> {
        self.param(key)
            .ok_or_else(|| ApiError::Unclassified(format!("route has no `{key}` parameter")))
    }

    /// Shared state attached with [`Router::state`](crate::Router::state).
    pub fn state<T: Clone + Send + Sync + 'static>(&self) -> Option<&T> {
        self.parts.extensions.get::<T>()
    }

    /// Parses the body as a JSON object.
    ///
    /// An empty body reads as `{}`. Malformed JSON, or JSON that is not an
    /// object, is a `400`.
    pub fn json_object(&self) -> Result<Document, ApiError> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Document::new());
        }

        match serde_json::from_slice::<serde_json::Value>(&self.body) {
            Ok(serde_json::Value::Object(map)) => Ok(map),
            Ok(_) => Err(ErrorResponse::new(
                "Request body must be a JSON object",
                StatusCode::BAD_REQUEST,
            ).into()),
            Err(e) => Err(ErrorResponse::new(
                format!("Invalid JSON in request body: {e}"),
                StatusCode::BAD_REQUEST,
            ).into()),
        }
    }
}
