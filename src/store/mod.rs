//! The bootcamp store contract.
//!
//! Handlers only see [`BootcampStore`]. It has four observable failure
//! modes: a malformed id, a schema violation, a uniqueness conflict, and
//! everything else. Absence is not a failure; lookups return `Ok(None)`.

mod memory;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::Bootcamp;

pub use memory::MemoryStore;

/// An untyped JSON object as sent by a client.
pub type Document = Map<String, Value>;

/// The store as handlers hold it.
pub type SharedStore = Arc<dyn BootcampStore>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cast to id failed for value `{value}`")]
    InvalidId { value: String },

    #[error("validation failed: {}", describe(.0))]
    Validation(Vec<FieldError>),

    #[error("duplicate key on `{field}`: `{value}`")]
    Duplicate { field: &'static str, value: String },

    #[error("store backend: {0}")]
    Backend(String),
}

fn describe(errors: &[FieldError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// One schema violation, tied to the field that caused it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    path: String,
    message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { path: path.into(), message: message.into() }
    }

    pub fn path(&self) -> &str { &self.path }
    pub fn message(&self) -> &str { &self.message }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Options for [`BootcampStore::update_by_id`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Return the entity as it is after the update instead of before.
    pub return_updated: bool,
    /// Enforce the schema's constraints, not only its types.
    pub run_validators: bool,
}

#[async_trait]
pub trait BootcampStore: Send + Sync {
    /// Every bootcamp, in insertion order.
    async fn find_all(&self) -> Result<Vec<Bootcamp>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Bootcamp>, StoreError>;

    /// Validates `payload` against the full schema and stores it under a new id.
    async fn create(&self, payload: Document) -> Result<Bootcamp, StoreError>;

    /// Overlays the fields present in `payload` onto the stored entity.
    async fn update_by_id(
        &self,
        id: &str,
        payload: Document,
        options: UpdateOptions,
    ) -> Result<Option<Bootcamp>, StoreError>;

    /// Removes the entity and returns it.
    async fn delete_by_id(&self, id: &str) -> Result<Option<Bootcamp>, StoreError>;
}
