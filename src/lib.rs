//! # devcamper
//!
//! A JSON API for a bootcamp directory: list, fetch, create, update and
//! delete, over a document store.
//!
//! ## The error convention
//!
//! Handlers are plain `async fn(Request) -> Result<_, ApiError>`. They never
//! write an error body. Every failure goes to one place, the
//! [`IntoResponse`] impl of [`ApiError`]:
//!
//! | Failure | Status |
//! |---|---|
//! | [`ErrorResponse`] (e.g. bootcamp not found) | its own |
//! | malformed id | 404 |
//! | schema validation | 400 |
//! | duplicate unique field | 400 |
//! | anything else, including a handler panic | 500 |
//!
//! Every response has the shape `{ "success": bool, "data"?, "count"?, "error"? }`.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use devcamper::{app, MemoryStore, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), devcamper::ServerError> {
//!     let router = app(Arc::new(MemoryStore::new()));
//!     Server::bind("0.0.0.0:5000")?.serve(router).await
//! }
//! ```

mod error;
mod handler;
mod middleware;
mod request;
mod response;
mod router;
mod server;

pub mod bootcamps;
pub mod config;
pub mod model;
pub mod store;

pub use config::{Config, Mode};
pub use error::{ApiError, ErrorResponse, ServerError};
pub use handler::Handler;
pub use model::{Bootcamp, Career};
pub use request::Request;
pub use response::{Envelope, IntoResponse, Json, Response};
pub use router::Router;
pub use server::Server;
pub use store::{BootcampStore, MemoryStore, SharedStore};

/// The full application: bootcamp routes backed by `store`.
pub fn app(store: SharedStore) -> Router {
    bootcamps::routes(Router::new().state(store))
}
