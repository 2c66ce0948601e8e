//! Radix-tree request router.
//!
//! One tree per HTTP method, O(path-length) lookup. Unmatched requests get
//! the same JSON error envelope as every other failure.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use http::{Extensions, Method, StatusCode};
use http_body_util::Full;
use matchit::Router as MatchitRouter;

use crate::error::ErrorResponse;
use crate::handler::{BoxedHandler, Handler};
use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// The application router.
///
/// Build it once at startup and pass it to [`Server::serve`](crate::Server::serve).
/// Every registration returns `self` so calls chain.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    state: Extensions,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), state: Extensions::new() }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` reads them.
    ///
    /// # Panics
    ///
    /// Panics if `path` conflicts with a route already registered for
    /// `method`. Routes are fixed at startup, so this is a programming error.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::GET, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::POST, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::PUT, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::DELETE, path, handler)
    }

    /// Attach shared state. Handlers read it back with
    /// [`Request::state`](crate::Request::state). One value per type.
    pub fn state<T: Clone + Send + Sync + 'static>(mut self, value: T) -> Self {
        self.state.insert(value);
        self
    }

    /// Runs one buffered request through routing and its handler.
    ///
    /// This is what the server calls per request; it is public so the whole
    /// application can be exercised without a socket.
    pub async fn handle(&self, req: http::Request<Bytes>) -> http::Response<Full<Bytes>> {
        self.dispatch(req).await.into_inner()
    }

    pub(crate) async fn dispatch(&self, req: http::Request<Bytes>) -> Response {
        let (mut parts, body) = req.into_parts();

        match self.lookup(&parts.method, parts.uri.path()) {
            Some((handler, params)) => {
                parts.extensions.extend(self.state.clone());
                handler.call(Request::new(parts, body, params)).await
            }
            None => ErrorResponse::new("Route not found", StatusCode::NOT_FOUND).into_response(),
        }
    }

    /// A single trailing slash is ignored: `/bootcamps/` matches `/bootcamps`.
    pub(crate) fn lookup(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let path = match path.strip_suffix('/') {
            Some(trimmed) if !trimmed.is_empty() => trimmed,
            _ => path,
        };
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn echo_id(req: Request) -> Response {
        Response::json(req.param("id").unwrap_or_default().to_owned())
    }

    async fn read_state(req: Request) -> Response {
        Response::json(req.state::<&'static str>().copied().unwrap_or("missing"))
    }

    fn get(uri: &str) -> http::Request<Bytes> {
        http::Request::builder().uri(uri).body(Bytes::new()).unwrap()
    }

    #[tokio::test]
    async fn params_reach_the_handler() {
        let router = Router::new().get("/items/{id}", echo_id);
        let response = router.dispatch(get("/items/42")).await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.body(), b"42");
    }

    #[tokio::test]
    async fn trailing_slash_is_ignored() {
        let router = Router::new().get("/items/{id}", echo_id);
        let response = router.dispatch(get("/items/7/")).await;

        assert_eq!(response.body(), b"7");
    }

    #[tokio::test]
    async fn unknown_route_is_json_not_found() {
        let router = Router::new().get("/items/{id}", echo_id);
        let response = router.dispatch(get("/nothing")).await;

        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(response.body(), br#"{"success":false,"error":"Route not found"}"#);
    }

    #[tokio::test]
    async fn method_is_part_of_the_match() {
        let router = Router::new().get("/items/{id}", echo_id);
        let req = http::Request::builder()
            .method(Method::DELETE)
            .uri("/items/1")
            .body(Bytes::new())
            .unwrap();

        assert_eq!(router.dispatch(req).await.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn state_is_visible_to_handlers() {
        let router = Router::new().state("shared").get("/state", read_state);
        let response = router.dispatch(get("/state")).await;

        assert_eq!(response.body(), b"shared");
    }
}
