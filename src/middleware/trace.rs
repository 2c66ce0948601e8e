//! Request logging.
//!
//! Enabled with [`Server::request_logging`](crate::Server::request_logging),
//! which `main` turns on in development mode. Each request runs inside an
//! `http.request` span, and one `info` line is emitted once the response is
//! ready.

use std::future::Future;
use std::time::Instant;

use http::Method;
use tracing::{info, info_span, Instrument};

use crate::response::Response;

pub(crate) async fn log_request<F>(method: Method, path: String, dispatch: F) -> Response
where
    F: Future<Output = Response>,
{
    let span = info_span!("http.request", %method, path = %path);
    let started = Instant::now();
    let response = dispatch.instrument(span.clone()).await;

    span.in_scope(|| {
        info!(
            status = response.status_code().as_u16(),
            latency_ms = started.elapsed().as_secs_f64() * 1000.0,
            "{method} {path}"
        );
    });
    response
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;

    #[tokio::test]
    async fn response_passes_through_unchanged() {
        let response = log_request(Method::GET, "/x".into(), async {
            Response::status(StatusCode::ACCEPTED)
        })
        .await;

        assert_eq!(response.status_code(), StatusCode::ACCEPTED);
    }
}
