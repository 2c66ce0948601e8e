//! HTTP server and graceful shutdown.
//!
//! On SIGTERM or Ctrl-C the server:
//! 1. stops calling `listener.accept()`, so no new connections are made;
//! 2. lets every in-flight connection task run to completion;
//! 3. returns from [`Server::serve`], which lets `main` exit cleanly.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::error::{ErrorResponse, ServerError};
use crate::middleware::trace;
use crate::response::{IntoResponse, Response};
use crate::router::Router;

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
    request_logging: bool,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// ```rust,no_run
    /// use devcamper::Server;
    /// let server = Server::bind("0.0.0.0:5000")?;
    /// # Ok::<(), devcamper::ServerError>(())
    /// ```
    pub fn bind(addr: &str) -> Result<Self, ServerError> {
        let parsed = addr.parse().map_err(|source| ServerError::InvalidAddress {
            addr: addr.to_owned(),
            source,
        })?;
        Ok(Self::from_addr(parsed))
    }

    pub fn from_addr(addr: SocketAddr) -> Self {
        Self { addr, request_logging: false }
    }

    /// Log one line per request (method, path, status, latency).
    pub fn request_logging(mut self, enabled: bool) -> Self {
        self.request_logging = enabled;
        self
    }

    /// Accepts connections until SIGTERM or Ctrl-C, then drains in-flight
    /// requests and returns.
    pub async fn serve(self, router: Router) -> Result<(), ServerError> {
        self.serve_with_shutdown(router, shutdown_signal()).await
    }

    /// Like [`serve`](Server::serve), but stops when `signal` resolves.
    pub async fn serve_with_shutdown(
        self,
        router: Router,
        signal: impl Future<Output = ()>,
    ) -> Result<(), ServerError> {
        let listener = TcpListener::bind(self.addr).await?;
        let router = Arc::new(router);
        let request_logging = self.request_logging;

        info!(addr = %self.addr, "devcamper listening");

        let mut tasks = tokio::task::JoinSet::new();
        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Check shutdown first so a SIGTERM stops accepting at once,
                // even if more connections are queued.
                biased;

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let router = Arc::clone(&router);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // Called once per request on the connection.
                        let svc = service_fn(move |req| {
                            let router = Arc::clone(&router);
                            async move { dispatch(router, req, request_logging).await }
                        });

                        // HTTP/1.1 or HTTP/2, whatever the client negotiates.
                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet stays bounded.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("devcamper stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Buffers one request body, routes it, and produces one response.
///
/// Every failure is turned into a response here, so hyper never sees an
/// error.
async fn dispatch(
    router: Arc<Router>,
    req: hyper::Request<Incoming>,
    request_logging: bool,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let handle = async move {
        let (parts, body) = req.into_parts();
        match body.collect().await {
            Ok(collected) => {
                router.dispatch(http::Request::from_parts(parts, collected.to_bytes())).await
            }
            Err(e) => {
                warn!("failed to read request body: {e}");
                unreadable_body()
            }
        }
    };

    let response = if request_logging {
        trace::log_request(method, path, handle).await
    } else {
        handle.await
    };

    Ok(response.into_inner())
}

fn unreadable_body() -> Response {
    ErrorResponse::new("Unable to read request body", StatusCode::BAD_REQUEST).into_response()
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM or SIGINT (Ctrl-C). On Windows only Ctrl-C
/// is available.
///
/// If a handler cannot be installed, that source is logged and ignored.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => { stream.recv().await; }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_rejects_bad_address() {
        let err = Server::bind("not-an-address").err().unwrap();
        assert!(matches!(err, ServerError::InvalidAddress { ref addr, .. } if addr == "not-an-address"));
    }

    #[test]
    fn bind_accepts_host_and_port() {
        let server = Server::bind("127.0.0.1:5000").unwrap().request_logging(true);
        assert_eq!(server.addr.port(), 5000);
        assert!(server.request_logging);
    }

    #[tokio::test]
    async fn serve_returns_after_shutdown_signal() {
        let server = Server::bind("127.0.0.1:0").unwrap();
        server.serve_with_shutdown(Router::new(), async {}).await.unwrap();
    }

    #[test]
    fn unreadable_body_is_bad_request() {
        assert_eq!(unreadable_body().status_code(), StatusCode::BAD_REQUEST);
    }
}
