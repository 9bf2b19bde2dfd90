//! HTTP Server for the postrpc demonstration service
//!
//! This module provides the HTTP/1.1 server that exposes a [`MethodRegistry`]
//! as a JSON-RPC 2.0 endpoint, using hyper.
//!
//! # Architecture
//!
//! The HTTP server:
//! - Listens on a TCP socket for incoming HTTP connections
//! - Spawns a tokio task for each connection
//! - Serves JSON-RPC on a single configured path (`/rpc` by default)
//! - Answers CORS preflight (`OPTIONS`) requests
//! - Reads bodies up to a size limit and hands them to the [`RpcRouter`]
//!
//! # Example
//!
//! ```no_run
//! use postrpc_server::{demo_registry, HttpServer};
//!
//! #[tokio::main]
//! async fn main() {
//!     let server = HttpServer::new(demo_registry());
//!     server.run("127.0.0.1:8080".parse().unwrap()).await.unwrap();
//! }
//! ```

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE,
};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::{TokioIo, TokioTimer};
use postrpc_common::{JsonRpcError, PostrpcError, Result};
use serde_json::json;
use tokio::net::TcpListener;

use crate::http_router::{Reply, RouterReply, RpcRouter};
use crate::registry::MethodRegistry;

/// Response type produced by the server
pub type HyperResponse = Response<Full<Bytes>>;

/// Default maximum request body size (10 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Path the JSON-RPC endpoint is served on; every other path is a 404
    pub path: String,
    /// Largest accepted request body, in bytes
    pub max_body_bytes: usize,
    /// How long a client may take to send the request head
    pub header_read_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            path: "/rpc".to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            header_read_timeout: Duration::from_secs(10),
        }
    }
}

impl ServerConfig {
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }
}

/// HTTP server for a method registry.
pub struct HttpServer {
    router: Arc<RpcRouter>,
    config: Arc<ServerConfig>,
}

impl HttpServer {
    /// Creates a server with the default [`ServerConfig`].
    pub fn new(registry: MethodRegistry) -> Self {
        Self::with_config(registry, ServerConfig::default())
    }

    pub fn with_config(registry: MethodRegistry, config: ServerConfig) -> Self {
        Self {
            router: Arc::new(RpcRouter::new(registry)),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Binds `addr` and serves forever.
    pub async fn run(self, addr: SocketAddr) -> Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| PostrpcError::Transport(format!("Failed to bind to {}: {}", addr, e)))?;

        self.run_until(listener, std::future::pending()).await
    }

    /// Serves connections from `listener` until `shutdown` completes.
    ///
    /// Connections already accepted when `shutdown` fires are allowed to
    /// finish on their own tasks.
    pub async fn run_until<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let local_addr = listener
            .local_addr()
            .map_err(|e| PostrpcError::Transport(format!("Failed to get local address: {}", e)))?;
        tracing::info!(
            "HTTP server listening on http://{}{}",
            local_addr,
            self.config.path
        );

        tokio::pin!(shutdown);

        loop {
            let stream = tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, _)) => stream,
                    Err(e) => {
                        tracing::error!("Failed to accept connection: {}", e);
                        continue;
                    }
                },
                _ = &mut shutdown => break,
            };

            let io = TokioIo::new(stream);
            let router = self.router.clone();
            let config = self.config.clone();

            tokio::task::spawn(async move {
                let header_read_timeout = config.header_read_timeout;
                let service = service_fn(move |req| {
                    let router = router.clone();
                    let config = config.clone();
                    async move { Self::handle_request(&router, &config, req).await }
                });

                if let Err(err) = http1::Builder::new()
                    .timer(TokioTimer::new())
                    .header_read_timeout(header_read_timeout)
                    .serve_connection(io, service)
                    .await
                {
                    tracing::error!("Error serving connection: {}", err);
                }
            });
        }

        tracing::info!("HTTP server on {} shut down", local_addr);
        Ok(())
    }

    /// Handles one HTTP request. Every outcome is an HTTP response.
    async fn handle_request<B>(
        router: &RpcRouter,
        config: &ServerConfig,
        req: Request<B>,
    ) -> std::result::Result<HyperResponse, Infallible>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        if req.uri().path() != config.path {
            return Ok(not_found());
        }

        if req.method() == Method::OPTIONS {
            return Ok(preflight());
        }

        if req.method() != Method::POST {
            let reply = Reply::failure(
                json!(0),
                JsonRpcError::invalid_request().with_data("only POST method is supported"),
            );
            return Ok(json_response(&RouterReply::Single(reply)));
        }

        let body = match Limited::new(req.into_body(), config.max_body_bytes)
            .collect()
            .await
        {
            Ok(collected) => collected.to_bytes(),
            Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
                let reply = Reply::failure(
                    json!(0),
                    JsonRpcError::request_too_large(config.max_body_bytes),
                );
                return Ok(json_response(&RouterReply::Single(reply)));
            }
            Err(e) => {
                tracing::error!("Failed to read request body: {}", e);
                let reply = Reply::failure(
                    json!(0),
                    JsonRpcError::parse_error().with_data(e.to_string()),
                );
                return Ok(json_response(&RouterReply::Single(reply)));
            }
        };

        Ok(match router.handle_body(&body) {
            Some(reply) => json_response(&reply),
            None => with_cors(Response::new(Full::new(Bytes::new()))),
        })
    }
}

fn json_response(reply: &RouterReply) -> HyperResponse {
    let body = match serde_json::to_vec(reply) {
        Ok(body) => body,
        Err(e) => {
            tracing::error!("Failed to encode response: {}", e);
            Vec::new()
        }
    };

    let mut response = Response::new(Full::new(Bytes::from(body)));
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    with_cors(response)
}

fn with_cors(mut response: HyperResponse) -> HyperResponse {
    response
        .headers_mut()
        .insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}

fn preflight() -> HyperResponse {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = StatusCode::NO_CONTENT;
    let headers = response.headers_mut();
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}

fn not_found() -> HyperResponse {
    let mut response = Response::new(Full::new(Bytes::from_static(b"404 page not found\n")));
    *response.status_mut() = StatusCode::NOT_FOUND;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}
