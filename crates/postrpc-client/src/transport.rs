//! HTTP exchange abstraction.
//!
//! The client needs exactly one capability from the network: send a fully
//! formed HTTP request and hand back the status, headers and complete body.
//! [`Transport`] is that seam. [`HyperTransport`] is the default
//! implementation; tests and embedders can plug in their own.
//!
//! # Connection handling
//!
//! `HyperTransport` wraps a `hyper_util` pooled client, so keep-alive
//! connections are reused across calls and across clones of the transport.
//! It speaks plain `http://` only. TLS, proxies and retries belong in a
//! custom transport.

use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use postrpc_common::{PostrpcError, Result};

/// Outgoing HTTP request with a fully buffered body
pub type HttpRequest = hyper::Request<Bytes>;

/// HTTP response with its body read to completion
pub type HttpResponse = hyper::Response<Bytes>;

/// Performs one HTTP exchange.
///
/// Implementations must read the response body to completion before
/// returning and must not inspect the status: a 500 is a successful
/// exchange as far as the transport is concerned. Failing to complete the
/// exchange at all should be reported as [`PostrpcError::Transport`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Default transport backed by a pooling hyper client.
#[derive(Clone)]
pub struct HyperTransport {
    client: Client<HttpConnector, Full<Bytes>>,
}

impl HyperTransport {
    pub fn new() -> Self {
        Self {
            client: Client::builder(TokioExecutor::new()).build_http(),
        }
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HyperTransport {
    async fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse> {
        let response = self
            .client
            .request(request.map(Full::new))
            .await
            .map_err(|e| PostrpcError::Transport(format!("HTTP request failed: {}", e)))?;

        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| PostrpcError::Transport(format!("Failed to read response: {}", e)))?
            .to_bytes();

        Ok(HttpResponse::from_parts(parts, body))
    }
}
