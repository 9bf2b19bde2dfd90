use thiserror::Error;

use super::jsonrpc::{JsonRpcError, Response, ResponseBody, Responses};

/// Every way a postrpc call can fail.
///
/// The variants keep the three layers of a JSON-RPC exchange apart:
///
/// - the HTTP exchange itself ([`Transport`](Self::Transport),
///   [`Cancelled`](Self::Cancelled), [`Timeout`](Self::Timeout))
/// - an exchange that completed with a failing status
///   ([`HttpStatus`](Self::HttpStatus))
/// - an application error reported inside a well-formed response
///   ([`Protocol`](Self::Protocol))
///
/// Encoding and decoding problems are reported as
/// [`Serialization`](Self::Serialization) regardless of direction.
#[derive(Error, Debug)]
pub enum PostrpcError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    /// The server answered with a status of 400 or above.
    ///
    /// `body` holds the decoded JSON-RPC payload when the server also sent
    /// one, so a protocol error inside a failing response is not lost.
    #[error("rpc error status {status}")]
    HttpStatus {
        status: u16,
        body: Option<ResponseBody>,
    },

    #[error(transparent)]
    Protocol(#[from] JsonRpcError),

    #[error("empty request list")]
    EmptyBatch,

    #[error("invalid {expected}: {actual}")]
    InvalidType {
        expected: &'static str,
        actual: String,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl PostrpcError {
    /// HTTP status code, if this is an [`HttpStatus`](Self::HttpStatus) error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            PostrpcError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The decoded single response that accompanied a failing HTTP status.
    pub fn response(&self) -> Option<&Response> {
        match self {
            PostrpcError::HttpStatus {
                body: Some(ResponseBody::Single(response)),
                ..
            } => Some(response),
            _ => None,
        }
    }

    /// The decoded batch that accompanied a failing HTTP status.
    pub fn responses(&self) -> Option<&Responses> {
        match self {
            PostrpcError::HttpStatus {
                body: Some(ResponseBody::Batch(responses)),
                ..
            } => Some(responses),
            _ => None,
        }
    }

    /// The JSON-RPC error object, whether it was raised directly or arrived
    /// inside the body of a failing HTTP response.
    pub fn protocol_error(&self) -> Option<&JsonRpcError> {
        match self {
            PostrpcError::Protocol(err) => Some(err),
            _ => self.response().and_then(|r| r.error.as_ref()),
        }
    }

    /// True when the HTTP exchange never completed.
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            PostrpcError::Transport(_) | PostrpcError::Cancelled | PostrpcError::Timeout(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PostrpcError>;
