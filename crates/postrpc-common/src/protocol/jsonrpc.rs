//! JSON-RPC 2.0 Message Types
//!
//! Data structures for single and batch JSON-RPC messages as they travel
//! between a postrpc client and a server.
//!
//! # Wire Format
//!
//! - Request: `{"jsonrpc": "2.0", "method": "...", "params": ..., "id": 1}`
//!   (`params` is omitted entirely when there are no arguments)
//! - Response: `{"jsonrpc": "2.0", "result": ..., "error": ..., "id": 1}`
//! - Error: `{"code": -32601, "message": "...", "data": ...}`
//! - Batch: a JSON array of the above. Servers may answer a batch in any
//!   order, so responses are correlated by `id`, never by position.
//!
//! # Error Codes
//!
//! Standard JSON-RPC 2.0 error codes:
//! - `-32700`: Parse error
//! - `-32600`: Invalid request
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//! - `-32603`: Internal error
//! - `-32000` to `-32099`: Server error
//!
//! # Example
//!
//! ```
//! use postrpc_common::protocol::jsonrpc::{Request, Response, JsonRpcError};
//! use serde_json::json;
//!
//! let request = Request::new("add").with_params((5, 3)).unwrap().with_id(7);
//! assert_eq!(request.params, Some(json!([5, 3])));
//!
//! let response = Response::success(7, json!(8));
//! assert!(response.error.is_none());
//!
//! let failure = Response::failure(7, JsonRpcError::method_not_found());
//! assert_eq!(failure.error.unwrap().code, -32601);
//! ```

use std::collections::HashMap;
use std::ops::Deref;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::error::Result;
use super::params::{self, IntoParams};

/// Request identifier.
///
/// Single calls made through a client reuse the client's default id, which
/// is fine for one request per HTTP exchange but means concurrent calls from
/// the same client are indistinguishable by id on the wire. Do not rely on
/// these ids over a persistent, multiplexed connection.
pub type RequestId = i64;

/// Protocol version tag sent with every request.
pub const JSONRPC_VERSION: &str = "2.0";

fn default_version() -> String {
    JSONRPC_VERSION.into()
}

/// A JSON-RPC request.
///
/// Built by the caller (for raw and batch calls) or by the client on every
/// `call`. Once handed to the client it is serialized as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Request {
    /// Always `"2.0"` for requests built by this crate
    #[serde(default = "default_version")]
    pub jsonrpc: String,
    /// Name of the method to invoke, must not be empty
    pub method: String,
    /// Normalized parameters, omitted from the wire when `None`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// Request identifier
    #[serde(default)]
    pub id: RequestId,
}

impl Request {
    /// Creates a request without parameters and with id `0`.
    pub fn new(method: impl Into<String>) -> Self {
        Request {
            jsonrpc: default_version(),
            method: method.into(),
            params: None,
            id: 0,
        }
    }

    /// Sets the parameters from call arguments, normalizing them the same
    /// way `PostrpcClient::call` does.
    pub fn with_params(mut self, args: impl IntoParams) -> Result<Self> {
        self.params = params::to_params(args)?;
        Ok(self)
    }

    /// Sets an already-shaped `params` value verbatim.
    pub fn with_raw_params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }

    pub fn with_id(mut self, id: RequestId) -> Self {
        self.id = id;
        self
    }
}

/// A JSON-RPC response.
///
/// A well-formed response carries either `result` or `error`. Both absent
/// means a `null` result; both present is rejected when the body is decoded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Response {
    /// Protocol version, when the server sends one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<String>,
    /// Result value on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error object on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    /// Identifier of the originating request; missing or `null` reads as `0`
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: RequestId,
}

fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<RequestId, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RequestId>::deserialize(deserializer)?.unwrap_or_default())
}

impl Response {
    /// Create a success response
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: Some(default_version()),
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Create an error response
    pub fn failure(id: RequestId, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: Some(default_version()),
            result: None,
            error: Some(error),
            id,
        }
    }
}

/// JSON-RPC 2.0 error
///
/// Represents an application or protocol failure reported *inside* a
/// successful HTTP exchange. Displays as `"<code>: <message>"`.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[error("{code}: {message}")]
pub struct JsonRpcError {
    /// Error code (standard codes are negative integers)
    pub code: i64,
    /// Short description of the error
    pub message: String,
    /// Additional data (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

// Standard JSON-RPC 2.0 error codes
/// Invalid JSON was received by the server
pub const PARSE_ERROR: i64 = -32700;
/// The JSON sent is not a valid Request object
pub const INVALID_REQUEST: i64 = -32600;
/// The method does not exist / is not available
pub const METHOD_NOT_FOUND: i64 = -32601;
/// Invalid method parameter(s)
pub const INVALID_PARAMS: i64 = -32602;
/// Internal JSON-RPC error
pub const INTERNAL_ERROR: i64 = -32603;
/// Generic application-defined server error
pub const SERVER_ERROR: i64 = -32000;
/// Request entity too large
pub const REQUEST_TOO_LARGE: i64 = -32001;

impl JsonRpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Attaches a `data` member.
    pub fn with_data(mut self, data: impl Into<Value>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Create a parse error (-32700)
    ///
    /// Used when the server received invalid JSON.
    pub fn parse_error() -> Self {
        Self::new(PARSE_ERROR, "parse error")
    }

    /// Create an invalid request error (-32600)
    ///
    /// Used when the JSON sent is not a valid Request object.
    pub fn invalid_request() -> Self {
        Self::new(INVALID_REQUEST, "invalid request")
    }

    /// Create a method not found error (-32601)
    pub fn method_not_found() -> Self {
        Self::new(METHOD_NOT_FOUND, "method not found")
    }

    /// Create an invalid params error (-32602)
    ///
    /// `detail` explains which check failed and travels in `data`.
    pub fn invalid_params(detail: &str) -> Self {
        Self::new(INVALID_PARAMS, "invalid params").with_data(detail)
    }

    /// Create an internal error (-32603)
    pub fn internal_error(msg: &str) -> Self {
        Self::new(INTERNAL_ERROR, msg)
    }

    /// Create a server error (-32000)
    ///
    /// Used for application-defined errors in the -32000 to -32099 range.
    pub fn server_error(msg: &str) -> Self {
        Self::new(SERVER_ERROR, msg)
    }

    /// Create a request too large error (-32001)
    ///
    /// Used when the request body exceeds the maximum allowed size.
    pub fn request_too_large(limit: usize) -> Self {
        Self::new(
            REQUEST_TOO_LARGE,
            format!("Request body too large (max {} bytes)", limit),
        )
    }
}

/// Responses to a batch call, in whatever order the server produced them.
///
/// Correlate with the originating requests through [`get_by_id`](Self::get_by_id)
/// or [`as_map`](Self::as_map).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Responses(pub Vec<Response>);

impl Responses {
    /// Indexes the responses by id. When ids repeat, the later response wins.
    pub fn as_map(&self) -> HashMap<RequestId, &Response> {
        self.0.iter().map(|r| (r.id, r)).collect()
    }

    /// First response carrying `id`, or `None` if there is none.
    pub fn get_by_id(&self, id: RequestId) -> Option<&Response> {
        self.0.iter().find(|r| r.id == id)
    }

    /// True if any response carries a protocol error.
    pub fn has_error(&self) -> bool {
        self.0.iter().any(|r| r.error.is_some())
    }

    pub fn into_inner(self) -> Vec<Response> {
        self.0
    }
}

impl Deref for Responses {
    type Target = [Response];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Response>> for Responses {
    fn from(responses: Vec<Response>) -> Self {
        Responses(responses)
    }
}

impl IntoIterator for Responses {
    type Item = Response;
    type IntoIter = std::vec::IntoIter<Response>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Responses {
    type Item = &'a Response;
    type IntoIter = std::slice::Iter<'a, Response>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A decoded response body: one response for a single call, a list for a
/// batch.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Single(Box<Response>),
    Batch(Responses),
}
