//! JSON-RPC router for the demonstration server.
//!
//! Turns a raw request body into the body to send back, or into nothing at
//! all when the request was a notification.
//!
//! # Routing rules
//!
//! - Invalid JSON: parse error (`-32700`) with id `0`
//! - Empty array: invalid request (`-32600`) with id `0` and data
//!   `"empty batch"`
//! - Non-empty array: one response per element, in request order. Elements
//!   that are not requests get a parse error with id `0`; elements without
//!   an id still get a response, with id `null`
//! - Single object: the method's result or error. When the id is absent or
//!   `null` the request is a notification: the method still runs but
//!   nothing is written back
//!
//! Ids are echoed back verbatim, so servers accept string ids even though
//! the postrpc client only ever sends integers.

use std::sync::Arc;

use postrpc_common::JsonRpcError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::registry::MethodRegistry;

/// A request as the server sees it. Unlike the client's request type the id
/// can be any JSON value, or absent.
#[derive(Debug, Deserialize)]
struct Call {
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    params: Option<Value>,
    #[serde(default)]
    id: Option<Value>,
}

/// One response written by the server.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Reply {
    pub jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Value,
}

impl Reply {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn failure(id: Value, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0",
            result: None,
            error: Some(error),
            id,
        }
    }

    fn from_outcome(id: Value, outcome: Result<Value, JsonRpcError>) -> Self {
        match outcome {
            Ok(result) => Self::success(id, result),
            Err(error) => Self::failure(id, error),
        }
    }
}

/// Body written back for a request.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum RouterReply {
    Single(Reply),
    Batch(Vec<Reply>),
}

/// Routes decoded JSON-RPC requests to the methods of a [`MethodRegistry`].
#[derive(Debug, Clone)]
pub struct RpcRouter {
    registry: Arc<MethodRegistry>,
}

impl RpcRouter {
    pub fn new(registry: MethodRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    /// Handles a complete request body. `None` means nothing is written.
    pub fn handle_body(&self, body: &[u8]) -> Option<RouterReply> {
        let value: Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to parse JSON-RPC request: {}", e);
                return Some(RouterReply::Single(parse_error(&e)));
            }
        };

        match value {
            Value::Array(items) if items.is_empty() => Some(RouterReply::Single(Reply::failure(
                json!(0),
                JsonRpcError::invalid_request().with_data("empty batch"),
            ))),
            Value::Array(items) => Some(RouterReply::Batch(
                items.into_iter().map(|item| self.handle_batch_item(item)).collect(),
            )),
            single => self.handle_single(single).map(RouterReply::Single),
        }
    }

    fn handle_single(&self, value: Value) -> Option<Reply> {
        let call: Call = match serde_json::from_value(value) {
            Ok(call) => call,
            Err(e) => return Some(parse_error(&e)),
        };

        let method = call.method.unwrap_or_default();
        if method.is_empty() {
            return call.id.map(|id| Reply::failure(id, method_required()));
        }

        let outcome = self.registry.call(&method, call.params);
        call.id.map(|id| Reply::from_outcome(id, outcome))
    }

    fn handle_batch_item(&self, item: Value) -> Reply {
        let call: Call = match serde_json::from_value(item) {
            Ok(call) => call,
            Err(e) => return parse_error(&e),
        };

        let id = call.id.unwrap_or(Value::Null);
        match call.method.filter(|m| !m.is_empty()) {
            Some(method) => Reply::from_outcome(id, self.registry.call(&method, call.params)),
            None => Reply::failure(id, method_required()),
        }
    }
}

fn parse_error(e: &serde_json::Error) -> Reply {
    Reply::failure(json!(0), JsonRpcError::parse_error().with_data(e.to_string()))
}

fn method_required() -> JsonRpcError {
    JsonRpcError::invalid_request().with_data("method is required")
}
