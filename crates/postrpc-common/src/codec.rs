//! Encoding of outgoing requests and decoding of response bodies.
//!
//! Bodies are first parsed into a [`serde_json::Value`] (numbers keep their
//! source text) so that strict mode can look for unknown members before the
//! value is turned into [`Response`]s.

use serde::de::Error as _;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::protocol::error::{PostrpcError, Result};
use crate::protocol::jsonrpc::{Request, Response, Responses};
use crate::protocol::value::kind_name;

const RESPONSE_FIELDS: &[&str] = &["jsonrpc", "result", "error", "id"];
const ERROR_FIELDS: &[&str] = &["code", "message", "data"];

/// JSON codec for request and response bodies.
///
/// `allow_unknown_fields` mirrors the client option of the same name: when
/// it is `false`, a response (or its `error` object) containing any member
/// not defined by the protocol fails to decode.
///
/// # Example
///
/// ```
/// use postrpc_common::JsonCodec;
///
/// let codec = JsonCodec::new(false);
/// let response = codec.decode_response(br#"{"result": 8, "id": 0}"#).unwrap();
/// assert_eq!(response.get_int().unwrap(), 8);
///
/// assert!(codec.decode_response(br#"{"result": 8, "id": 0, "extra": 1}"#).is_err());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    allow_unknown_fields: bool,
}

impl JsonCodec {
    pub fn new(allow_unknown_fields: bool) -> Self {
        Self { allow_unknown_fields }
    }

    pub fn allows_unknown_fields(&self) -> bool {
        self.allow_unknown_fields
    }

    /// Encode a single request to bytes
    pub fn encode_request(&self, request: &Request) -> Result<Vec<u8>> {
        encode(request)
    }

    /// Encode a batch of requests as a JSON array
    pub fn encode_batch(&self, requests: &[Request]) -> Result<Vec<u8>> {
        encode(requests)
    }

    /// Decode the body of a single call.
    pub fn decode_response(&self, data: &[u8]) -> Result<Response> {
        let value: Value = serde_json::from_slice(data)?;
        self.response_from_value(value)
    }

    /// Decode the body of a batch call.
    pub fn decode_responses(&self, data: &[u8]) -> Result<Responses> {
        let value: Value = serde_json::from_slice(data)?;
        let items = match value {
            Value::Array(items) => items,
            other => return Err(shape_error("array", &other)),
        };

        let responses = items
            .into_iter()
            .map(|item| self.response_from_value(item))
            .collect::<Result<Vec<_>>>()?;
        Ok(Responses(responses))
    }

    fn response_from_value(&self, value: Value) -> Result<Response> {
        let object = match &value {
            Value::Object(object) => object,
            other => return Err(shape_error("object", other)),
        };

        if !self.allow_unknown_fields {
            reject_unknown(object, RESPONSE_FIELDS)?;
            if let Some(Value::Object(error)) = object.get("error") {
                reject_unknown(error, ERROR_FIELDS)?;
            }
        }

        let response: Response = serde_json::from_value(value)?;
        if response.result.is_some() && response.error.is_some() {
            return Err(PostrpcError::InvalidResponse(format!(
                "response {} carries both result and error",
                response.id
            )));
        }
        Ok(response)
    }
}

fn encode<T: Serialize + ?Sized>(message: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(message)?)
}

fn reject_unknown(object: &Map<String, Value>, known: &'static [&'static str]) -> Result<()> {
    match object.keys().find(|key| !known.contains(&key.as_str())) {
        Some(key) => Err(serde_json::Error::unknown_field(key, known).into()),
        None => Ok(()),
    }
}

fn shape_error(expected: &str, found: &Value) -> PostrpcError {
    serde_json::Error::custom(format!(
        "expected a JSON {} response body, found {}",
        expected,
        kind_name(found)
    ))
    .into()
}
