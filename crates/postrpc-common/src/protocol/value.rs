//! Typed access to a response's `result`.
//!
//! Responses are decoded with `serde_json`'s `arbitrary_precision` support,
//! so a numeric result keeps its exact source text until one of these
//! accessors picks a target type. `9223372036854775807` comes back from
//! [`Response::get_int`] unchanged instead of being rounded through `f64`.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::{PostrpcError, Result};
use super::jsonrpc::Response;

/// Name of the JSON kind of `value`, for error messages.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn invalid(expected: &'static str, result: Option<&Value>) -> PostrpcError {
    PostrpcError::InvalidType {
        expected,
        actual: result.map_or_else(|| "null".to_string(), Value::to_string),
    }
}

impl Response {
    /// The result as a 64-bit signed integer.
    ///
    /// Fails with `InvalidType` if the result is not a number, or if its
    /// text is not an integer that fits in `i64` (`8.0` and `1e3` included).
    pub fn get_int(&self) -> Result<i64> {
        match &self.result {
            Some(Value::Number(n)) => n.as_i64().ok_or_else(|| invalid("int", self.result.as_ref())),
            other => Err(invalid("int", other.as_ref())),
        }
    }

    /// The result as a 64-bit float.
    pub fn get_float(&self) -> Result<f64> {
        match &self.result {
            Some(Value::Number(n)) => n.as_f64().ok_or_else(|| invalid("float", self.result.as_ref())),
            other => Err(invalid("float", other.as_ref())),
        }
    }

    pub fn get_bool(&self) -> Result<bool> {
        match &self.result {
            Some(Value::Bool(b)) => Ok(*b),
            other => Err(invalid("bool", other.as_ref())),
        }
    }

    pub fn get_string(&self) -> Result<String> {
        match &self.result {
            Some(Value::String(s)) => Ok(s.clone()),
            other => Err(invalid("string", other.as_ref())),
        }
    }

    /// Decodes the result into any deserializable type.
    ///
    /// The result is re-encoded to JSON text and parsed into `T`, so `T`'s
    /// own serde attributes apply (e.g. `#[serde(deny_unknown_fields)]`).
    /// A missing result is treated as `null`.
    pub fn get_object<T: DeserializeOwned>(&self) -> Result<T> {
        let text = serde_json::to_string(&self.result)?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn decode(body: &str) -> Response {
        serde_json::from_str(body).unwrap()
    }

    #[derive(Debug, Deserialize, PartialEq)]
    #[allow(non_snake_case)]
    struct User {
        ID: i64,
        Name: String,
        Role: String,
    }

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct StrictPoint {
        #[allow(dead_code)]
        x: i32,
    }

    #[test]
    fn test_get_int_keeps_full_precision() {
        let response = decode(r#"{"result": 9223372036854775807, "id": 1}"#);
        assert_eq!(response.get_int().unwrap(), i64::MAX);
    }

    #[test]
    fn test_get_int_negative() {
        let response = decode(r#"{"result": -9223372036854775808, "id": 1}"#);
        assert_eq!(response.get_int().unwrap(), i64::MIN);
    }

    #[test]
    fn test_get_int_rejects_out_of_range() {
        let response = decode(r#"{"result": 9223372036854775808, "id": 1}"#);
        assert!(matches!(
            response.get_int(),
            Err(PostrpcError::InvalidType { expected: "int", .. })
        ));
    }

    #[test]
    fn test_get_int_rejects_fraction() {
        let response = decode(r#"{"result": 8.0, "id": 1}"#);
        assert!(matches!(response.get_int(), Err(PostrpcError::InvalidType { .. })));
    }

    #[test]
    fn test_get_int_rejects_string() {
        let response = decode(r#"{"result": "42", "id": 1}"#);
        let err = response.get_int().unwrap_err();
        assert_eq!(err.to_string(), r#"invalid int: "42""#);
    }

    #[test]
    fn test_get_float() {
        assert_eq!(decode(r#"{"result": 8, "id": 0}"#).get_float().unwrap(), 8.0);
        assert_eq!(decode(r#"{"result": 2.5, "id": 0}"#).get_float().unwrap(), 2.5);
    }

    #[test]
    fn test_get_float_rejects_non_number() {
        let response = decode(r#"{"result": true, "id": 0}"#);
        assert!(matches!(
            response.get_float(),
            Err(PostrpcError::InvalidType { expected: "float", .. })
        ));
    }

    #[test]
    fn test_get_bool_and_string() {
        assert!(decode(r#"{"result": true, "id": 0}"#).get_bool().unwrap());
        assert_eq!(
            decode(r#"{"result": "Hello, Bob!", "id": 0}"#).get_string().unwrap(),
            "Hello, Bob!"
        );
        assert!(decode(r#"{"result": 1, "id": 0}"#).get_bool().is_err());
        assert!(decode(r#"{"result": 1, "id": 0}"#).get_string().is_err());
    }

    #[test]
    fn test_missing_result_is_invalid_for_scalars() {
        let response = decode(r#"{"id": 0}"#);
        let err = response.get_bool().unwrap_err();
        assert_eq!(err.to_string(), "invalid bool: null");
    }

    #[test]
    fn test_get_object_into_struct() {
        let response = decode(r#"{"result": {"ID": 101, "Name": "Alice", "Role": "Admin"}, "id": 0}"#);
        let user: User = response.get_object().unwrap();
        assert_eq!(
            user,
            User { ID: 101, Name: "Alice".into(), Role: "Admin".into() }
        );
    }

    #[test]
    fn test_get_object_shape_mismatch() {
        let response = decode(r#"{"result": [1, 2], "id": 0}"#);
        assert!(matches!(
            response.get_object::<User>(),
            Err(PostrpcError::Serialization(_))
        ));
    }

    #[test]
    fn test_get_object_strict_target_rejects_unknown_fields() {
        let response = decode(r#"{"result": {"x": 1, "y": 2}, "id": 0}"#);
        assert!(matches!(
            response.get_object::<StrictPoint>(),
            Err(PostrpcError::Serialization(_))
        ));
    }

    #[test]
    fn test_get_object_missing_result_as_option() {
        let response = decode(r#"{"id": 0}"#);
        let value: Option<User> = response.get_object().unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_get_object_preserves_large_integers() {
        let response = decode(r#"{"result": {"big": 18446744073709551615}, "id": 0}"#);
        let value: std::collections::HashMap<String, u64> = response.get_object().unwrap();
        assert_eq!(value["big"], u64::MAX);
    }

    #[test]
    fn test_kind_name() {
        assert_eq!(kind_name(&json!(null)), "null");
        assert_eq!(kind_name(&json!([1])), "array");
        assert_eq!(kind_name(&json!({"a": 1})), "object");
    }
}
