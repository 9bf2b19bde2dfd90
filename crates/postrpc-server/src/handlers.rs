//! Built-in demonstration methods: `add`, `getUser` and `greet`.

use postrpc_common::JsonRpcError;
use serde_json::{json, Map, Value};

use crate::registry::MethodRegistry;

/// Registry with every demonstration method.
pub fn demo_registry() -> MethodRegistry {
    let mut registry = MethodRegistry::new();
    registry
        .register("add", add)
        .register("getUser", get_user)
        .register("greet", greet);
    registry
}

/// `add([a, b, ...])`: sum of the first two elements.
pub fn add(params: Option<Value>) -> Result<Value, JsonRpcError> {
    let args = match params {
        Some(Value::Array(args)) if args.len() >= 2 => args,
        _ => {
            return Err(JsonRpcError::invalid_params(
                "expected array with at least 2 elements",
            ))
        }
    };
    let a = args[0]
        .as_f64()
        .ok_or_else(|| JsonRpcError::invalid_params("first parameter must be a number"))?;
    let b = args[1]
        .as_f64()
        .ok_or_else(|| JsonRpcError::invalid_params("second parameter must be a number"))?;

    Ok(number(a + b))
}

/// `getUser({"userId": n})`: a fixed user record carrying the requested id.
pub fn get_user(params: Option<Value>) -> Result<Value, JsonRpcError> {
    let fields = object(params, "expected object with userId field")?;
    let user_id = fields
        .get("userId")
        .and_then(Value::as_f64)
        .ok_or_else(|| JsonRpcError::invalid_params("userId must be a number"))?;

    Ok(json!({
        "ID": user_id.trunc() as i64,
        "Name": "Alice",
        "Role": "Admin",
    }))
}

/// `greet({"name": s})`: `"Hello, <name>!"`.
pub fn greet(params: Option<Value>) -> Result<Value, JsonRpcError> {
    let fields = object(params, "expected object with name field")?;
    let name = fields
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| JsonRpcError::invalid_params("name must be a string"))?;

    Ok(Value::String(format!("Hello, {}!", name)))
}

fn object(params: Option<Value>, detail: &str) -> Result<Map<String, Value>, JsonRpcError> {
    match params {
        Some(Value::Object(fields)) => Ok(fields),
        _ => Err(JsonRpcError::invalid_params(detail)),
    }
}

// Whole sums go out as integers so `8` is not written as `8.0`.
fn number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        json!(n as i64)
    } else {
        json!(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(err: JsonRpcError) -> String {
        assert_eq!(err.code, -32602);
        assert_eq!(err.message, "invalid params");
        err.data.unwrap().as_str().unwrap().to_string()
    }

    #[test]
    fn test_add_integers() {
        let sum = add(Some(json!([5, 3]))).unwrap();
        assert_eq!(sum.to_string(), "8");
    }

    #[test]
    fn test_add_fractions() {
        let sum = add(Some(json!([1.5, 2.25]))).unwrap();
        assert_eq!(sum.as_f64(), Some(3.75));
    }

    #[test]
    fn test_add_uses_first_two_elements() {
        assert_eq!(add(Some(json!([1, 2, 100]))).unwrap().as_i64(), Some(3));
    }

    #[test]
    fn test_add_invalid_params() {
        assert_eq!(
            data(add(Some(json!([1]))).unwrap_err()),
            "expected array with at least 2 elements"
        );
        assert_eq!(
            data(add(Some(json!({"a": 1, "b": 2}))).unwrap_err()),
            "expected array with at least 2 elements"
        );
        assert_eq!(data(add(None).unwrap_err()), "expected array with at least 2 elements");
        assert_eq!(
            data(add(Some(json!(["1", 2]))).unwrap_err()),
            "first parameter must be a number"
        );
        assert_eq!(
            data(add(Some(json!([1, null]))).unwrap_err()),
            "second parameter must be a number"
        );
    }

    #[test]
    fn test_get_user() {
        let user = get_user(Some(json!({"userId": 101}))).unwrap();
        assert_eq!(user["ID"].as_i64(), Some(101));
        assert_eq!(user["Name"], json!("Alice"));
        assert_eq!(user["Role"], json!("Admin"));
    }

    #[test]
    fn test_get_user_truncates_id() {
        let user = get_user(Some(json!({"userId": 7.9}))).unwrap();
        assert_eq!(user["ID"].as_i64(), Some(7));
    }

    #[test]
    fn test_get_user_invalid_params() {
        assert_eq!(
            data(get_user(Some(json!([101]))).unwrap_err()),
            "expected object with userId field"
        );
        assert_eq!(
            data(get_user(Some(json!({"userId": "101"}))).unwrap_err()),
            "userId must be a number"
        );
    }

    #[test]
    fn test_greet() {
        let greeting = greet(Some(json!({"name": "Bob"}))).unwrap();
        assert_eq!(greeting, json!("Hello, Bob!"));
    }

    #[test]
    fn test_greet_invalid_params() {
        assert_eq!(data(greet(None).unwrap_err()), "expected object with name field");
        assert_eq!(
            data(greet(Some(json!({"name": 5}))).unwrap_err()),
            "name must be a string"
        );
    }

    #[test]
    fn test_demo_registry_methods() {
        let registry = demo_registry();
        assert_eq!(registry.method_names(), vec!["add", "getUser", "greet"]);
        assert_eq!(registry.call("add", Some(json!([2, 2]))).unwrap().as_i64(), Some(4));
    }
}
