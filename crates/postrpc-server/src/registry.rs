//! Method registry for the demonstration server.
//!
//! Methods are plain synchronous functions from the request's `params` to a
//! result value or a JSON-RPC error. The registry is built once, before the
//! server starts, and is read-only afterwards.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use postrpc_common::JsonRpcError;
use serde_json::Value;

/// A registered method. `None` means the request carried no `params`.
pub type MethodHandler = Arc<dyn Fn(Option<Value>) -> Result<Value, JsonRpcError> + Send + Sync>;

/// Explicit mapping from method name to handler.
///
/// # Example
///
/// ```
/// use postrpc_server::MethodRegistry;
/// use serde_json::{json, Value};
///
/// let mut registry = MethodRegistry::new();
/// registry.register("echo", |params| Ok(params.unwrap_or(Value::Null)));
///
/// assert_eq!(registry.call("echo", Some(json!([1]))).unwrap(), json!([1]));
/// assert_eq!(registry.call("nope", None).unwrap_err().code, -32601);
/// ```
#[derive(Clone, Default)]
pub struct MethodRegistry {
    methods: HashMap<String, MethodHandler>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `name`, replacing any previous handler.
    pub fn register<F>(&mut self, name: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(Option<Value>) -> Result<Value, JsonRpcError> + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Arc::new(handler));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Registered method names, sorted.
    pub fn method_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Invokes `name`, or fails with "method not found".
    pub fn call(&self, name: &str, params: Option<Value>) -> Result<Value, JsonRpcError> {
        match self.methods.get(name) {
            Some(handler) => handler(params),
            None => Err(JsonRpcError::method_not_found()),
        }
    }
}

impl fmt::Debug for MethodRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodRegistry")
            .field("methods", &self.method_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_register_and_call() {
        let mut registry = MethodRegistry::new();
        registry.register("double", |params| {
            let n = params
                .as_ref()
                .and_then(|p| p[0].as_i64())
                .ok_or_else(|| JsonRpcError::invalid_params("expected a number"))?;
            Ok(json!(n * 2))
        });

        assert!(registry.contains("double"));
        assert_eq!(registry.call("double", Some(json!([21]))).unwrap(), json!(42));
        assert_eq!(registry.call("double", None).unwrap_err().code, -32602);
    }

    #[test]
    fn test_unknown_method() {
        let registry = MethodRegistry::new();
        let err = registry.call("missing", None).unwrap_err();
        assert_eq!(err, JsonRpcError::method_not_found());
    }

    #[test]
    fn test_register_replaces_existing() {
        let mut registry = MethodRegistry::new();
        registry
            .register("v", |_| Ok(json!(1)))
            .register("v", |_| Ok(json!(2)));
        assert_eq!(registry.call("v", None).unwrap(), json!(2));
        assert_eq!(registry.method_names(), vec!["v"]);
    }

    #[test]
    fn test_method_names_sorted() {
        let mut registry = MethodRegistry::new();
        registry
            .register("greet", |_| Ok(Value::Null))
            .register("add", |_| Ok(Value::Null))
            .register("getUser", |_| Ok(Value::Null));
        assert_eq!(registry.method_names(), vec!["add", "getUser", "greet"]);
    }
}
