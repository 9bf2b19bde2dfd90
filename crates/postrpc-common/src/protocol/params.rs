//! Parameter normalization.
//!
//! A call takes zero or more positional arguments, but a request has a single
//! `params` member. The rules for collapsing one into the other:
//!
//! | Arguments | `params` |
//! |---|---|
//! | none | omitted |
//! | one object or array | that value, unwrapped |
//! | one scalar (number, string, bool, null) | `[value]` |
//! | two or more | `[a, b, ...]` in call order |
//!
//! Passing a single object lets callers use named parameters; everything
//! else becomes positional.
//!
//! ```
//! use postrpc_common::protocol::params::to_params;
//! use serde_json::json;
//!
//! assert_eq!(to_params(()).unwrap(), None);
//! assert_eq!(to_params((5, 3)).unwrap(), Some(json!([5, 3])));
//! assert_eq!(to_params(("alice",)).unwrap(), Some(json!(["alice"])));
//! assert_eq!(
//!     to_params((json!({"userId": 101}),)).unwrap(),
//!     Some(json!({"userId": 101}))
//! );
//! ```

use serde::Serialize;
use serde_json::Value;

/// Call arguments that can be turned into a list of JSON values.
///
/// Implemented for `()`, tuples of up to eight serializable values and
/// [`Args`]. A one-element tuple is written `(value,)`.
pub trait IntoParams {
    fn into_args(self) -> serde_json::Result<Vec<Value>>;
}

/// Already-converted positional arguments, for callers that build the
/// argument list at runtime.
///
/// `Args(vec![json!([1, 2])])` is one array argument, passed through as
/// `params`; `Args(vec![json!(1), json!(2)])` is two arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args(pub Vec<Value>);

impl Args {
    pub fn new() -> Self {
        Args(Vec::new())
    }

    /// Appends one argument.
    pub fn push<T: Serialize>(&mut self, arg: &T) -> serde_json::Result<()> {
        self.0.push(serde_json::to_value(arg)?);
        Ok(())
    }
}

impl From<Vec<Value>> for Args {
    fn from(args: Vec<Value>) -> Self {
        Args(args)
    }
}

impl IntoParams for Args {
    fn into_args(self) -> serde_json::Result<Vec<Value>> {
        Ok(self.0)
    }
}

impl IntoParams for () {
    fn into_args(self) -> serde_json::Result<Vec<Value>> {
        Ok(Vec::new())
    }
}

macro_rules! impl_into_params_for_tuple {
    ($($name:ident),+) => {
        impl<$($name: Serialize),+> IntoParams for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_args(self) -> serde_json::Result<Vec<Value>> {
                let ($($name,)+) = self;
                Ok(vec![$(serde_json::to_value(&$name)?),+])
            }
        }
    };
}

impl_into_params_for_tuple!(A);
impl_into_params_for_tuple!(A, B);
impl_into_params_for_tuple!(A, B, C);
impl_into_params_for_tuple!(A, B, C, D);
impl_into_params_for_tuple!(A, B, C, D, E);
impl_into_params_for_tuple!(A, B, C, D, E, F);
impl_into_params_for_tuple!(A, B, C, D, E, F, G);
impl_into_params_for_tuple!(A, B, C, D, E, F, G, H);

/// Collapses positional arguments into the value placed in `params`.
pub fn normalize(mut args: Vec<Value>) -> Option<Value> {
    match args.len() {
        0 => None,
        1 if args[0].is_object() || args[0].is_array() => args.pop(),
        _ => Some(Value::Array(args)),
    }
}

/// Converts call arguments and normalizes them in one step.
pub fn to_params(args: impl IntoParams) -> serde_json::Result<Option<Value>> {
    Ok(normalize(args.into_args()?))
}
