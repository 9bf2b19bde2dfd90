pub mod error;
pub mod jsonrpc;
pub mod params;
pub mod value;

pub use error::{PostrpcError, Result};
pub use jsonrpc::{
    JsonRpcError, Request, RequestId, Response, ResponseBody, Responses, JSONRPC_VERSION,
};
pub use params::{Args, IntoParams};
