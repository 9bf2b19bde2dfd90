//! JSON-RPC 2.0 client over HTTP.
//!
//! # Architecture
//!
//! - [`PostrpcClient`] builds requests, injects headers, dispatches them and
//!   classifies the outcome
//! - [`Transport`] is the single HTTP exchange the client depends on, with
//!   [`HyperTransport`] as the default
//! - [`CallContext`] carries cancellation and deadlines into every call
//!
//! Typed access to results lives on [`Response`] itself (`get_int`,
//! `get_float`, `get_bool`, `get_string`, `get_object`).
//!
//! The client never logs failures; they are always returned. Dispatch emits
//! `tracing` debug events only.

pub mod client;
pub mod context;
pub mod transport;

pub use client::{ClientOptions, PostrpcClient};
pub use context::CallContext;
pub use transport::{HttpRequest, HttpResponse, HyperTransport, Transport};

pub use postrpc_common::{
    Args, IntoParams, JsonRpcError, PostrpcError, Request, RequestId, Response, Responses, Result,
};
