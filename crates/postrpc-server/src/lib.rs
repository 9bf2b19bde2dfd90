//! postrpc Demonstration Server
//!
//! A small JSON-RPC 2.0 over HTTP server used to exercise the postrpc
//! client end to end. It serves the methods of a [`MethodRegistry`]; the
//! built-in [`demo_registry`] provides `add`, `getUser` and `greet`.

pub mod handlers;
pub mod http_router;
pub mod http_server;
pub mod registry;

pub use handlers::demo_registry;
pub use http_router::{Reply, RouterReply, RpcRouter};
pub use http_server::{HttpServer, ServerConfig};
pub use registry::{MethodHandler, MethodRegistry};
