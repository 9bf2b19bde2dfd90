//! postrpc Common Types
//!
//! This crate provides the protocol definitions shared by the postrpc
//! client, server and CLI.
//!
//! # Overview
//!
//! postrpc is a JSON-RPC 2.0 client/server pair over HTTP POST. This crate
//! contains the pieces that do not depend on a transport:
//!
//! - **Request/Response model**: single and batch messages and the error
//!   envelope ([`protocol::jsonrpc`])
//! - **Parameter normalization**: turning call arguments into `params`
//!   ([`protocol::params`])
//! - **Value decoding**: typed access to a result without losing numeric
//!   precision ([`protocol::value`])
//! - **Body codec**: encoding requests and decoding response bodies, with
//!   optional rejection of unknown members ([`codec`])
//! - **Errors**: the [`PostrpcError`] taxonomy
//!
//! # Example
//!
//! ```
//! use postrpc_common::{JsonCodec, Request};
//!
//! let request = Request::new("add").with_params((5, 3)).unwrap();
//! let body = JsonCodec::default().encode_request(&request).unwrap();
//! assert_eq!(body, br#"{"jsonrpc":"2.0","method":"add","params":[5,3],"id":0}"#);
//!
//! let response = JsonCodec::default()
//!     .decode_response(br#"{"result": 8, "id": 0}"#)
//!     .unwrap();
//! assert_eq!(response.get_float().unwrap(), 8.0);
//! ```

pub mod codec;
pub mod protocol;

pub use codec::JsonCodec;
pub use protocol::*;
