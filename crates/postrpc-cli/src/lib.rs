// Copyright 2026 postrpc Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # postrpc CLI
//!
//! Command-line front end for the postrpc JSON-RPC 2.0 client and its
//! demonstration server.
//!
//! ## Key Commands
//!
//! - `postrpc serve`: run the demonstration server until Ctrl-C
//! - `postrpc call`: make one call and print the result as JSON
//! - `postrpc demo`: replay a short scripted session against a server
//!
//! This library half holds the pieces of the commands that are worth
//! testing without spawning the binary.

pub mod demo;

use anyhow::{anyhow, Result};
use serde_json::Value;

/// Endpoint used by `demo` when neither an argument nor `POSTRPC_ENDPOINT`
/// names one.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080/rpc";

/// Environment variable consulted for the `demo` endpoint.
pub const ENDPOINT_ENV: &str = "POSTRPC_ENDPOINT";

/// Interprets one command-line call argument.
///
/// Valid JSON is used as-is, so `5`, `true` and `'{"name":"Bob"}'` keep their
/// types. Anything else becomes a JSON string, which saves quoting plain
/// words on the shell.
pub fn parse_call_arg(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Splits a `name=value` header argument.
pub fn parse_header(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("Invalid header '{}': expected name=value", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow!("Invalid header '{}': empty name", raw));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Picks the demo endpoint: explicit argument, then environment, then the
/// default.
pub fn resolve_endpoint(arg: Option<String>, env: Option<String>) -> String {
    arg.or(env.filter(|e| !e.is_empty()))
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
}
