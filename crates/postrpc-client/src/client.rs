use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE, HOST};
use hyper::{Method, StatusCode, Uri};
use postrpc_common::protocol::params::to_params;
use postrpc_common::{
    IntoParams, JsonCodec, PostrpcError, Request, RequestId, Response, ResponseBody, Responses,
    Result,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::context::CallContext;
use crate::transport::{HttpRequest, HyperTransport, Transport};

const APPLICATION_JSON: &str = "application/json";

/// Options applied when constructing a [`PostrpcClient`].
///
/// The defaults use a pooling [`HyperTransport`], send no extra headers,
/// reject unknown response members and use request id `0` for single calls.
#[derive(Clone, Default)]
pub struct ClientOptions {
    pub transport: Option<Arc<dyn Transport>>,
    pub custom_headers: HashMap<String, String>,
    pub allow_unknown_fields: bool,
    pub default_request_id: RequestId,
}

impl ClientOptions {
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Adds a header sent with every request.
    ///
    /// A header named `Host` (any case) does not become an ordinary header;
    /// it replaces the host the request is addressed to.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.insert(name.into(), value.into());
        self
    }

    pub fn with_allow_unknown_fields(mut self, allow: bool) -> Self {
        self.allow_unknown_fields = allow;
        self
    }

    pub fn with_default_request_id(mut self, id: RequestId) -> Self {
        self.default_request_id = id;
        self
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("custom_headers", &self.custom_headers)
            .field("allow_unknown_fields", &self.allow_unknown_fields)
            .field("default_request_id", &self.default_request_id)
            .finish_non_exhaustive()
    }
}

/// Validated, immutable configuration shared by every clone of a client.
struct ClientConfig {
    endpoint: Uri,
    transport: Arc<dyn Transport>,
    headers: HeaderMap,
    host: Option<HeaderValue>,
    codec: JsonCodec,
    default_request_id: RequestId,
}

/// JSON-RPC 2.0 client over HTTP.
///
/// Cloning is cheap: clones share the same configuration and transport, so a
/// single client can serve any number of concurrent callers.
///
/// # Calls
///
/// - [`call`](Self::call) returns the response, or the protocol error it
///   carries as `PostrpcError::Protocol`
/// - [`call_raw`](Self::call_raw) sends a request verbatim and leaves the
///   `error` member for the caller to inspect
/// - [`call_for`](Self::call_for) decodes the result straight into a type
/// - [`call_batch`](Self::call_batch) numbers the requests `0..n` and sends
///   them in one exchange; [`call_batch_raw`](Self::call_batch_raw) keeps the
///   caller's ids
///
/// A status of 400 or above always fails the call with
/// `PostrpcError::HttpStatus`, which still carries the decoded body when the
/// server sent a valid one.
///
/// # Example
///
/// ```no_run
/// use postrpc_client::{CallContext, PostrpcClient};
/// use serde_json::json;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = PostrpcClient::new("http://127.0.0.1:8080/rpc")?;
/// let ctx = CallContext::background();
///
/// let sum = client.call(&ctx, "add", (5, 3)).await?;
/// println!("5 + 3 = {}", sum.get_float()?);
///
/// let greeting = client.call(&ctx, "greet", (json!({"name": "Bob"}),)).await?;
/// println!("{}", greeting.get_string()?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PostrpcClient {
    config: Arc<ClientConfig>,
}

impl PostrpcClient {
    /// Creates a client with default options.
    pub fn new(endpoint: &str) -> Result<Self> {
        Self::with_options(endpoint, ClientOptions::default())
    }

    /// Creates a client, validating the endpoint and every custom header.
    pub fn with_options(endpoint: &str, options: ClientOptions) -> Result<Self> {
        let endpoint = parse_endpoint(endpoint)?;

        let mut headers = HeaderMap::new();
        let mut host = None;
        for (name, value) in &options.custom_headers {
            let value = HeaderValue::from_str(value).map_err(|e| {
                PostrpcError::InvalidRequest(format!("invalid value for header {}: {}", name, e))
            })?;
            if name.eq_ignore_ascii_case("host") {
                host = Some(value);
                continue;
            }
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                PostrpcError::InvalidRequest(format!("invalid header name {:?}: {}", name, e))
            })?;
            headers.insert(name, value);
        }

        let transport = options
            .transport
            .unwrap_or_else(|| Arc::new(HyperTransport::new()));

        Ok(Self {
            config: Arc::new(ClientConfig {
                endpoint,
                transport,
                headers,
                host,
                codec: JsonCodec::new(options.allow_unknown_fields),
                default_request_id: options.default_request_id,
            }),
        })
    }

    pub fn endpoint(&self) -> &Uri {
        &self.config.endpoint
    }

    /// Calls `method` with normalized `params` and the client's default id.
    ///
    /// A protocol error in the response fails the call with
    /// `PostrpcError::Protocol`.
    pub async fn call(
        &self,
        ctx: &CallContext,
        method: &str,
        params: impl IntoParams,
    ) -> Result<Response> {
        let request = Request {
            params: to_params(params)?,
            ..Request::new(method).with_id(self.config.default_request_id)
        };
        self.dispatch(ctx, &request, true).await
    }

    /// Sends `request` exactly as given and returns whatever the server
    /// answered, protocol errors included.
    pub async fn call_raw(&self, ctx: &CallContext, request: &Request) -> Result<Response> {
        self.dispatch(ctx, request, false).await
    }

    /// [`call`](Self::call), then decodes the result into `T`.
    pub async fn call_for<T: DeserializeOwned>(
        &self,
        ctx: &CallContext,
        method: &str,
        params: impl IntoParams,
    ) -> Result<T> {
        self.call(ctx, method, params).await?.get_object()
    }

    /// Sends `requests` as one batch after renumbering them `0..n` in order.
    ///
    /// Protocol errors in individual responses do not fail the batch; check
    /// [`Responses::has_error`] and [`Responses::get_by_id`].
    pub async fn call_batch(
        &self,
        ctx: &CallContext,
        mut requests: Vec<Request>,
    ) -> Result<Responses> {
        for (id, request) in requests.iter_mut().enumerate() {
            request.id = id as RequestId;
        }
        self.dispatch_batch(ctx, &requests).await
    }

    /// Sends `requests` as one batch without touching their ids.
    pub async fn call_batch_raw(
        &self,
        ctx: &CallContext,
        requests: &[Request],
    ) -> Result<Responses> {
        self.dispatch_batch(ctx, requests).await
    }

    async fn dispatch(
        &self,
        ctx: &CallContext,
        request: &Request,
        raise_protocol: bool,
    ) -> Result<Response> {
        check_method(request)?;
        let body = self.config.codec.encode_request(request)?;

        debug!(method = %request.method, id = request.id, endpoint = %self.config.endpoint, "dispatching call");
        let (status, bytes) = self.exchange(ctx, body).await?;
        debug!(method = %request.method, status = status.as_u16(), "call answered");

        let decoded = self.config.codec.decode_response(&bytes);
        if is_failure(status) {
            return Err(PostrpcError::HttpStatus {
                status: status.as_u16(),
                body: decoded.ok().map(|r| ResponseBody::Single(Box::new(r))),
            });
        }

        let response = decoded?;
        if raise_protocol {
            if let Some(error) = response.error {
                return Err(PostrpcError::Protocol(error));
            }
        }
        Ok(response)
    }

    async fn dispatch_batch(&self, ctx: &CallContext, requests: &[Request]) -> Result<Responses> {
        if requests.is_empty() {
            return Err(PostrpcError::EmptyBatch);
        }
        requests.iter().try_for_each(check_method)?;
        let body = self.config.codec.encode_batch(requests)?;

        debug!(size = requests.len(), endpoint = %self.config.endpoint, "dispatching batch");
        let (status, bytes) = self.exchange(ctx, body).await?;
        debug!(size = requests.len(), status = status.as_u16(), "batch answered");

        let decoded = self.config.codec.decode_responses(&bytes);
        if is_failure(status) {
            return Err(PostrpcError::HttpStatus {
                status: status.as_u16(),
                body: decoded.ok().map(ResponseBody::Batch),
            });
        }
        decoded
    }

    /// POSTs `body` to the endpoint and returns the status and full body.
    async fn exchange(&self, ctx: &CallContext, body: Vec<u8>) -> Result<(StatusCode, Bytes)> {
        let request = self.build_request(body)?;
        let response = ctx.run(self.config.transport.round_trip(request)).await?;
        let status = response.status();
        Ok((status, response.into_body()))
    }

    fn build_request(&self, body: Vec<u8>) -> Result<HttpRequest> {
        let mut request = hyper::Request::builder()
            .method(Method::POST)
            .uri(self.config.endpoint.clone())
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .header(ACCEPT, APPLICATION_JSON)
            .body(Bytes::from(body))
            .map_err(|e| PostrpcError::Transport(format!("Failed to build request: {}", e)))?;

        let headers = request.headers_mut();
        for (name, value) in &self.config.headers {
            headers.insert(name.clone(), value.clone());
        }
        if let Some(host) = &self.config.host {
            headers.insert(HOST, host.clone());
        }
        Ok(request)
    }
}

impl fmt::Debug for PostrpcClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostrpcClient")
            .field("endpoint", &self.config.endpoint)
            .finish_non_exhaustive()
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Uri> {
    let uri: Uri = endpoint
        .parse()
        .map_err(|e| PostrpcError::InvalidRequest(format!("invalid endpoint {:?}: {}", endpoint, e)))?;

    match (uri.scheme_str(), uri.authority()) {
        (Some("http") | Some("https"), Some(_)) => Ok(uri),
        _ => Err(PostrpcError::InvalidRequest(format!(
            "endpoint must be an absolute http:// or https:// URL, got {:?}",
            endpoint
        ))),
    }
}

fn check_method(request: &Request) -> Result<()> {
    if request.method.is_empty() {
        return Err(PostrpcError::InvalidRequest(
            "method name must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn is_failure(status: StatusCode) -> bool {
    status.as_u16() >= 400
}
