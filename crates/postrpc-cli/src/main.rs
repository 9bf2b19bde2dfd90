//! # postrpc CLI Entry Point
//!
//! Main binary for postrpc. Runs the demonstration server and makes calls
//! against any JSON-RPC 2.0 over HTTP endpoint.
//!
//! ## Usage
//!
//! ```bash
//! # Run the demonstration server
//! postrpc serve -b 0.0.0.0:8080
//!
//! # Make a call (prints the result as JSON)
//! postrpc call http://127.0.0.1:8080/rpc add 5 3
//! postrpc call http://127.0.0.1:8080/rpc greet '{"name": "Bob"}'
//!
//! # Replay the demo session
//! postrpc demo http://127.0.0.1:8080/rpc
//! ```
//!
//! ## URL Format
//!
//! All URLs must include the `http://` or `https://` prefix:
//! - ✅ `http://127.0.0.1:8080/rpc`
//! - ❌ `127.0.0.1:8080/rpc`

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use argh::FromArgs;
use postrpc_cli::{demo, parse_call_arg, parse_header, resolve_endpoint, ENDPOINT_ENV};
use postrpc_client::{CallContext, ClientOptions, PostrpcClient};
use postrpc_common::Args;
use postrpc_server::{demo_registry, HttpServer, ServerConfig};
use serde_json::Value;
use tokio::net::TcpListener;

/// Validates that a URL string starts with http:// or https://
fn validate_http_url(url: &str, description: &str) -> Result<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "Invalid {}: '{}' must start with http:// or https://",
            description,
            url
        ))
    }
}

#[derive(FromArgs)]
/// postrpc - JSON-RPC 2.0 over HTTP
struct Cli {
    #[argh(subcommand)]
    command: Commands,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Commands {
    Serve(ServeArgs),
    Call(CallArgs),
    Demo(DemoArgs),
}

/// Arguments for running the demonstration server.
///
/// The server exposes `add`, `getUser` and `greet` on a single path and
/// runs until Ctrl-C.
#[derive(FromArgs)]
#[argh(subcommand, name = "serve")]
/// run the demonstration JSON-RPC server
struct ServeArgs {
    /// address to bind the HTTP server to
    #[argh(option, short = 'b', default = "\"0.0.0.0:8080\".into()")]
    bind: String,

    /// path the JSON-RPC endpoint is served on
    #[argh(option, default = "\"/rpc\".into()")]
    path: String,

    /// maximum request body size in bytes
    #[argh(option, long = "max-body-bytes", default = "10 * 1024 * 1024")]
    max_body_bytes: usize,
}

/// Arguments for a single call.
///
/// Each positional argument after the method is parsed as JSON, falling back
/// to a plain string. A single object or array argument becomes `params`
/// unchanged; anything else is sent as a positional array.
#[derive(FromArgs)]
#[argh(subcommand, name = "call")]
/// make one JSON-RPC call and print the result as JSON
struct CallArgs {
    /// endpoint URL (e.g., http://127.0.0.1:8080/rpc)
    #[argh(positional)]
    endpoint: String,

    /// method name
    #[argh(positional)]
    method: String,

    /// call arguments
    #[argh(positional)]
    args: Vec<String>,

    /// extra header as name=value, may be repeated
    #[argh(option, short = 'H', long = "header")]
    headers: Vec<String>,

    /// request id to send
    #[argh(option, default = "0")]
    id: i64,

    /// accept response members outside the JSON-RPC envelope
    #[argh(switch, long = "allow-unknown-fields")]
    allow_unknown_fields: bool,

    /// give up after this many milliseconds
    #[argh(option, long = "timeout-ms")]
    timeout_ms: Option<u64>,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "demo")]
/// replay the demo session against a server
struct DemoArgs {
    /// endpoint URL (defaults to $POSTRPC_ENDPOINT, then http://localhost:8080/rpc)
    #[argh(positional)]
    endpoint: Option<String>,

    /// name passed to greet
    #[argh(option, default = "\"Subhrajyoti\".into()")]
    name: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli: Cli = argh::from_env();

    // call and demo write to stdout; keep it free of log lines.
    if matches!(cli.command, Commands::Serve(_)) {
        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    match cli.command {
        Commands::Serve(args) => run_serve(args).await,
        Commands::Call(args) => run_call(args).await,
        Commands::Demo(args) => run_demo(args).await,
    }
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    let addr: SocketAddr = args
        .bind
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address '{}': {}", args.bind, e))?;

    let config = ServerConfig::default()
        .with_path(args.path)
        .with_max_body_bytes(args.max_body_bytes);
    let server = HttpServer::with_config(demo_registry(), config);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", addr, e))?;

    server
        .run_until(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
            tracing::info!("Received Ctrl-C, shutting down");
        })
        .await?;

    Ok(())
}

/// Makes one call and prints its result as compact JSON.
///
/// A protocol error, a failing HTTP status and a transport failure all end
/// the process with a non-zero exit code.
async fn run_call(args: CallArgs) -> Result<()> {
    validate_http_url(&args.endpoint, "endpoint")?;

    let mut options = ClientOptions::default()
        .with_allow_unknown_fields(args.allow_unknown_fields)
        .with_default_request_id(args.id);
    for raw in &args.headers {
        let (name, value) = parse_header(raw)?;
        options = options.with_header(name, value);
    }
    let client = PostrpcClient::with_options(&args.endpoint, options)?;

    let ctx = match args.timeout_ms {
        Some(ms) => CallContext::background().with_timeout(Duration::from_millis(ms)),
        None => CallContext::background(),
    };

    let call_args = Args(args.args.iter().map(|a| parse_call_arg(a)).collect());
    let response = client.call(&ctx, &args.method, call_args).await?;

    println!(
        "{}",
        serde_json::to_string(&response.result.unwrap_or(Value::Null))?
    );

    Ok(())
}

async fn run_demo(args: DemoArgs) -> Result<()> {
    let endpoint = resolve_endpoint(args.endpoint, std::env::var(ENDPOINT_ENV).ok());
    validate_http_url(&endpoint, "endpoint")?;

    let client = PostrpcClient::new(&endpoint)?;
    let mut stdout = std::io::stdout();
    demo::run_demo(&client, &CallContext::background(), &args.name, &mut stdout).await
}
