//! Scripted client session used by `postrpc demo`.
//!
//! Runs `add(5, 3)`, `getUser({"userId": 101})`, `greet({"name": ...})` and
//! finally `unknownMethod()`, printing one line per call. The first three
//! must succeed; the last one is expected to fail and its error is printed.

use std::io::Write;

use anyhow::{Context, Result};
use postrpc_client::{CallContext, PostrpcClient};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
pub struct DemoUser {
    pub ID: i64,
    pub Name: String,
    pub Role: String,
}

pub async fn run_demo<W: Write>(
    client: &PostrpcClient,
    ctx: &CallContext,
    name: &str,
    out: &mut W,
) -> Result<()> {
    let sum = client
        .call(ctx, "add", (5, 3))
        .await
        .context("Error calling add")?
        .get_float()
        .context("Error reading add result")?;
    writeln!(out, "add(5,3) = {}", sum)?;

    let user: DemoUser = client
        .call_for(ctx, "getUser", (json!({"userId": 101}),))
        .await
        .context("Error calling getUser")?;
    writeln!(
        out,
        "getUser: ID={} Name={} Role={}",
        user.ID, user.Name, user.Role
    )?;

    let greeting: String = client
        .call_for(ctx, "greet", (json!({"name": name}),))
        .await
        .context("Error calling greet")?;
    writeln!(out, "greet: {}", greeting)?;

    match client.call(ctx, "unknownMethod", ()).await {
        Ok(response) => writeln!(out, "unknownMethod: {:?}", response.result)?,
        Err(e) => writeln!(out, "Error: {}", e)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use postrpc_server::{demo_registry, HttpServer};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_demo_session() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(HttpServer::new(demo_registry()).run_until(listener, async {
            let _ = rx.await;
        }));

        let client = PostrpcClient::new(&format!("http://{}/rpc", addr)).unwrap();
        let mut out = Vec::new();
        run_demo(&client, &CallContext::background(), "Bob", &mut out)
            .await
            .unwrap();
        let _ = tx.send(());

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "add(5,3) = 8",
                "getUser: ID=101 Name=Alice Role=Admin",
                "greet: Hello, Bob!",
                "Error: -32601: method not found",
            ]
        );
    }

    #[tokio::test]
    async fn test_demo_fails_without_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = PostrpcClient::new(&format!("http://{}/rpc", addr)).unwrap();
        let mut out = Vec::new();
        let err = run_demo(&client, &CallContext::background(), "Bob", &mut out)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("add"));
        assert!(out.is_empty());
    }
}
