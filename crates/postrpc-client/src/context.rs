//! Per-call cancellation and deadlines.
//!
//! Every client operation takes a [`CallContext`]. The context bounds the
//! whole exchange, from sending the request to reading the last byte of the
//! response body. When it fires first the call fails with
//! [`PostrpcError::Cancelled`] or [`PostrpcError::Timeout`] and the in-flight
//! exchange is dropped, so no partial response ever reaches the caller.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use postrpc_client::CallContext;
//! use tokio_util::sync::CancellationToken;
//!
//! let token = CancellationToken::new();
//! let ctx = CallContext::background()
//!     .with_timeout(Duration::from_secs(5))
//!     .with_cancellation(token.clone());
//!
//! // Any clone of the token cancels every call using this context.
//! token.cancel();
//! assert!(ctx.is_cancelled());
//! ```

use std::future::Future;
use std::time::Duration;

use postrpc_common::{PostrpcError, Result};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Default)]
pub struct CallContext {
    deadline: Option<Deadline>,
    cancellation: Option<CancellationToken>,
}

#[derive(Debug, Clone, Copy)]
struct Deadline {
    at: Instant,
    budget: Duration,
}

impl CallContext {
    /// A context that never expires and cannot be cancelled.
    pub fn background() -> Self {
        Self::default()
    }

    /// Bounds calls to `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Bounds calls to an absolute point in time. A deadline that already
    /// passed makes every call fail before anything is sent.
    pub fn with_deadline(mut self, at: Instant) -> Self {
        let budget = at.saturating_duration_since(Instant::now());
        self.deadline = Some(Deadline { at, budget });
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline.map(|d| d.at)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(PostrpcError::Cancelled);
        }
        match self.deadline {
            Some(d) if d.at <= Instant::now() => Err(timeout_error(d)),
            _ => Ok(()),
        }
    }

    /// Drives `exchange` to completion unless the context fires first.
    pub(crate) async fn run<T, F>(&self, exchange: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.check()?;

        let bounded = async {
            match self.deadline {
                Some(d) => match tokio::time::timeout_at(d.at, exchange).await {
                    Ok(result) => result,
                    Err(_) => Err(timeout_error(d)),
                },
                None => exchange.await,
            }
        };

        match &self.cancellation {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(PostrpcError::Cancelled),
                    result = bounded => result,
                }
            }
            None => bounded.await,
        }
    }
}

fn timeout_error(deadline: Deadline) -> PostrpcError {
    PostrpcError::Timeout(deadline.budget.as_millis() as u64)
}
