//! The streaming client adapter: four interaction patterns over one
//! injected transport.
//!
//! Every operation opens exactly one call, owns it for the operation's
//! lifetime, and never shares it. Failures surface once as [`CallError`];
//! re-invoking an operation always opens a fresh call.

use crate::proto::{HiCountRequest, HiCountResponse, HiRequest, HiResponse};
use crate::session::BidiSession;
use crate::transport::{InboundHiStream, Transport};
use crate::types::CallError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Default wall-clock budget for a bidirectional session.
pub const DEFAULT_SESSION_BUDGET: Duration = Duration::from_secs(2);

/// Client for the SayHi service.
pub struct SayHiClient<T> {
    transport: Arc<T>,
    session_budget: Duration,
}

impl<T> Clone for SayHiClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            session_budget: self.session_budget,
        }
    }
}

impl<T: Transport> SayHiClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
            session_budget: DEFAULT_SESSION_BUDGET,
        }
    }

    /// Override the wall-clock budget applied to bidirectional sessions.
    pub fn with_session_budget(mut self, budget: Duration) -> Self {
        self.session_budget = budget;
        self
    }

    /// Unary: one "hi" out, one "hi" back.
    pub async fn say_hi(&self, sender: &str) -> Result<HiResponse, CallError> {
        tracing::debug!(sender, "unary: sending hi");

        let response = self.transport.unary(HiRequest::new("hi", sender)).await?;

        tracing::debug!(from = %response.sender, "unary: received response");
        Ok(response)
    }

    /// Client streaming: `count` "hi" messages out, one aggregate count back.
    ///
    /// Messages are queued in index order ("hi #1" through "hi #count") and
    /// the call is half-closed exactly once, after the final message.
    pub async fn client_stream_hi(
        &self,
        sender: &str,
        count: u32,
    ) -> Result<HiCountResponse, CallError> {
        if count == 0 {
            return Err(CallError::InvalidCount(count));
        }
        tracing::debug!(sender, count, "client streaming: sending hi messages");

        let (tx, rx) = mpsc::channel(count as usize);
        for i in 1..=count {
            // Capacity covers every message, so these sends never yield.
            tx.send(HiRequest::new(format!("hi #{}", i), sender))
                .await
                .map_err(|_| CallError::Status("request stream closed early".to_string()))?;
        }
        // Half-close: no more outbound messages after the last send.
        drop(tx);

        let response = self.transport.client_stream(rx).await?;

        tracing::debug!(
            received_count = response.received_count,
            "client streaming: completed"
        );
        Ok(response)
    }

    /// Server streaming: one request out, a lazy sequence of responses back.
    ///
    /// The sequence yields responses in arrival order until the call
    /// completes; a non-OK completion arrives as one in-band `Err` item
    /// after every message received before it. The sequence is not
    /// restartable — invoking this again opens a brand-new call.
    ///
    /// The demo server caps its emission at 5 messages regardless of `count`.
    pub async fn server_stream_hi(
        &self,
        sender: &str,
        count: u32,
    ) -> Result<InboundHiStream, CallError> {
        if count == 0 {
            return Err(CallError::InvalidCount(count));
        }
        let count = i32::try_from(count).map_err(|_| CallError::InvalidCount(count))?;
        tracing::debug!(sender, count, "server streaming: requesting hi messages");

        self.transport
            .server_stream(HiCountRequest {
                count,
                sender: sender.to_string(),
            })
            .await
    }

    /// Bidirectional: opens one duplex call and returns the session handle
    /// immediately; call setup proceeds concurrently. The session closes on
    /// [`BidiSession::close`], on transport completion, or when the session
    /// budget elapses — whichever comes first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn bidirectional_hi(&self, sender: &str) -> BidiSession {
        tracing::debug!(sender, budget = ?self.session_budget, "bidirectional: opening session");
        BidiSession::open(Arc::clone(&self.transport), sender, self.session_budget)
    }
}
