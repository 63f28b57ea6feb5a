//! Shared types: the error taxonomy and the per-run report the CLI prints.

use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the adapter operations.
///
/// There is no retry policy here: a failure is reported once and the call is
/// torn down. Callers retry by re-invoking the operation, which always opens
/// a fresh call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CallError {
    /// Endpoint or channel establishment failed.
    #[error("connect error: {0}")]
    Connect(String),

    /// The transport reported a non-OK status for the call.
    #[error("rpc failed: {0}")]
    Status(String),

    /// Streaming operations require a positive, in-range message count.
    #[error("invalid message count: {0}")]
    InvalidCount(u32),

    /// Send attempted on a bidirectional session that has already closed.
    #[error("session is closed")]
    SessionClosed,
}

impl CallError {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallError::Connect(_) => "connect",
            CallError::Status(_) => "status",
            CallError::InvalidCount(_) => "invalid_count",
            CallError::SessionClosed => "session_closed",
        }
    }
}

/// The four gRPC interaction patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    /// Single request, single response.
    Unary,
    /// Stream of requests, single aggregate response.
    ClientStream,
    /// Single request, stream of responses.
    ServerStream,
    /// Concurrent independent send/receive over one call.
    BidiStream,
}

impl Pattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pattern::Unary => "unary",
            Pattern::ClientStream => "client_stream",
            Pattern::ServerStream => "server_stream",
            Pattern::BidiStream => "bidi_stream",
        }
    }
}

/// Result of one pattern run, for human or JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub pattern: Pattern,

    pub sender: String,

    /// Number of request messages sent on the call.
    pub sent: u64,

    /// Number of response messages received.
    pub received: u64,

    /// Rendered response lines, in arrival order.
    pub responses: Vec<String>,

    pub elapsed_ms: u64,

    pub error: Option<String>,
}

impl RunReport {
    pub fn new(pattern: Pattern, sender: &str) -> Self {
        Self {
            pattern,
            sender: sender.to_string(),
            sent: 0,
            received: 0,
            responses: Vec::new(),
            elapsed_ms: 0,
            error: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
