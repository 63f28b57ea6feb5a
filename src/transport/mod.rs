//! The transport port: the minimal capability the adapter requires from a
//! streaming-RPC transport.
//!
//! One method per call shape. Outbound message flows are handed to the
//! transport as mpsc receivers — end-of-stream is the half-close. Inbound
//! flows come back as mpsc receivers of `Result` items — an `Err` item is a
//! non-OK completion, channel closure without one is an OK completion.

mod grpc;

pub use grpc::GrpcTransport;

use crate::proto::{HiCountRequest, HiCountResponse, HiRequest, HiResponse};
use crate::types::CallError;
use std::future::Future;
use tokio::sync::mpsc;

/// Capacity of the relay channels carrying inbound responses.
pub const INBOUND_BUFFER: usize = 32;

/// Inbound half of a streaming call: responses in arrival order, then either
/// one `Err` item (non-OK completion) or plain closure (OK completion).
pub type InboundHiStream = mpsc::Receiver<Result<HiResponse, CallError>>;

/// A streaming-RPC transport, injected into [`crate::client::SayHiClient`].
///
/// Implementations must be stateless across calls: every method opens a
/// fresh call, and nothing is shared between calls beyond the connection
/// itself.
pub trait Transport: Send + Sync + 'static {
    /// One request, one response.
    fn unary(
        &self,
        request: HiRequest,
    ) -> impl Future<Output = Result<HiResponse, CallError>> + Send;

    /// Drains `requests` onto one call in order, half-closes when the
    /// channel ends, and resolves with the server's single aggregate
    /// response once the call completes.
    fn client_stream(
        &self,
        requests: mpsc::Receiver<HiRequest>,
    ) -> impl Future<Output = Result<HiCountResponse, CallError>> + Send;

    /// Sends one request and resolves with the inbound response stream.
    ///
    /// Dropping the returned receiver tears the call down.
    fn server_stream(
        &self,
        request: HiCountRequest,
    ) -> impl Future<Output = Result<InboundHiStream, CallError>> + Send;

    /// Opens a duplex call: `requests` flow out until the channel ends,
    /// while the resolved receiver yields responses as they arrive.
    ///
    /// Dropping the returned receiver tears the call down.
    fn duplex_stream(
        &self,
        requests: mpsc::Receiver<HiRequest>,
    ) -> impl Future<Output = Result<InboundHiStream, CallError>> + Send;
}
