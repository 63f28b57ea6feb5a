//! sayhi — a gRPC client for the four streaming RPC interaction patterns.
//!
//! The core is [`client::SayHiClient`], an adapter that turns the four call
//! shapes (unary, client streaming, server streaming, bidirectional
//! streaming) into futures, channels, and a cancelable session handle over
//! an injected [`transport::Transport`]. [`transport::GrpcTransport`] is the
//! tonic-backed implementation used by the `sayhi` binary.

pub mod cli;
pub mod client;
pub mod config;
pub mod output;
pub mod proto;
pub mod session;
pub mod transport;
pub mod types;

pub use client::{DEFAULT_SESSION_BUDGET, SayHiClient};
pub use session::{BidiHandle, BidiSession};
pub use transport::{GrpcTransport, InboundHiStream, Transport};
pub use types::{CallError, Pattern, RunReport};
