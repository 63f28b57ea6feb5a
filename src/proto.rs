//! Message types for the SayHi service.
//!
//! Hand-written prost structs instead of build-time codegen — the service is
//! four methods over two tiny message pairs, and keeping the definitions in
//! source means no proto toolchain in the build.

/// Fully-qualified gRPC service name, used to build request paths.
pub const SERVICE_NAME: &str = "sayhi.SayHiService";

pub const METHOD_SAY_HI: &str = "SayHi";
pub const METHOD_CLIENT_STREAM_HI: &str = "ClientStreamHi";
pub const METHOD_SERVER_STREAM_HI: &str = "ServerStreamHi";
pub const METHOD_BIDIRECTIONAL_HI: &str = "BidirectionalHi";

/// One "hi" sent to the server.
#[derive(Clone, PartialEq, prost::Message)]
pub struct HiRequest {
    #[prost(string, tag = "1")]
    pub message: String,

    /// Display name of whoever is saying hi.
    #[prost(string, tag = "2")]
    pub sender: String,
}

/// One "hi" back from the server.
#[derive(Clone, PartialEq, prost::Message)]
pub struct HiResponse {
    #[prost(string, tag = "1")]
    pub message: String,

    #[prost(string, tag = "2")]
    pub sender: String,
}

/// Asks the server to emit `count` responses on a server-streaming call.
#[derive(Clone, PartialEq, prost::Message)]
pub struct HiCountRequest {
    #[prost(int32, tag = "1")]
    pub count: i32,

    #[prost(string, tag = "2")]
    pub sender: String,
}

/// Aggregate result of a client-streaming call.
///
/// `received_count` is the authoritative number of messages the server
/// observed before the half-close.
#[derive(Clone, PartialEq, prost::Message)]
pub struct HiCountResponse {
    #[prost(int32, tag = "1")]
    pub received_count: i32,

    #[prost(string, tag = "2")]
    pub message: String,
}

impl HiRequest {
    pub fn new(message: impl Into<String>, sender: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            sender: sender.into(),
        }
    }
}
