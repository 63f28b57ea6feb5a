//! tonic-backed transport.
//!
//! Calls are made through `tonic::client::Grpc` against paths built from the
//! configured service name, with a prost codec per call shape. No generated
//! client stubs — the service surface is small enough to drive the generic
//! client directly.

use crate::config::TargetConfig;
use crate::proto::{self, HiCountRequest, HiCountResponse, HiRequest, HiResponse};
use crate::transport::{INBOUND_BUFFER, InboundHiStream, Transport};
use crate::types::CallError;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::client::Grpc;
use tonic::codec::{ProstCodec, Streaming};
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};
use tonic::{Request, Status};

/// gRPC transport over one tonic channel.
#[derive(Clone)]
pub struct GrpcTransport {
    grpc: Grpc<Channel>,
    service: String,
}

impl GrpcTransport {
    /// Connect to the configured endpoint.
    pub async fn connect(target: &TargetConfig) -> Result<Self, CallError> {
        let scheme = if target.tls { "https" } else { "http" };
        let uri = format!("{}://{}", scheme, target.address);

        let endpoint = Endpoint::from_shared(uri)
            .map_err(|e| CallError::Connect(format!("invalid address: {}", e)))?
            .timeout(target.timeout)
            .connect_timeout(target.connect_timeout);

        let endpoint = if target.tls {
            endpoint
                .tls_config(ClientTlsConfig::new().with_enabled_roots())
                .map_err(|e| CallError::Connect(format!("TLS config error: {}", e)))?
        } else {
            endpoint
        };

        let channel = endpoint
            .connect()
            .await
            .map_err(|e| CallError::Connect(format!("connection failed: {}", e)))?;

        Ok(Self::new(channel, &target.service))
    }

    /// Wrap an existing channel, e.g. one built with `connect_lazy`.
    pub fn new(channel: Channel, service: &str) -> Self {
        Self {
            grpc: Grpc::new(channel),
            service: service.to_string(),
        }
    }

    fn path(&self, method: &str) -> Result<PathAndQuery, CallError> {
        format!("/{}/{}", self.service, method)
            .parse()
            .map_err(|e| CallError::Connect(format!("invalid method path: {}", e)))
    }

    async fn ready(&self) -> Result<Grpc<Channel>, CallError> {
        let mut grpc = self.grpc.clone();
        grpc.ready()
            .await
            .map_err(|e| CallError::Connect(format!("service not ready: {}", e)))?;
        Ok(grpc)
    }
}

impl Transport for GrpcTransport {
    async fn unary(&self, request: HiRequest) -> Result<HiResponse, CallError> {
        let path = self.path(proto::METHOD_SAY_HI)?;
        let mut grpc = self.ready().await?;

        let response = grpc
            .unary(
                Request::new(request),
                path,
                ProstCodec::<HiRequest, HiResponse>::default(),
            )
            .await
            .map_err(map_status)?;

        Ok(response.into_inner())
    }

    async fn client_stream(
        &self,
        requests: mpsc::Receiver<HiRequest>,
    ) -> Result<HiCountResponse, CallError> {
        let path = self.path(proto::METHOD_CLIENT_STREAM_HI)?;
        let mut grpc = self.ready().await?;

        // The outbound channel ending is the half-close.
        let outbound = ReceiverStream::new(requests);
        let response = grpc
            .client_streaming(
                Request::new(outbound),
                path,
                ProstCodec::<HiRequest, HiCountResponse>::default(),
            )
            .await
            .map_err(map_status)?;

        Ok(response.into_inner())
    }

    async fn server_stream(&self, request: HiCountRequest) -> Result<InboundHiStream, CallError> {
        let path = self.path(proto::METHOD_SERVER_STREAM_HI)?;
        let mut grpc = self.ready().await?;

        let response = grpc
            .server_streaming(
                Request::new(request),
                path,
                ProstCodec::<HiCountRequest, HiResponse>::default(),
            )
            .await
            .map_err(map_status)?;

        Ok(relay(response.into_inner()))
    }

    async fn duplex_stream(
        &self,
        requests: mpsc::Receiver<HiRequest>,
    ) -> Result<InboundHiStream, CallError> {
        let path = self.path(proto::METHOD_BIDIRECTIONAL_HI)?;
        let mut grpc = self.ready().await?;

        let outbound = ReceiverStream::new(requests);
        let response = grpc
            .streaming(
                Request::new(outbound),
                path,
                ProstCodec::<HiRequest, HiResponse>::default(),
            )
            .await
            .map_err(map_status)?;

        Ok(relay(response.into_inner()))
    }
}

/// Pump a tonic response stream into a bounded channel.
///
/// Messages are forwarded in arrival order; a status failure becomes one
/// in-band `Err` item and ends the relay. A dropped receiver ends the relay
/// too, which drops the underlying stream and tears the call down.
fn relay(mut inbound: Streaming<HiResponse>) -> InboundHiStream {
    let (tx, rx) = mpsc::channel(INBOUND_BUFFER);

    tokio::spawn(async move {
        while let Some(item) = inbound.next().await {
            let item = item.map_err(map_status);
            let failed = item.is_err();

            if tx.send(item).await.is_err() {
                tracing::debug!("inbound relay: receiver dropped, closing call");
                break;
            }
            if failed {
                break;
            }
        }
    });

    rx
}

fn map_status(status: Status) -> CallError {
    if status.message().is_empty() {
        CallError::Status(status.code().to_string())
    } else {
        CallError::Status(status.message().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lazy_transport(service: &str) -> GrpcTransport {
        let channel = Endpoint::from_static("http://localhost:50051").connect_lazy();
        GrpcTransport::new(channel, service)
    }

    #[tokio::test]
    async fn builds_method_paths_from_service_name() {
        let transport = lazy_transport(proto::SERVICE_NAME);

        let path = transport.path(proto::METHOD_SAY_HI).unwrap();
        assert_eq!(path.as_str(), "/sayhi.SayHiService/SayHi");

        let path = transport.path(proto::METHOD_BIDIRECTIONAL_HI).unwrap();
        assert_eq!(path.as_str(), "/sayhi.SayHiService/BidirectionalHi");
    }

    #[tokio::test]
    async fn rejects_unparsable_service_name() {
        let transport = lazy_transport("no spaces allowed");
        assert!(matches!(
            transport.path(proto::METHOD_SAY_HI),
            Err(CallError::Connect(_))
        ));
    }
}
