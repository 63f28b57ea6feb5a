//! Shared stub transport for adapter tests.
//!
//! Implements the transport port in memory with the demo server's behavior
//! (echo, count, emit-N, echo-back), plus failure injection, and
//! records everything the adapter delivered so tests can assert on message
//! order and half-close.

#![allow(dead_code)]

use sayhi::proto::{HiCountRequest, HiCountResponse, HiRequest, HiResponse};
use sayhi::transport::{InboundHiStream, Transport};
use sayhi::types::CallError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

const BUFFER: usize = 32;

/// What the stub observed, shared with the test after the transport has
/// been moved into the client.
#[derive(Default)]
pub struct Recorder {
    /// Every `HiRequest` delivered, across all call shapes, in order.
    pub requests: Mutex<Vec<HiRequest>>,
    /// Every server-streaming request delivered.
    pub count_requests: Mutex<Vec<HiCountRequest>>,
    /// Whether a client-streaming call observed the half-close.
    pub half_closed: AtomicBool,
}

pub struct StubTransport {
    recorder: Arc<Recorder>,
    fail_with: Option<String>,
    server_stream_error_after: Option<usize>,
    duplex_complete_after: Option<usize>,
}

impl StubTransport {
    pub fn new() -> (Self, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let stub = Self {
            recorder: Arc::clone(&recorder),
            fail_with: None,
            server_stream_error_after: None,
            duplex_complete_after: None,
        };
        (stub, recorder)
    }

    /// Every call setup fails with the given status message.
    pub fn failing(reason: &str) -> (Self, Arc<Recorder>) {
        let (mut stub, recorder) = Self::new();
        stub.fail_with = Some(reason.to_string());
        (stub, recorder)
    }

    /// Server streaming emits this many messages, then one in-band error.
    pub fn server_stream_error_after(mut self, emitted: usize) -> Self {
        self.server_stream_error_after = Some(emitted);
        self
    }

    /// The duplex call completes from the server side after this many echoes.
    pub fn duplex_complete_after(mut self, echoes: usize) -> Self {
        self.duplex_complete_after = Some(echoes);
        self
    }

    fn fail(&self) -> Option<CallError> {
        self.fail_with
            .as_ref()
            .map(|reason| CallError::Status(reason.clone()))
    }
}

impl Transport for StubTransport {
    async fn unary(&self, request: HiRequest) -> Result<HiResponse, CallError> {
        if let Some(err) = self.fail() {
            return Err(err);
        }

        let response = HiResponse {
            message: request.message.clone(),
            sender: request.sender.clone(),
        };
        self.recorder.requests.lock().unwrap().push(request);
        Ok(response)
    }

    async fn client_stream(
        &self,
        mut requests: mpsc::Receiver<HiRequest>,
    ) -> Result<HiCountResponse, CallError> {
        if let Some(err) = self.fail() {
            return Err(err);
        }

        let mut count = 0i32;
        let mut last_sender = String::new();
        while let Some(request) = requests.recv().await {
            count += 1;
            last_sender = request.sender.clone();
            self.recorder.requests.lock().unwrap().push(request);
        }
        self.recorder.half_closed.store(true, Ordering::SeqCst);

        Ok(HiCountResponse {
            received_count: count,
            message: format!("Server received {} hi messages from {}", count, last_sender),
        })
    }

    async fn server_stream(&self, request: HiCountRequest) -> Result<InboundHiStream, CallError> {
        if let Some(err) = self.fail() {
            return Err(err);
        }

        let total = request.count.max(0) as usize;
        self.recorder.count_requests.lock().unwrap().push(request);

        let error_after = self.server_stream_error_after;
        let (tx, rx) = mpsc::channel(BUFFER);
        tokio::spawn(async move {
            let emit = error_after.map(|n| n.min(total)).unwrap_or(total);
            for i in 1..=emit {
                let response = HiResponse {
                    message: format!("hi #{}", i),
                    sender: "server".to_string(),
                };
                if tx.send(Ok(response)).await.is_err() {
                    return;
                }
            }
            if error_after.is_some() {
                let _ = tx
                    .send(Err(CallError::Status("stream interrupted".to_string())))
                    .await;
            }
        });

        Ok(rx)
    }

    async fn duplex_stream(
        &self,
        mut requests: mpsc::Receiver<HiRequest>,
    ) -> Result<InboundHiStream, CallError> {
        if let Some(err) = self.fail() {
            return Err(err);
        }

        let recorder = Arc::clone(&self.recorder);
        let complete_after = self.duplex_complete_after;
        let (tx, rx) = mpsc::channel(BUFFER);
        tokio::spawn(async move {
            let mut echoes = 0usize;
            loop {
                tokio::select! {
                    // The adapter dropped its inbound receiver: call torn down.
                    _ = tx.closed() => return,
                    request = requests.recv() => match request {
                        Some(request) => {
                            echoes += 1;
                            recorder.requests.lock().unwrap().push(request);
                            let response = HiResponse {
                                message: format!("hi back #{}", echoes),
                                sender: "server".to_string(),
                            };
                            if tx.send(Ok(response)).await.is_err() {
                                return;
                            }
                            if complete_after == Some(echoes) {
                                // Server-side completion: drop tx.
                                return;
                            }
                        }
                        None => return,
                    }
                }
            }
        });

        Ok(rx)
    }
}
