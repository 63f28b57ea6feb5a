//! Bidirectional session: one duplex call, caller-driven sends, inbound
//! notifications, and a wall-clock session budget.
//!
//! Three triggers can end a session — the caller's `close()`, the budget
//! timer, and the transport completing the call. All three attempt the same
//! `OPEN -> CLOSING` compare-and-swap; only the first succeeds, and the
//! driver task performs the actual teardown exactly once.

use crate::proto::{HiRequest, HiResponse};
use crate::transport::Transport;
use crate::types::CallError;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

const OUTBOUND_BUFFER: usize = 16;
const INBOUND_BUFFER: usize = 32;

const OPEN: u8 = 0;
const CLOSING: u8 = 1;
const CLOSED: u8 = 2;

#[derive(Debug)]
struct SessionState {
    state: AtomicU8,
    cancel: CancellationToken,
}

impl SessionState {
    fn new() -> Self {
        Self {
            state: AtomicU8::new(OPEN),
            cancel: CancellationToken::new(),
        }
    }

    /// Attempt the close transition. Only the winning trigger sees `true`.
    fn begin_close(&self) -> bool {
        self.state
            .compare_exchange(OPEN, CLOSING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn finish_close(&self) {
        self.state.store(CLOSED, Ordering::Release);
    }

    fn is_open(&self) -> bool {
        self.state.load(Ordering::Acquire) == OPEN
    }
}

/// One open bidirectional exchange.
///
/// Created by [`crate::client::SayHiClient::bidirectional_hi`]. Dropping the
/// session without closing it lets the budget timer finish the teardown.
pub struct BidiSession {
    sender: String,
    outbound: mpsc::Sender<HiRequest>,
    inbound: mpsc::Receiver<HiResponse>,
    state: Arc<SessionState>,
}

/// Cheap clonable handle for sending into and closing a session from
/// another task, while the session itself is parked on [`BidiSession::recv`].
#[derive(Clone)]
pub struct BidiHandle {
    sender: String,
    outbound: mpsc::Sender<HiRequest>,
    state: Arc<SessionState>,
}

impl BidiSession {
    pub(crate) fn open<T: Transport>(
        transport: Arc<T>,
        sender: &str,
        budget: Duration,
    ) -> Self {
        let (out_tx, out_rx) = mpsc::channel(OUTBOUND_BUFFER);
        let (in_tx, in_rx) = mpsc::channel(INBOUND_BUFFER);
        let state = Arc::new(SessionState::new());

        tokio::spawn(drive(transport, out_rx, in_tx, Arc::clone(&state), budget));

        Self {
            sender: sender.to_string(),
            outbound: out_tx,
            inbound: in_rx,
            state,
        }
    }

    /// Forward one message on the open call.
    ///
    /// Returns [`CallError::SessionClosed`] once the session has closed,
    /// whichever trigger closed it.
    pub async fn send(&self, message: &str) -> Result<(), CallError> {
        send_on(&self.state, &self.outbound, &self.sender, message).await
    }

    /// Next inbound response, in arrival order.
    ///
    /// `None` once the session has completed; messages received before the
    /// close are still delivered first.
    pub async fn recv(&mut self) -> Option<HiResponse> {
        self.inbound.recv().await
    }

    /// Close the session. Idempotent: the underlying call is torn down, the
    /// inbound channel completed, and the budget timer retired exactly once
    /// no matter how many times this is invoked or which trigger won.
    pub fn close(&self) {
        close_on(&self.state, "caller");
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    /// A send/close handle usable from another task.
    pub fn handle(&self) -> BidiHandle {
        BidiHandle {
            sender: self.sender.clone(),
            outbound: self.outbound.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl BidiHandle {
    pub async fn send(&self, message: &str) -> Result<(), CallError> {
        send_on(&self.state, &self.outbound, &self.sender, message).await
    }

    pub fn close(&self) {
        close_on(&self.state, "caller");
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }
}

async fn send_on(
    state: &SessionState,
    outbound: &mpsc::Sender<HiRequest>,
    sender: &str,
    message: &str,
) -> Result<(), CallError> {
    if !state.is_open() {
        return Err(CallError::SessionClosed);
    }
    outbound
        .send(HiRequest::new(message, sender))
        .await
        .map_err(|_| CallError::SessionClosed)
}

fn close_on(state: &SessionState, trigger: &str) {
    if state.begin_close() {
        tracing::debug!(trigger, "bidirectional: closing session");
        state.cancel.cancel();
    }
}

/// Owns the duplex call for the session's lifetime.
///
/// Teardown runs at the end of this task exactly once regardless of which
/// trigger fired: dropping the response stream tears the call down, dropping
/// `in_tx` completes the inbound channel, and cancelling the token retires
/// the timer.
async fn drive<T: Transport>(
    transport: Arc<T>,
    out_rx: mpsc::Receiver<HiRequest>,
    in_tx: mpsc::Sender<HiResponse>,
    state: Arc<SessionState>,
    budget: Duration,
) {
    let deadline = sleep(budget);
    tokio::pin!(deadline);

    // Call setup races the budget and a caller close.
    let opened = tokio::select! {
        _ = state.cancel.cancelled() => None,
        _ = &mut deadline => {
            close_on(&state, "budget");
            None
        }
        result = transport.duplex_stream(out_rx) => Some(result),
    };

    match opened {
        Some(Ok(mut responses)) => loop {
            tokio::select! {
                _ = state.cancel.cancelled() => break,
                _ = &mut deadline => {
                    close_on(&state, "budget");
                    break;
                }
                item = responses.recv() => match item {
                    Some(Ok(response)) => {
                        // Forward without wedging on a full caller buffer
                        // while a close is pending.
                        let forwarded = tokio::select! {
                            _ = state.cancel.cancelled() => false,
                            sent = in_tx.send(response) => sent.is_ok(),
                        };
                        if !forwarded {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        tracing::warn!("bidirectional: stream error: {}", e);
                        break;
                    }
                    None => {
                        close_on(&state, "transport");
                        break;
                    }
                }
            }
        },
        Some(Err(e)) => tracing::warn!("bidirectional: call setup failed: {}", e),
        None => {}
    }

    state.begin_close();
    state.cancel.cancel();
    state.finish_close();
}
