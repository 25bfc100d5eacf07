//! One asynchronous unit of request execution.
//!
//! A [`RequestOperation`] builds a URL and an HTTP request from an
//! endpoint description and an optional body, performs the transfer,
//! decodes the response and reports exactly one terminal outcome. Its
//! lifecycle is tracked by an explicit state machine shared with the
//! caller through a [`RequestHandle`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::watch;

use crate::codec::{DecodingError, FormatDecoder, FormatEncoder};
use crate::endpoint::{Endpoint, encode_url};
use crate::error::ClientError;

/// Fixed user agent attached to every outbound request.
const USER_AGENT: &str = concat!("chargeprice-rs/", env!("CARGO_PKG_VERSION"));

/// Fixed per-request transfer timeout. A timeout surfaces as a
/// transport failure, not a distinct state.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Lifecycle of a request operation.
///
/// `Created → Executing → {Succeeded, Failed, Cancelled}`, plus
/// `Created → Cancelled` for operations cancelled before they were
/// dequeued. Terminal states are mutually exclusive and final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OperationState {
    /// Submitted, waiting for an execution slot.
    Created = 0,
    /// Dequeued; the transfer may be in flight.
    Executing = 1,
    /// The response decoded into the expected type.
    Succeeded = 2,
    /// URL construction, transfer, decoding or post-processing failed.
    Failed = 3,
    /// Cancelled by the caller; the completion callback never fires.
    Cancelled = 4,
}

impl OperationState {
    /// Whether the operation has reached a terminal state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }

    const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Created, Self::Executing)
                | (Self::Created, Self::Cancelled)
                | (Self::Executing, Self::Succeeded)
                | (Self::Executing, Self::Failed)
                | (Self::Executing, Self::Cancelled)
        )
    }

    const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Created,
            1 => Self::Executing,
            2 => Self::Succeeded,
            3 => Self::Failed,
            _ => Self::Cancelled,
        }
    }
}

struct HandleShared {
    state: AtomicU8,
    cancel: watch::Sender<bool>,
}

/// Caller-facing token for one submitted request.
///
/// Cloneable; all clones observe the same operation. Dropping a handle
/// does not cancel the request.
#[derive(Clone)]
pub struct RequestHandle {
    shared: Arc<HandleShared>,
}

impl RequestHandle {
    pub(crate) fn new() -> (Self, watch::Receiver<bool>) {
        let (cancel, cancelled) = watch::channel(false);
        let handle = Self {
            shared: Arc::new(HandleShared {
                state: AtomicU8::new(OperationState::Created as u8),
                cancel,
            }),
        };
        (handle, cancelled)
    }

    /// Request cancellation of the operation.
    ///
    /// Best-effort and idempotent. If the operation has not started, it
    /// never will; if the transfer is in flight, it is aborted. In both
    /// cases the completion callback does not fire. Cancelling an
    /// already-terminal operation has no effect.
    pub fn cancel(&self) {
        if self.transition(OperationState::Cancelled) {
            // Receiver may already be gone when the worker finished first.
            let _ = self.shared.cancel.send(true);
        }
    }

    /// Current lifecycle state of the operation.
    #[must_use]
    pub fn state(&self) -> OperationState {
        OperationState::from_raw(self.shared.state.load(Ordering::Acquire))
    }

    /// Whether the operation ended up cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.state() == OperationState::Cancelled
    }

    /// `Created → Executing`; fails when cancellation won the race.
    pub(crate) fn try_start(&self) -> bool {
        self.transition(OperationState::Executing)
    }

    /// Move to a terminal outcome; fails when another terminal state
    /// (notably `Cancelled`) got there first.
    pub(crate) fn mark(&self, next: OperationState) -> bool {
        self.transition(next)
    }

    /// The single transition function guarding the state machine.
    fn transition(&self, next: OperationState) -> bool {
        let mut current = self.state();
        loop {
            if !current.can_transition_to(next) {
                return false;
            }
            match self.shared.state.compare_exchange(
                current as u8,
                next as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(actual) => current = OperationState::from_raw(actual),
            }
        }
    }
}

/// A request body paired with the encoder that serializes it.
pub(crate) struct CodingPart<B, C> {
    pub(crate) body: B,
    pub(crate) coding: C,
}

/// The transfer half of one operation: endpoint, optional body, decoder.
///
/// Execution is strictly sequential: encode, build URL and request,
/// transfer, decode. Suspension only happens inside the transfer; all
/// other steps are synchronous CPU work on the worker that owns the
/// operation.
pub(crate) struct RequestOperation<E, B, Enc, Dec> {
    http: reqwest::Client,
    api_key: String,
    endpoint: E,
    encoding: Option<CodingPart<B, Enc>>,
    decoding: Dec,
}

impl<E, B, Enc, Dec> RequestOperation<E, B, Enc, Dec>
where
    E: Endpoint,
    B: Serialize,
    Enc: FormatEncoder,
    Dec: FormatDecoder,
{
    pub(crate) fn new(
        http: reqwest::Client,
        api_key: String,
        endpoint: E,
        encoding: Option<CodingPart<B, Enc>>,
        decoding: Dec,
    ) -> Self {
        Self {
            http,
            api_key,
            endpoint,
            encoding,
            decoding,
        }
    }

    /// Perform the transfer and decode the response envelope.
    pub(crate) async fn execute<Resp>(self) -> Result<Resp, ClientError>
    where
        Resp: DeserializeOwned,
    {
        let url = encode_url(&self.endpoint).map_err(|error| {
            tracing::error!(%error, "endpoint URL construction failed");
            ClientError::Transport(error.to_string())
        })?;

        tracing::debug!(%url, "starting transfer");

        let mut request = self
            .http
            .request(self.endpoint.method().into(), url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header("api-key", &self.api_key)
            .timeout(REQUEST_TIMEOUT);

        if let Some(part) = &self.encoding {
            let bytes = part.coding.encode(&part.body)?;
            request = request
                .header(reqwest::header::CONTENT_TYPE, part.coding.mime_type())
                .body(bytes);
        }

        let response = request.send().await.map_err(|error| {
            tracing::error!(%error, "transfer failed");
            ClientError::Transport(error.to_string())
        })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|error| ClientError::Transport(error.to_string()))?;

        if bytes.is_empty() {
            tracing::error!(status = status.as_u16(), "response carried no body");
            return Err(ClientError::Decoding(DecodingError::EmptyBody));
        }

        let value = self.decoding.decode(&bytes)?;
        tracing::debug!(status = status.as_u16(), bytes = bytes.len(), "transfer finished");
        Ok(value)
    }
}
