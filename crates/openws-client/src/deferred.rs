//! The pending result of a call.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use openws_core::JsonValue;
use openws_protocol::MessageId;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

/// Why a call did not produce a result.
#[derive(Debug, Clone, PartialEq)]
pub enum CallError {
    /// The peer answered with an `error` payload, kept verbatim.
    Remote(JsonValue),
    /// The request could not be serialized, so it was never sent.
    Encode(String),
    /// The client was dropped before a response arrived.
    Abandoned,
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallError::Remote(payload) => write!(f, "remote error: {payload}"),
            CallError::Encode(msg) => write!(f, "cannot encode request: {msg}"),
            CallError::Abandoned => write!(f, "client dropped before a response arrived"),
        }
    }
}

impl std::error::Error for CallError {}

impl CallError {
    /// Returns the peer's error payload if this is a remote error.
    #[must_use]
    pub fn remote_payload(&self) -> Option<&JsonValue> {
        match self {
            CallError::Remote(payload) => Some(payload),
            _ => None,
        }
    }
}

/// Outcome of a call: the `result` field (absent if the peer omitted it) or
/// the reason the call failed.
pub type CallResult = Result<Option<JsonValue>, CallError>;

/// Completion side of a pending call, held by the client's pending table.
#[derive(Debug)]
pub(crate) struct Completion(oneshot::Sender<CallResult>);

impl Completion {
    /// Completes the call. A receiver that was already dropped is ignored.
    pub(crate) fn complete(self, outcome: CallResult) {
        let _ = self.0.send(outcome);
    }
}

/// A call result that is not known yet.
///
/// Returned immediately by [`RpcClient::call`](crate::RpcClient::call) and
/// completed exactly once, when the matching response is handled. Await it,
/// or poll it synchronously with [`Deferred::try_result`].
#[derive(Debug)]
#[must_use = "the call result is lost if the deferred value is dropped"]
pub struct Deferred {
    id: MessageId,
    rx: oneshot::Receiver<CallResult>,
}

impl Deferred {
    pub(crate) fn channel(id: MessageId) -> (Completion, Self) {
        let (tx, rx) = oneshot::channel();
        (Completion(tx), Self { id, rx })
    }

    /// Returns a deferred value that has already failed.
    pub(crate) fn failed(id: MessageId, error: CallError) -> Self {
        let (completion, deferred) = Self::channel(id);
        completion.complete(Err(error));
        deferred
    }

    /// The correlation id of the request this value belongs to.
    #[must_use]
    pub fn id(&self) -> &MessageId {
        &self.id
    }

    /// Takes the outcome if the call has completed.
    ///
    /// Returns `None` while the call is still pending. The outcome is handed
    /// out once; later calls report [`CallError::Abandoned`].
    pub fn try_result(&mut self) -> Option<CallResult> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(CallError::Abandoned)),
        }
    }
}

impl Future for Deferred {
    type Output = CallResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(CallError::Abandoned)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pending_until_completed() {
        let (completion, mut deferred) = Deferred::channel(MessageId::Number(1));
        assert!(deferred.try_result().is_none());
        completion.complete(Ok(Some(json!(42))));
        assert_eq!(deferred.try_result(), Some(Ok(Some(json!(42)))));
    }

    #[test]
    fn test_dropped_completion_is_abandoned() {
        let (completion, mut deferred) = Deferred::channel(MessageId::Number(1));
        drop(completion);
        assert_eq!(deferred.try_result(), Some(Err(CallError::Abandoned)));
    }

    #[test]
    fn test_failed_constructor() {
        let mut deferred = Deferred::failed("x".into(), CallError::Encode("boom".into()));
        assert_eq!(deferred.id(), &MessageId::String("x".into()));
        assert!(matches!(deferred.try_result(), Some(Err(CallError::Encode(_)))));
    }

    #[tokio::test]
    async fn test_await_resolves() {
        let (completion, deferred) = Deferred::channel(MessageId::Number(7));
        completion.complete(Err(CallError::Remote(json!("bad"))));
        let err = deferred.await.unwrap_err();
        assert_eq!(err.remote_payload(), Some(&json!("bad")));
    }

    #[test]
    fn test_call_error_display() {
        assert_eq!(
            CallError::Remote(json!({"code": 1})).to_string(),
            r#"remote error: {"code":1}"#
        );
        assert!(CallError::Abandoned.to_string().contains("dropped"));
    }
}
