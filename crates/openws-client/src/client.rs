//! The request-correlation and dispatch engine.

use std::collections::HashMap;
use std::fmt;

use openws_core::JsonValue;
use openws_core::logging::{Level, debug, error, is_enabled, preview, targets, trace};
use openws_protocol::{Inbound, Message, MessageId, Notification, Request};

use crate::deferred::{CallError, Completion, Deferred};
use crate::sender::Sender;

/// Callback invoked with an event's `data` (absent if the peer omitted it).
pub type EventHandler = Box<dyn FnMut(Option<JsonValue>) + Send>;

/// Longest payload prefix written to trace logs.
const LOG_PREVIEW: usize = 200;

/// JSON-RPC client over an arbitrary string transport.
///
/// The client owns three pieces of state: the id counter, the table of
/// calls awaiting a response, and the event handler registry. It performs
/// no I/O of its own. Outbound messages go to the [`Sender`] given at
/// construction; inbound frames must be fed to [`RpcClient::handle`].
///
/// # Example
///
/// ```
/// use openws_client::RpcClient;
/// use serde_json::json;
///
/// let mut sent = Vec::new();
/// let mut client = RpcClient::new(|msg: String| sent.push(msg));
///
/// let mut sum = client.call("sum", Some(json!([1, 2])));
/// client.handle(r#"{"jsonrpc":"2.0","id":0,"result":3}"#);
/// assert_eq!(sum.try_result(), Some(Ok(Some(json!(3)))));
/// ```
pub struct RpcClient<S> {
    next_id: i64,
    pending: HashMap<MessageId, Completion>,
    handlers: HashMap<String, EventHandler>,
    sender: S,
}

impl<S> fmt::Debug for RpcClient<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcClient")
            .field("next_id", &self.next_id)
            .field("pending", &self.pending.len())
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl<S: Sender> RpcClient<S> {
    /// Creates a client that writes outbound messages to `sender`.
    #[must_use]
    pub fn new(sender: S) -> Self {
        Self {
            next_id: 0,
            pending: HashMap::new(),
            handlers: HashMap::new(),
            sender,
        }
    }

    /// Sends a request and returns its not-yet-known result.
    ///
    /// The returned value completes when a response carrying the same id is
    /// passed to [`handle`](Self::handle). There is no timeout: a call the
    /// peer never answers stays pending for the life of the client.
    pub fn call(&mut self, method: impl Into<String>, params: Option<JsonValue>) -> Deferred {
        let id = self.allocate_id();
        let request = Request::new(id.clone(), method, params);

        let wire = match Message::from(request).to_wire() {
            Ok(wire) => wire,
            Err(e) => {
                error!(target: targets::CLIENT, "cannot encode request {}: {}", id, e);
                return Deferred::failed(id, CallError::Encode(e.to_string()));
            }
        };

        let (completion, deferred) = Deferred::channel(id.clone());
        self.pending.insert(id.clone(), completion);
        debug!(target: targets::CLIENT, "call {} ({} pending)", id, self.pending.len());
        self.sender.send(wire);
        deferred
    }

    /// Sends a notification. No id is attached and no reply is expected.
    pub fn notify(&mut self, method: impl Into<String>, params: Option<JsonValue>) {
        let notification = Notification::new(method, params);
        match Message::from(notification).to_wire() {
            Ok(wire) => {
                debug!(target: targets::CLIENT, "notify");
                self.sender.send(wire);
            }
            Err(e) => error!(target: targets::CLIENT, "cannot encode notification: {}", e),
        }
    }

    /// Registers the handler for `event`, replacing any previous one.
    ///
    /// Events that arrive while no handler is registered are dropped.
    pub fn on<F>(&mut self, event: impl Into<String>, handler: F)
    where
        F: FnMut(Option<JsonValue>) + Send + 'static,
    {
        let event = event.into();
        debug!(target: targets::CLIENT, "handler registered for {:?}", event);
        if self.handlers.insert(event, Box::new(handler)).is_some() {
            trace!(target: targets::CLIENT, "previous handler replaced");
        }
    }

    /// Processes one raw inbound frame.
    ///
    /// Responses complete the matching pending call (exactly once); events
    /// go to their registered handler. Anything else is dropped: malformed
    /// JSON, non-objects, objects with neither `id` nor `event`, responses
    /// for ids that are not pending, and events without a handler. None of
    /// these cases is reported to the caller.
    pub fn handle(&mut self, raw: &str) {
        match Inbound::parse(raw) {
            Ok(Inbound::Response(response)) => {
                let Some(completion) = self.pending.remove(&response.id) else {
                    trace!(target: targets::DISPATCH, "no pending call for id {}", response.id);
                    return;
                };
                let outcome = match response.failure_payload() {
                    Some(payload) => Err(CallError::Remote(payload.clone())),
                    None => Ok(response.result),
                };
                debug!(
                    target: targets::DISPATCH,
                    "call {} {}",
                    response.id,
                    if outcome.is_ok() { "resolved" } else { "rejected" }
                );
                completion.complete(outcome);
            }
            Ok(Inbound::Event(event)) => match self.handlers.get_mut(&event.event) {
                Some(handler) => {
                    if is_enabled(Level::Trace, targets::DISPATCH) {
                        let data = event.data.as_ref().map(|d| preview(d, LOG_PREVIEW));
                        trace!(target: targets::DISPATCH, "event {:?} data={:?}", event.event, data);
                    }
                    handler(event.data);
                }
                None => {
                    trace!(target: targets::DISPATCH, "no handler for event {:?}", event.event);
                }
            },
            Err(reason) => {
                trace!(target: targets::DISPATCH, "dropping inbound frame: {}", reason);
            }
        }
    }

    /// Number of calls still waiting for a response.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Returns true if a call with this id is waiting for a response.
    #[must_use]
    pub fn is_pending(&self, id: &MessageId) -> bool {
        self.pending.contains_key(id)
    }

    /// Returns true if a handler is registered for `event`.
    #[must_use]
    pub fn has_handler(&self, event: &str) -> bool {
        self.handlers.contains_key(event)
    }

    /// Returns the sender.
    pub fn sender(&self) -> &S {
        &self.sender
    }

    /// Returns the sender mutably.
    pub fn sender_mut(&mut self) -> &mut S {
        &mut self.sender
    }

    /// Takes the next id, skipping any value still in the pending table.
    fn allocate_id(&mut self) -> MessageId {
        loop {
            let id = MessageId::Number(self.next_id);
            self.next_id = self.next_id.wrapping_add(1);
            if !self.pending.contains_key(&id) {
                return id;
            }
        }
    }
}
