//! The outbound half of the transport contract.

/// Accepts serialized outbound messages.
///
/// The client hands every request and notification to its sender as one
/// JSON string and does nothing else with it. Delivery failures are the
/// sender's business: the client neither retries nor observes them.
///
/// Any `FnMut(String)` closure is a sender:
///
/// ```
/// use openws_client::RpcClient;
///
/// let mut outbox = Vec::new();
/// let mut client = RpcClient::new(|msg: String| outbox.push(msg));
/// client.notify("ready", None);
/// drop(client);
/// assert_eq!(outbox.len(), 1);
/// ```
pub trait Sender {
    /// Sends one serialized message.
    fn send(&mut self, message: String);
}

impl<F> Sender for F
where
    F: FnMut(String),
{
    fn send(&mut self, message: String) {
        self(message);
    }
}
