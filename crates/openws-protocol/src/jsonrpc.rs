//! OpenWS wire messages: JSON-RPC 2.0 requests, responses and notifications
//! plus the server-pushed event extension.

use openws_core::{JSONRPC_VERSION, JsonValue};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

fn default_version() -> String {
    JSONRPC_VERSION.to_owned()
}

/// Keeps an explicit `null` distinct from an absent field.
///
/// Used with `#[serde(default)]`: a missing key stays `None`, while a key set
/// to `null` becomes `Some(Value::Null)`.
fn present<'de, D>(deserializer: D) -> Result<Option<JsonValue>, D::Error>
where
    D: Deserializer<'de>,
{
    JsonValue::deserialize(deserializer).map(Some)
}

/// Correlation id linking a request to its response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageId {
    /// Integer ID.
    Number(i64),
    /// String ID.
    String(String),
}

impl From<i64> for MessageId {
    fn from(id: i64) -> Self {
        MessageId::Number(id)
    }
}

impl From<String> for MessageId {
    fn from(id: String) -> Self {
        MessageId::String(id)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        MessageId::String(id.to_owned())
    }
}

impl MessageId {
    /// Reads an inbound `id` value.
    ///
    /// Integral floats (`2.0`) become [`MessageId::Number`], since JSON does
    /// not distinguish them from integers. Other numbers, `null`, arrays and
    /// objects are not ids.
    #[allow(clippy::float_cmp, clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_wire(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::String(s) => Some(MessageId::String(s.clone())),
            JsonValue::Number(n) => n.as_i64().map(MessageId::Number).or_else(|| {
                let f = n.as_f64()?;
                let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
                if in_range && f.trunc() == f {
                    Some(MessageId::Number(f as i64))
                } else {
                    None
                }
            }),
            _ => None,
        }
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageId::Number(n) => write!(f, "{n}"),
            MessageId::String(s) => write!(f, "{s:?}"),
        }
    }
}

/// A call expecting exactly one response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Protocol version (always "2.0" when built locally).
    #[serde(default = "default_version")]
    pub jsonrpc: String,
    /// Correlation id.
    pub id: MessageId,
    /// Method name.
    pub method: String,
    /// Request parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<JsonValue>,
}

impl Request {
    /// Creates a new request with the given id, method and parameters.
    #[must_use]
    pub fn new(id: impl Into<MessageId>, method: impl Into<String>, params: Option<JsonValue>) -> Self {
        Self {
            jsonrpc: default_version(),
            id: id.into(),
            method: method.into(),
            params,
        }
    }
}

/// A reply to a [`Request`].
///
/// `result` and `error` are not mutually exclusive on the wire. The
/// dispatcher gives a non-null `error` precedence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Protocol version.
    #[serde(default = "default_version")]
    pub jsonrpc: String,
    /// Id of the request this answers.
    pub id: MessageId,
    /// Result (present on success, possibly `null`).
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub result: Option<JsonValue>,
    /// Error payload, kept exactly as the peer sent it.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonValue>,
}

impl Response {
    /// Creates a success response.
    #[must_use]
    pub fn success(id: impl Into<MessageId>, result: JsonValue) -> Self {
        Self {
            jsonrpc: default_version(),
            id: id.into(),
            result: Some(result),
            error: None,
        }
    }

    /// Creates an error response carrying an arbitrary payload.
    #[must_use]
    pub fn failure(id: impl Into<MessageId>, error: JsonValue) -> Self {
        Self {
            jsonrpc: default_version(),
            id: id.into(),
            result: None,
            error: Some(error),
        }
    }

    /// Returns the error payload if the response counts as a failure.
    ///
    /// An explicit `"error": null` is treated the same as an absent error.
    /// Every other payload, including `false`, `0` and `""`, is a failure.
    #[must_use]
    pub fn failure_payload(&self) -> Option<&JsonValue> {
        // Null is how JSON-RPC peers spell "no error" on success responses.
        self.error.as_ref().filter(|e| !e.is_null())
    }
}

/// A one-way call. Has no id, so no reply is ever correlated to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Protocol version.
    #[serde(default = "default_version")]
    pub jsonrpc: String,
    /// Method name.
    pub method: String,
    /// Notification parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<JsonValue>,
}

impl Notification {
    /// Creates a notification.
    #[must_use]
    pub fn new(method: impl Into<String>, params: Option<JsonValue>) -> Self {
        Self {
            jsonrpc: default_version(),
            method: method.into(),
            params,
        }
    }
}

/// A server-initiated message routed by name to a registered handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Protocol version.
    #[serde(default = "default_version")]
    pub jsonrpc: String,
    /// Event name.
    pub event: String,
    /// Event payload.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
}

impl Event {
    /// Creates an event.
    #[must_use]
    pub fn new(event: impl Into<String>, data: Option<JsonValue>) -> Self {
        Self {
            jsonrpc: default_version(),
            event: event.into(),
            data,
        }
    }
}

/// Any OpenWS wire message.
///
/// Deserialization tries the shapes in declaration order, so a value with
/// both `id` and `method` is a request, `id` alone a response, `event` an
/// event and `method` alone a notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Message {
    /// A request.
    Request(Request),
    /// A response.
    Response(Response),
    /// An event.
    Event(Event),
    /// A notification.
    Notification(Notification),
}

impl Message {
    /// Serializes the message to its single-line JSON wire form.
    pub fn to_wire(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<Request> for Message {
    fn from(m: Request) -> Self {
        Message::Request(m)
    }
}

impl From<Response> for Message {
    fn from(m: Response) -> Self {
        Message::Response(m)
    }
}

impl From<Notification> for Message {
    fn from(m: Notification) -> Self {
        Message::Notification(m)
    }
}

impl From<Event> for Message {
    fn from(m: Event) -> Self {
        Message::Event(m)
    }
}

/// Why an inbound frame was not routed anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discard {
    /// The frame is not valid JSON.
    Malformed,
    /// The frame is JSON but not an object.
    NotAnObject,
    /// The object has an `id` that cannot be a correlation id.
    BadId,
    /// The object has an `event` that is not a string.
    BadEvent,
    /// The object carries neither `id` nor `event`.
    Unrecognized,
}

impl fmt::Display for Discard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Discard::Malformed => "malformed JSON",
            Discard::NotAnObject => "not an object",
            Discard::BadId => "id is neither an integer nor a string",
            Discard::BadEvent => "event name is not a string",
            Discard::Unrecognized => "neither id nor event present",
        };
        f.write_str(reason)
    }
}

/// An inbound frame the client knows how to route.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Anything carrying an `id`.
    Response(Response),
    /// Anything carrying an `event` and no `id`.
    Event(Event),
}

impl Inbound {
    /// Parses and classifies a raw inbound frame.
    ///
    /// Classification looks only at field presence: `id` wins over `event`,
    /// and any other object is [`Discard::Unrecognized`].
    pub fn parse(raw: &str) -> Result<Self, Discard> {
        let value: JsonValue = serde_json::from_str(raw).map_err(|_| Discard::Malformed)?;
        Self::classify(value)
    }

    /// Classifies an already parsed value.
    ///
    /// Only the routing fields are read. The `jsonrpc` tag is kept when it
    /// is a string and otherwise ignored.
    pub fn classify(value: JsonValue) -> Result<Self, Discard> {
        let JsonValue::Object(mut map) = value else {
            return Err(Discard::NotAnObject);
        };
        let jsonrpc = map
            .get("jsonrpc")
            .and_then(JsonValue::as_str)
            .map_or_else(default_version, str::to_owned);

        if let Some(id) = map.remove("id") {
            let id = MessageId::from_wire(&id).ok_or(Discard::BadId)?;
            return Ok(Inbound::Response(Response {
                jsonrpc,
                id,
                result: map.remove("result"),
                error: map.remove("error"),
            }));
        }
        if let Some(event) = map.remove("event") {
            let JsonValue::String(event) = event else {
                return Err(Discard::BadEvent);
            };
            return Ok(Inbound::Event(Event {
                jsonrpc,
                event,
                data: map.remove("data"),
            }));
        }
        Err(Discard::Unrecognized)
    }
}
