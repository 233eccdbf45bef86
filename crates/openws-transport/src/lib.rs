//! Stream transports for OpenWS.
//!
//! The client engine only needs a [`Sender`](openws_client::Sender) and a
//! caller that feeds it inbound frames. This crate supplies both for byte
//! streams framed as newline-delimited JSON:
//!
//! - [`LineCodec`]: NDJSON framing with a frame size limit
//! - [`LineSender`]: a sender over any `Write`
//! - [`pump`]: reads any `Read` to end of stream, handing each frame to the
//!   client

#![forbid(unsafe_code)]

mod codec;
mod stream;

pub use codec::{CodecError, DEFAULT_MAX_FRAME, LineCodec};
pub use stream::{LineSender, pump, pump_with};

/// Transport error types.
#[derive(Debug)]
pub enum TransportError {
    /// Reading the underlying stream failed.
    Io(std::io::Error),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Io(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::Io(err)
    }
}
