//! Blocking adapters between byte streams and an [`RpcClient`].
//!
//! These cover any duplex channel that exposes `Read` and `Write` halves:
//! a child process's stdio, a TCP stream, a Unix socket, or in-memory
//! buffers in tests. Opening, retrying and closing the channel stays with the
//! caller.
//!
//! # Example
//!
//! ```no_run
//! use std::net::TcpStream;
//! use openws_client::RpcClient;
//! use openws_transport::{LineSender, pump};
//!
//! let stream = TcpStream::connect("127.0.0.1:9000")?;
//! let mut client = RpcClient::new(LineSender::new(stream.try_clone()?));
//! client.on("tick", |data| println!("tick {data:?}"));
//! let pending = client.call("subscribe", None);
//! pump(stream, &mut client)?;
//! # drop(pending);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::io::{self, ErrorKind, Read, Write};

use openws_client::{RpcClient, Sender};
use openws_core::logging::{debug, targets, warn};

use crate::codec::LineCodec;
use crate::TransportError;

/// Read chunk size for [`pump`].
const READ_CHUNK: usize = 8192;

/// A [`Sender`] writing one NDJSON line per message.
///
/// Write failures are logged and otherwise swallowed, since the client
/// contract has no failure channel for sends. The last error is kept and can
/// be inspected with [`LineSender::last_error`].
#[derive(Debug)]
pub struct LineSender<W> {
    writer: W,
    codec: LineCodec,
    sent: u64,
    last_error: Option<io::Error>,
}

impl<W: Write> LineSender<W> {
    /// Wraps a writer.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            codec: LineCodec::new(),
            sent: 0,
            last_error: None,
        }
    }

    /// Number of messages written successfully.
    #[must_use]
    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// The most recent write failure, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<&io::Error> {
        self.last_error.as_ref()
    }

    /// Returns the wrapped writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Consumes the sender, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_frame(&mut self, message: &str) -> io::Result<()> {
        let bytes = self.codec.encode(message);
        self.writer.write_all(&bytes)?;
        self.writer.flush()
    }
}

impl<W: Write> Sender for LineSender<W> {
    fn send(&mut self, message: String) {
        match self.write_frame(&message) {
            Ok(()) => self.sent += 1,
            Err(e) => {
                warn!(target: targets::TRANSPORT, "write failed: {}", e);
                self.last_error = Some(e);
            }
        }
    }
}

/// Reads `reader` to end of stream, feeding every frame to `client`.
///
/// Returns the number of frames handed to the client. Oversized lines are
/// dropped by the codec with a warning; the frames around them still arrive.
///
/// # Errors
///
/// Returns [`TransportError::Io`] if reading fails.
pub fn pump<R, S>(reader: R, client: &mut RpcClient<S>) -> Result<usize, TransportError>
where
    R: Read,
    S: Sender,
{
    pump_with(reader, client, LineCodec::new())
}

/// Like [`pump`], with a caller-configured codec.
pub fn pump_with<R, S>(
    mut reader: R,
    client: &mut RpcClient<S>,
    mut codec: LineCodec,
) -> Result<usize, TransportError>
where
    R: Read,
    S: Sender,
{
    let mut chunk = vec![0u8; READ_CHUNK];
    let mut delivered = 0;

    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(TransportError::Io(e)),
        };

        for frame in codec.decode(&chunk[..n]) {
            client.handle(&frame);
            delivered += 1;
        }
    }

    if let Some(tail) = codec.finish() {
        client.handle(&tail);
        delivered += 1;
    }

    debug!(target: targets::TRANSPORT, "stream closed after {} frame(s)", delivered);
    Ok(delivered)
}
