//! OpenWS client engine.
//!
//! [`RpcClient`] turns method calls into correlated request/response pairs,
//! sends fire-and-forget notifications, and routes server-pushed events to
//! registered handlers. It is transport-agnostic: give it a [`Sender`] for
//! outbound messages and feed every inbound frame to [`RpcClient::handle`].
//!
//! ```text
//!   call/notify ──► RpcClient ──► Sender::send(json)      ──► transport
//!   Deferred    ◄── RpcClient ◄── RpcClient::handle(raw)  ◄── transport
//!   on(event)   ◄──────┘
//! ```
//!
//! The engine is single-threaded and lock-free: every table mutation happens
//! inside `call`, `on` or `handle`. A [`Deferred`] completes inside whichever
//! `handle` call delivers its response.

#![forbid(unsafe_code)]

mod client;
mod deferred;
mod sender;

pub use client::{EventHandler, RpcClient};
pub use deferred::{CallError, CallResult, Deferred};
pub use sender::Sender;

pub use openws_protocol::{JsonValue, MessageId};
