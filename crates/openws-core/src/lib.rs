//! Core building blocks shared by every OpenWS crate.
//!
//! This crate provides:
//! - [`logging`]: the `log` facade re-exports and the hierarchical targets
//!   used across the workspace
//! - [`JsonValue`]: the closed JSON value algebra carried by params, results,
//!   error payloads and schema examples
//!
//! OpenWS is a JSON-RPC 2.0 flavoured protocol with one extension: servers may
//! push named events (`{"jsonrpc":"2.0","event":"...","data":...}`) that the
//! client routes to registered handlers.

#![forbid(unsafe_code)]

pub mod logging;

/// JSON value carried by params, results, error payloads and schema examples.
///
/// An alias rather than a newtype: payloads are passed through untouched, so
/// equality and serialization are exactly those of `serde_json`.
pub type JsonValue = serde_json::Value;

/// Protocol version tag written into every outbound message.
pub const JSONRPC_VERSION: &str = "2.0";
