//! Structured logging for OpenWS.
//!
//! All OpenWS library crates log through the standard [`log`] facade and
//! never install a logger themselves. Binaries (such as the `openws` CLI)
//! pick the backend.
//!
//! # Log Levels
//!
//! - **error**: Outbound messages that could not be encoded
//! - **warn**: Transport write failures, oversized or non-UTF-8 frames
//! - **info**: CLI lifecycle (files loaded, documents accepted)
//! - **debug**: Calls, notifications, handler registration, completions
//! - **trace**: Every discarded inbound frame and the reason it was dropped
//!
//! # Usage
//!
//! ```ignore
//! use openws_core::logging::{debug, targets, trace};
//!
//! debug!(target: targets::CLIENT, "call {} -> {}", id, method);
//! trace!(target: targets::DISPATCH, "dropping frame: {}", reason);
//! ```
//!
//! # Log Targets
//!
//! - `openws`: Root target for all OpenWS logs
//! - `openws::client`: Outbound calls and notifications
//! - `openws::dispatch`: Inbound routing of responses and events
//! - `openws::spec`: Spec document loading and validation
//! - `openws::transport`: Stream adapters
//! - `openws::codec`: Line framing
//!
//! Example filter: `RUST_LOG=openws::dispatch=trace`

pub use log::{debug, error, info, trace, warn};

pub use log::{Level, LevelFilter};

/// Log targets used by OpenWS components.
pub mod targets {
    /// Root target for all OpenWS logs.
    pub const OPENWS: &str = "openws";

    /// Outbound calls, notifications and handler registration.
    pub const CLIENT: &str = "openws::client";

    /// Inbound response and event routing.
    pub const DISPATCH: &str = "openws::dispatch";

    /// Spec document loading and validation.
    pub const SPEC: &str = "openws::spec";

    /// Stream transport adapters.
    pub const TRANSPORT: &str = "openws::transport";

    /// NDJSON line framing.
    pub const CODEC: &str = "openws::codec";
}

/// Returns whether logging is enabled at the given level for the given target.
///
/// Useful to skip rendering payloads that are only needed for trace output.
#[inline]
#[must_use]
pub fn is_enabled(level: Level, target: &str) -> bool {
    log::log_enabled!(target: target, level)
}

/// Renders a JSON payload for log output, truncated to `max` characters.
///
/// Payloads are caller data of arbitrary size; logs only ever see a prefix.
#[must_use]
pub fn preview(value: &serde_json::Value, max: usize) -> String {
    let rendered = value.to_string();
    if rendered.chars().count() <= max {
        return rendered;
    }
    let mut out: String = rendered.chars().take(max).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn log_targets_are_hierarchical() {
        assert!(targets::CLIENT.starts_with(targets::OPENWS));
        assert!(targets::DISPATCH.starts_with(targets::OPENWS));
        assert!(targets::SPEC.starts_with(targets::OPENWS));
        assert!(targets::TRANSPORT.starts_with(targets::OPENWS));
        assert!(targets::CODEC.starts_with(targets::OPENWS));
    }

    #[test]
    fn test_preview_short_payload_untouched() {
        assert_eq!(preview(&json!({"a": 1}), 64), r#"{"a":1}"#);
    }

    #[test]
    fn test_preview_truncates_long_payload() {
        let long = json!("x".repeat(100));
        let out = preview(&long, 10);
        assert_eq!(out.chars().count(), 11);
        assert!(out.ends_with('…'));
    }
}
