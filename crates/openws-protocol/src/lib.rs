//! OpenWS protocol types and spec document validation.
//!
//! This crate provides:
//! - The four wire message shapes ([`Request`], [`Response`],
//!   [`Notification`], [`Event`]) and inbound classification ([`Inbound`])
//! - The spec document model ([`SpecDocument`], [`MethodSpec`], [`SchemaNode`])
//! - Structural validation of spec documents ([`validate_spec`])
//! - Opt-in checking of values against schema nodes ([`SchemaNode::check`])
//! - Loading documents from JSON, YAML or TOML ([`load`])
//!
//! # Wire Format
//!
//! ```text
//! Request       {"jsonrpc":"2.0","id":0,"method":"sum","params":[1,2]}
//! Response      {"jsonrpc":"2.0","id":0,"result":3}
//! Notification  {"jsonrpc":"2.0","method":"log","params":{"x":5}}
//! Event         {"jsonrpc":"2.0","event":"tick","data":{"n":1}}
//! ```

#![forbid(unsafe_code)]

mod jsonrpc;
pub mod load;
pub mod schema;
mod spec;
mod validate;

pub use jsonrpc::{Discard, Event, Inbound, Message, MessageId, Notification, Request, Response};
pub use load::{LoadError, SpecFormat, load_spec_file, load_spec_str};
pub use openws_core::{JSONRPC_VERSION, JsonValue};
pub use schema::{ValidationError, ValidationResult};
pub use spec::{DocumentError, MethodSpec, SCHEMA_REF_PREFIX, SchemaNode, SpecDocument, SpecInfo};
pub use validate::{SpecError, SpecResult, validate_schema_node, validate_spec, validate_spec_detailed};
