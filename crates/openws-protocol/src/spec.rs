//! The OpenWS spec document: a description of the methods, notifications,
//! events and named schemas a service exposes.
//!
//! The types here are the typed view of a document that has already passed
//! [`validate_spec`](crate::validate_spec). Build one with
//! [`SpecDocument::from_value`] or the loaders in [`crate::load`].

use std::collections::BTreeMap;

use openws_core::JsonValue;
use serde::{Deserialize, Serialize};

use crate::validate::{SpecError, validate_spec_detailed};

/// Prefix accepted in front of a named schema reference.
pub const SCHEMA_REF_PREFIX: &str = "#/schemas/";

/// Recursive descriptor of an admissible JSON value.
///
/// A valid node carries a non-empty `type` or `$ref` (or both).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaNode {
    /// Primitive type name (`string`, `number`, `integer`, `boolean`,
    /// `object`, `array`, `null`).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Object properties by name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, SchemaNode>>,
    /// Element schema for arrays.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
    /// Reference to a named schema.
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Human readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Example value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<JsonValue>,
    /// Format hint (`date-time`, `uuid`, ...). Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Allowed values.
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<JsonValue>>,
    /// Whether the property may be omitted from its parent object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
}

impl SchemaNode {
    /// Creates a node of the given primitive type.
    #[must_use]
    pub fn typed(kind: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            ..Self::default()
        }
    }

    /// Creates a reference node.
    #[must_use]
    pub fn reference(target: impl Into<String>) -> Self {
        Self {
            reference: Some(target.into()),
            ..Self::default()
        }
    }

    /// Adds a property, turning the node into an object description.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, node: SchemaNode) -> Self {
        self.properties
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), node);
        self
    }

    /// Sets the array element schema.
    #[must_use]
    pub fn with_items(mut self, node: SchemaNode) -> Self {
        self.items = Some(Box::new(node));
        self
    }

    /// Marks the node as optional within its parent.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = Some(true);
        self
    }

    /// Returns true if this node may be absent from its parent object.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.optional.unwrap_or(false)
    }

    /// Returns true if the node satisfies the type-or-reference rule.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        let non_empty = |s: &Option<String>| s.as_deref().is_some_and(|s| !s.is_empty());
        non_empty(&self.kind) || non_empty(&self.reference)
    }
}

/// Service identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecInfo {
    /// Service name.
    pub name: String,
    /// Service description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Service version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Description of a method, notification or event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodSpec {
    /// Human readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Shape of `params` (or of `data` for events).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<SchemaNode>,
    /// Shape of `result`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<SchemaNode>,
    /// Names of entries in the document's `errors` table this may produce.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

/// The aggregate description of a service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecDocument {
    /// Spec format version.
    pub version: String,
    /// Base path of the service endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    /// Service identity.
    pub info: SpecInfo,
    /// Named, reusable schemas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schemas: Option<BTreeMap<String, SchemaNode>>,
    /// Request/response methods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods: Option<BTreeMap<String, MethodSpec>>,
    /// Server-pushed events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<BTreeMap<String, MethodSpec>>,
    /// Fire-and-forget notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications: Option<BTreeMap<String, MethodSpec>>,
    /// Error catalogue. Entries are free-form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, JsonValue>>,
}

/// Failure to turn a value into a [`SpecDocument`].
#[derive(Debug)]
pub enum DocumentError {
    /// The value failed structural validation.
    Invalid(Vec<SpecError>),
    /// The value validated but could not be decoded into the typed model.
    Decode(serde_json::Error),
}

impl std::fmt::Display for DocumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentError::Invalid(errors) => {
                write!(f, "invalid spec document ({} problem(s))", errors.len())?;
                for err in errors {
                    write!(f, "\n  {err}")?;
                }
                Ok(())
            }
            DocumentError::Decode(e) => write!(f, "cannot decode spec document: {e}"),
        }
    }
}

impl std::error::Error for DocumentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DocumentError::Invalid(_) => None,
            DocumentError::Decode(e) => Some(e),
        }
    }
}

impl SpecDocument {
    /// Creates a document with the given format version and service name.
    #[must_use]
    pub fn new(version: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            info: SpecInfo {
                name: name.into(),
                ..SpecInfo::default()
            },
            ..Self::default()
        }
    }

    /// Validates `value` and decodes it into a typed document.
    pub fn from_value(value: JsonValue) -> Result<Self, DocumentError> {
        validate_spec_detailed(&value).map_err(DocumentError::Invalid)?;
        serde_json::from_value(value).map_err(DocumentError::Decode)
    }

    /// Looks up a method by name.
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&MethodSpec> {
        self.methods.as_ref()?.get(name)
    }

    /// Looks up an event by name.
    #[must_use]
    pub fn event(&self, name: &str) -> Option<&MethodSpec> {
        self.events.as_ref()?.get(name)
    }

    /// Looks up a notification by name.
    #[must_use]
    pub fn notification(&self, name: &str) -> Option<&MethodSpec> {
        self.notifications.as_ref()?.get(name)
    }

    /// Looks up a named schema.
    #[must_use]
    pub fn schema(&self, name: &str) -> Option<&SchemaNode> {
        self.schemas.as_ref()?.get(name)
    }

    /// Resolves a `$ref` target, written either as `#/schemas/Name` or `Name`.
    #[must_use]
    pub fn resolve(&self, reference: &str) -> Option<&SchemaNode> {
        let name = reference
            .strip_prefix(SCHEMA_REF_PREFIX)
            .unwrap_or(reference);
        self.schema(name)
    }

    /// Returns the names of the methods in lexical order.
    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.iter().flat_map(|m| m.keys().map(String::as_str))
    }
}
