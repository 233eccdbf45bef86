//! Checking JSON values against spec schema nodes.
//!
//! The client engine never validates what it sends or receives. Callers that
//! want to vet params or results against a spec document do it here:
//!
//! - Type checking (string, number, integer, boolean, object, array, null);
//!   unknown type names accept any value
//! - Enum validation
//! - Declared properties are required unless marked `optional`
//! - Items validation for arrays
//! - `$ref` resolution against the document's named schemas

use serde_json::Value;
use std::fmt;

use crate::spec::{MethodSpec, SchemaNode, SpecDocument};
use crate::validate::json_type_name;

/// Maximum number of consecutive `$ref` hops without descending into the value.
const MAX_REF_HOPS: usize = 32;

/// Error returned when a value does not match a schema node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Path to the invalid value (e.g., `root.foo.bar` or `root[0]`).
    pub path: String,
    /// Description of what went wrong.
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Result of checking a value, listing every mismatch on failure.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

impl SchemaNode {
    /// Checks `value` against this node, resolving references in `doc`.
    ///
    /// # Example
    ///
    /// ```
    /// use openws_protocol::{SchemaNode, SpecDocument};
    /// use serde_json::json;
    ///
    /// let doc = SpecDocument::new("1.0", "svc");
    /// let node = SchemaNode::typed("object")
    ///     .with_property("name", SchemaNode::typed("string"))
    ///     .with_property("age", SchemaNode::typed("integer").optional());
    ///
    /// assert!(node.check(&json!({"name": "Alice"}), &doc).is_ok());
    /// assert!(node.check(&json!({"age": 30}), &doc).is_err());
    /// ```
    pub fn check(&self, value: &Value, doc: &SpecDocument) -> ValidationResult {
        let mut errors = Vec::new();
        check_internal(self, value, doc, "root", 0, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl SpecDocument {
    /// Checks `params` against the named method's `params` schema.
    ///
    /// A method without a `params` schema accepts anything.
    pub fn check_params(&self, method: &str, params: &Value) -> ValidationResult {
        let spec = self.lookup_method(method)?;
        match &spec.params {
            Some(node) => node.check(params, self),
            None => Ok(()),
        }
    }

    /// Checks `result` against the named method's `result` schema.
    pub fn check_result(&self, method: &str, result: &Value) -> ValidationResult {
        let spec = self.lookup_method(method)?;
        match &spec.result {
            Some(node) => node.check(result, self),
            None => Ok(()),
        }
    }

    fn lookup_method(&self, method: &str) -> Result<&MethodSpec, Vec<ValidationError>> {
        self.method(method).ok_or_else(|| {
            vec![ValidationError {
                path: "root".to_string(),
                message: format!("unknown method: {method}"),
            }]
        })
    }
}

fn check_internal(
    node: &SchemaNode,
    value: &Value,
    doc: &SpecDocument,
    path: &str,
    hops: usize,
    errors: &mut Vec<ValidationError>,
) {
    if let Some(reference) = node.reference.as_deref().filter(|r| !r.is_empty()) {
        if hops >= MAX_REF_HOPS {
            errors.push(ValidationError {
                path: path.to_string(),
                message: format!("reference chain too deep at {reference}"),
            });
            return;
        }
        match doc.resolve(reference) {
            Some(target) => check_internal(target, value, doc, path, hops + 1, errors),
            None => {
                errors.push(ValidationError {
                    path: path.to_string(),
                    message: format!("unresolved reference: {reference}"),
                });
                return;
            }
        }
    }

    if let Some(kind) = node.kind.as_deref() {
        if !matches_type(kind, value) {
            errors.push(ValidationError {
                path: path.to_string(),
                message: format!("expected type {kind}, got {}", json_type_name(value)),
            });
            return; // Type mismatch, skip further validation
        }
    }

    if let Some(allowed) = &node.enum_values {
        if !allowed.contains(value) {
            errors.push(ValidationError {
                path: path.to_string(),
                message: format!("value must be one of: {}", Value::Array(allowed.clone())),
            });
        }
    }

    match value {
        Value::Object(obj) => {
            if let Some(properties) = &node.properties {
                for (name, child) in properties {
                    match obj.get(name) {
                        Some(v) => {
                            check_internal(child, v, doc, &format!("{path}.{name}"), 0, errors);
                        }
                        None if !child.is_optional() => errors.push(ValidationError {
                            path: path.to_string(),
                            message: format!("missing required field: {name}"),
                        }),
                        None => {}
                    }
                }
            }
        }
        Value::Array(arr) => {
            if let Some(items) = &node.items {
                for (i, item) in arr.iter().enumerate() {
                    check_internal(items, item, doc, &format!("{path}[{i}]"), 0, errors);
                }
            }
        }
        _ => {}
    }
}

/// Checks if a value matches a single type name.
fn matches_type(type_name: &str, value: &Value) -> bool {
    match type_name {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        _ => true, // Unknown type, accept
    }
}
