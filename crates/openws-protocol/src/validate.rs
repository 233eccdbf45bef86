//! Structural validation of OpenWS spec documents.
//!
//! Validation walks an arbitrary JSON value and checks it against the spec
//! document shape:
//!
//! - `version` (string) and `info.name` (string) are required
//! - every optional field, when present, must have the declared type
//!   (`null` is not accepted in place of a missing field)
//! - every schema node reachable from `schemas`, from a method's `params` /
//!   `result`, or nested under `properties` / `items`, must carry a
//!   non-empty `type` or `$ref`
//! - unknown keys are ignored
//!
//! A single bad node anywhere rejects the whole document.

use serde_json::{Map, Value};
use std::fmt;

use openws_core::logging::{debug, targets};

/// One problem found in a spec document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecError {
    /// Path to the offending value (e.g. `root.methods.sum.params`).
    pub path: String,
    /// Description of what went wrong.
    pub message: String,
}

impl SpecError {
    fn new(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

impl std::error::Error for SpecError {}

/// Result of spec validation, listing every problem on failure.
pub type SpecResult = Result<(), Vec<SpecError>>;

/// Returns true if `data` is a well-formed spec document.
///
/// # Example
///
/// ```
/// use openws_protocol::validate_spec;
/// use serde_json::json;
///
/// assert!(validate_spec(&json!({"version": "1.0", "info": {"name": "x"}})));
/// assert!(!validate_spec(&json!({
///     "version": "1.0",
///     "info": {"name": "x"},
///     "schemas": {"Foo": {"description": "d"}}
/// })));
/// ```
#[must_use]
pub fn validate_spec(data: &Value) -> bool {
    validate_spec_detailed(data).is_ok()
}

/// Validates `data` as a spec document, reporting every problem found.
pub fn validate_spec_detailed(data: &Value) -> SpecResult {
    let mut errors = Vec::new();
    validate_document(data, "root", &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        debug!(
            target: targets::SPEC,
            "spec document rejected with {} problem(s)",
            errors.len()
        );
        Err(errors)
    }
}

/// Validates a single schema node and everything beneath it.
pub fn validate_schema_node(node: &Value) -> SpecResult {
    let mut errors = Vec::new();
    validate_node(node, "root", &mut errors);
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn validate_document(data: &Value, path: &str, errors: &mut Vec<SpecError>) {
    let Some(doc) = expect_object(data, path, errors) else {
        return;
    };

    required_string(doc, "version", path, errors);
    optional_string(doc, "basePath", path, errors);

    match doc.get("info") {
        None => errors.push(SpecError::new(path, "missing required field: info")),
        Some(info) => {
            let info_path = format!("{path}.info");
            if let Some(info) = expect_object(info, &info_path, errors) {
                required_string(info, "name", &info_path, errors);
                optional_string(info, "description", &info_path, errors);
                optional_string(info, "version", &info_path, errors);
            }
        }
    }

    if let Some(schemas) = optional_record(doc, "schemas", path, errors) {
        for (name, node) in schemas {
            validate_node(node, &format!("{path}.schemas.{name}"), errors);
        }
    }

    for section in ["methods", "events", "notifications"] {
        if let Some(entries) = optional_record(doc, section, path, errors) {
            for (name, entry) in entries {
                validate_method(entry, &format!("{path}.{section}.{name}"), errors);
            }
        }
    }

    // Error catalogue entries are free-form; only the container is checked.
    optional_record(doc, "errors", path, errors);
}

fn validate_method(entry: &Value, path: &str, errors: &mut Vec<SpecError>) {
    let Some(method) = expect_object(entry, path, errors) else {
        return;
    };

    optional_string(method, "description", path, errors);
    for key in ["params", "result"] {
        if let Some(node) = method.get(key) {
            validate_node(node, &format!("{path}.{key}"), errors);
        }
    }

    if let Some(codes) = method.get("errors") {
        let codes_path = format!("{path}.errors");
        match codes.as_array() {
            Some(codes) => {
                for (i, code) in codes.iter().enumerate() {
                    if !code.is_string() {
                        errors.push(SpecError::new(
                            &format!("{codes_path}[{i}]"),
                            format!("expected string, got {}", json_type_name(code)),
                        ));
                    }
                }
            }
            None => errors.push(SpecError::new(
                &codes_path,
                format!("expected array, got {}", json_type_name(codes)),
            )),
        }
    }
}

/// Recursive schema node validation.
fn validate_node(node: &Value, path: &str, errors: &mut Vec<SpecError>) {
    let Some(obj) = expect_object(node, path, errors) else {
        return;
    };

    for key in ["type", "$ref", "description", "format"] {
        optional_string(obj, key, path, errors);
    }

    if let Some(flag) = obj.get("optional") {
        if !flag.is_boolean() {
            errors.push(SpecError::new(
                &format!("{path}.optional"),
                format!("expected boolean, got {}", json_type_name(flag)),
            ));
        }
    }

    if let Some(values) = obj.get("enum") {
        if !values.is_array() {
            errors.push(SpecError::new(
                &format!("{path}.enum"),
                format!("expected array, got {}", json_type_name(values)),
            ));
        }
    }

    if let Some(properties) = optional_record(obj, "properties", path, errors) {
        for (name, child) in properties {
            validate_node(child, &format!("{path}.properties.{name}"), errors);
        }
    }

    if let Some(items) = obj.get("items") {
        validate_node(items, &format!("{path}.items"), errors);
    }

    let truthy = |key: &str| obj.get(key).and_then(Value::as_str).is_some_and(|s| !s.is_empty());
    if !truthy("$ref") && !truthy("type") {
        errors.push(SpecError::new(path, "must have either $ref or type"));
    }
}

fn expect_object<'a>(
    value: &'a Value,
    path: &str,
    errors: &mut Vec<SpecError>,
) -> Option<&'a Map<String, Value>> {
    let obj = value.as_object();
    if obj.is_none() {
        errors.push(SpecError::new(
            path,
            format!("expected object, got {}", json_type_name(value)),
        ));
    }
    obj
}

fn required_string(obj: &Map<String, Value>, key: &str, path: &str, errors: &mut Vec<SpecError>) {
    match obj.get(key) {
        None => errors.push(SpecError::new(path, format!("missing required field: {key}"))),
        Some(v) if !v.is_string() => errors.push(SpecError::new(
            &format!("{path}.{key}"),
            format!("expected string, got {}", json_type_name(v)),
        )),
        Some(_) => {}
    }
}

fn optional_string(obj: &Map<String, Value>, key: &str, path: &str, errors: &mut Vec<SpecError>) {
    if let Some(v) = obj.get(key) {
        if !v.is_string() {
            errors.push(SpecError::new(
                &format!("{path}.{key}"),
                format!("expected string, got {}", json_type_name(v)),
            ));
        }
    }
}

/// Returns the map under `key` if present and an object; records an error if
/// present with any other type.
fn optional_record<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    path: &str,
    errors: &mut Vec<SpecError>,
) -> Option<&'a Map<String, Value>> {
    let value = obj.get(key)?;
    expect_object(value, &format!("{path}.{key}"), errors)
}

/// Returns the JSON type name for a value.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "integer"
            } else {
                "number"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> Value {
        json!({"version": "1.0", "info": {"name": "x"}})
    }

    fn with(key: &str, value: Value) -> Value {
        let mut doc = minimal();
        doc[key] = value;
        doc
    }

    #[test]
    fn test_minimal_document_accepted() {
        assert!(validate_spec(&minimal()));
    }

    #[test]
    fn test_untyped_schema_rejected() {
        assert!(!validate_spec(&with("schemas", json!({"Foo": {"description": "d"}}))));
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(!validate_spec(&json!(null)));
        assert!(!validate_spec(&json!("spec")));
        assert!(!validate_spec(&json!([minimal()])));
    }

    #[test]
    fn test_required_fields() {
        assert!(!validate_spec(&json!({"info": {"name": "x"}})));
        assert!(!validate_spec(&json!({"version": "1.0"})));
        assert!(!validate_spec(&json!({"version": "1.0", "info": {}})));
        assert!(!validate_spec(&json!({"version": 1, "info": {"name": "x"}})));
        assert!(!validate_spec(&json!({"version": "1.0", "info": {"name": 5}})));
    }

    #[test]
    fn test_null_is_not_absent() {
        assert!(!validate_spec(&with("basePath", json!(null))));
        assert!(!validate_spec(&with("schemas", json!(null))));
        assert!(!validate_spec(&with(
            "schemas",
            json!({"Foo": {"type": "string", "optional": null}})
        )));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let doc = with("x-extension", json!({"anything": [1, 2]}));
        assert!(validate_spec(&doc));
        assert!(validate_spec(&with(
            "schemas",
            json!({"Foo": {"type": "string", "pattern": "^a"}})
        )));
    }

    #[test]
    fn test_ref_or_type_must_be_non_empty() {
        assert!(validate_spec(&with("schemas", json!({"A": {"$ref": "#/schemas/B"}}))));
        assert!(!validate_spec(&with("schemas", json!({"A": {"type": ""}}))));
        assert!(!validate_spec(&with("schemas", json!({"A": {"$ref": ""}}))));
        assert!(validate_spec(&with("schemas", json!({"A": {"$ref": "", "type": "string"}}))));
    }

    #[test]
    fn test_nested_property_invalidates_document() {
        let doc = with(
            "schemas",
            json!({
                "User": {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string"},
                        "address": {
                            "type": "object",
                            "properties": {"street": {"description": "no type"}}
                        }
                    }
                }
            }),
        );
        let errors = validate_spec_detailed(&doc).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].path,
            "root.schemas.User.properties.address.properties.street"
        );
    }

    #[test]
    fn test_array_items_descended() {
        let bad = with(
            "schemas",
            json!({"List": {"type": "array", "items": {"type": "array", "items": {}}}}),
        );
        let errors = validate_spec_detailed(&bad).unwrap_err();
        assert_eq!(errors[0].path, "root.schemas.List.items.items");
    }

    #[test]
    fn test_method_sections_validated() {
        for section in ["methods", "events", "notifications"] {
            let good = with(
                section,
                json!({"m": {"description": "d", "params": {"type": "object"}, "result": {"$ref": "R"}, "errors": ["E"]}}),
            );
            assert!(validate_spec(&good), "{section} should accept a valid entry");

            let bad = with(section, json!({"m": {"result": {"example": 1}}}));
            let errors = validate_spec_detailed(&bad).unwrap_err();
            assert_eq!(errors[0].path, format!("root.{section}.m.result"));
        }
    }

    #[test]
    fn test_method_errors_must_be_strings() {
        let bad = with("methods", json!({"m": {"errors": ["ok", 3]}}));
        let errors = validate_spec_detailed(&bad).unwrap_err();
        assert_eq!(errors[0].path, "root.methods.m.errors[1]");

        assert!(!validate_spec(&with("methods", json!({"m": {"errors": "E"}}))));
    }

    #[test]
    fn test_field_types_in_nodes() {
        assert!(!validate_spec(&with("schemas", json!({"A": {"type": "string", "enum": "a"}}))));
        assert!(!validate_spec(&with("schemas", json!({"A": {"type": "object", "properties": []}}))));
        assert!(!validate_spec(&with("schemas", json!({"A": {"type": "string", "format": 1}}))));
        assert!(validate_spec(&with(
            "schemas",
            json!({"A": {"type": "string", "enum": ["a", null, 1], "example": null, "optional": true}})
        )));
    }

    #[test]
    fn test_errors_catalogue_is_free_form() {
        assert!(validate_spec(&with("errors", json!({"E": 1, "F": {"code": -1}, "G": null}))));
        assert!(!validate_spec(&with("errors", json!(["E"]))));
    }

    #[test]
    fn test_multiple_errors_reported() {
        let doc = json!({
            "info": {"name": "x"},
            "schemas": {"A": {}, "B": {"type": 3}}
        });
        let errors = validate_spec_detailed(&doc).unwrap_err();
        // missing version, A untyped, B.type not a string, B untyped
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_validate_schema_node_alone() {
        assert!(validate_schema_node(&json!({"type": "string"})).is_ok());
        assert!(validate_schema_node(&json!({"items": {"type": "string"}})).is_err());
    }

    #[test]
    fn test_spec_error_display() {
        let err = SpecError::new("root.schemas.Foo", "must have either $ref or type");
        assert_eq!(err.to_string(), "root.schemas.Foo: must have either $ref or type");
    }
}
