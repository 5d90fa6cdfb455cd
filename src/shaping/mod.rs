//! Data shaping: projecting a requested subset of a resource's fields.
//!
//! The canonical field set of each resource type is declared once as a
//! `FieldSchema` (ordered list of wire field names), so requested field
//! lists can be validated per request rather than per instance.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ShapeError {
    #[error("The provided data shaping field isn't valid: '{0}'")]
    UnknownShapeField(String),
}

/// Ordered field descriptor for one resource type, built once and reused.
/// Names are the exact wire (camelCase) keys of the serialized DTO.
#[derive(Debug)]
pub struct FieldSchema {
    fields: &'static [&'static str],
}

impl FieldSchema {
    pub const fn new(fields: &'static [&'static str]) -> Self {
        Self { fields }
    }

    /// All canonical field names in declaration order.
    pub fn names(&self) -> &'static [&'static str] {
        self.fields
    }

    /// Case-insensitive resolution of a requested name to its canonical form.
    pub fn resolve(&self, requested: &str) -> Option<&'static str> {
        self.fields
            .iter()
            .find(|name| name.eq_ignore_ascii_case(requested))
            .copied()
    }
}

/// A resource type that can be shaped.
pub trait Shapeable: Serialize {
    fn schema() -> &'static FieldSchema;
}

/// Field-name → value projection, preserving request (or declaration) order.
pub type ShapedResource = Map<String, Value>;

/// Validate a raw `fields` parameter against a schema.
///
/// Returns the canonical names to project, in requested order. Empty or
/// absent input selects all fields in declaration order. Duplicate requests
/// for the same field collapse to the first occurrence; an unknown name
/// fails with `UnknownShapeField` before any resource is touched.
pub fn select_fields(
    schema: &'static FieldSchema,
    fields: Option<&str>,
) -> Result<Vec<&'static str>, ShapeError> {
    let raw = fields.unwrap_or("");
    if raw.trim().is_empty() {
        return Ok(schema.names().to_vec());
    }

    let mut selected: Vec<&'static str> = Vec::new();
    for token in raw.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let canonical = schema
            .resolve(token)
            .ok_or_else(|| ShapeError::UnknownShapeField(token.to_string()))?;
        if !selected.contains(&canonical) {
            selected.push(canonical);
        }
    }

    if selected.is_empty() {
        return Ok(schema.names().to_vec());
    }
    Ok(selected)
}

/// Project one resource down to the already-validated field selection.
fn project<T: Shapeable>(resource: &T, selected: &[&'static str]) -> ShapedResource {
    // DTOs serialize every declared field (None as null), so the canonical
    // map always contains each schema name.
    let canonical = match serde_json::to_value(resource) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };

    let mut shaped = Map::new();
    for name in selected {
        if let Some(value) = canonical.get(*name) {
            shaped.insert((*name).to_string(), value.clone());
        }
    }
    shaped
}

/// Shape a single resource with an optional raw field list.
pub fn shape_resource<T: Shapeable>(
    resource: &T,
    fields: Option<&str>,
) -> Result<ShapedResource, ShapeError> {
    let selected = select_fields(T::schema(), fields)?;
    Ok(project(resource, &selected))
}

/// Shape a collection, validating the field list once for the whole batch.
/// Output order matches input order.
pub fn shape_collection<T: Shapeable>(
    resources: &[T],
    fields: Option<&str>,
) -> Result<Vec<ShapedResource>, ShapeError> {
    let selected = select_fields(T::schema(), fields)?;
    Ok(resources.iter().map(|r| project(r, &selected)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Sample {
        id: &'static str,
        name: &'static str,
        status: &'static str,
        description: Option<&'static str>,
    }

    static SAMPLE_SCHEMA: FieldSchema =
        FieldSchema::new(&["id", "name", "status", "description"]);

    impl Shapeable for Sample {
        fn schema() -> &'static FieldSchema {
            &SAMPLE_SCHEMA
        }
    }

    fn sample() -> Sample {
        Sample { id: "h_1", name: "Read", status: "ongoing", description: None }
    }

    #[test]
    fn empty_field_list_returns_all_fields_in_declaration_order() {
        let shaped = shape_resource(&sample(), None).unwrap();
        let keys: Vec<&str> = shaped.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "name", "status", "description"]);
        assert_eq!(shaped["description"], Value::Null);

        let shaped = shape_resource(&sample(), Some("  ")).unwrap();
        assert_eq!(shaped.len(), 4);
    }

    #[test]
    fn requested_order_is_preserved() {
        let shaped = shape_resource(&sample(), Some("status,name")).unwrap();
        let keys: Vec<&str> = shaped.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["status", "name"]);
    }

    #[test]
    fn lookup_is_case_insensitive_and_emits_canonical_names() {
        let shaped = shape_resource(&sample(), Some("NAME,Status")).unwrap();
        let keys: Vec<&str> = shaped.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["name", "status"]);
    }

    #[test]
    fn duplicate_fields_are_emitted_once() {
        let shaped = shape_resource(&sample(), Some("name,name,name")).unwrap();
        assert_eq!(shaped.len(), 1);
    }

    #[test]
    fn unknown_field_fails_naming_the_field() {
        let err = shape_resource(&sample(), Some("name,bogus")).unwrap_err();
        assert_eq!(err, ShapeError::UnknownShapeField("bogus".to_string()));
    }

    #[test]
    fn shaping_is_idempotent_for_a_fixed_field_list() {
        let first = shape_resource(&sample(), Some("name,status")).unwrap();
        let second = shape_resource(&sample(), Some("name,status")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn collection_validates_once_and_preserves_input_order() {
        let items = vec![
            Sample { id: "h_1", name: "b", status: "ongoing", description: None },
            Sample { id: "h_2", name: "a", status: "completed", description: None },
        ];
        let shaped = shape_collection(&items, Some("id")).unwrap();
        assert_eq!(shaped.len(), 2);
        assert_eq!(shaped[0]["id"], "h_1");
        assert_eq!(shaped[1]["id"], "h_2");

        let err = shape_collection(&items, Some("nope")).unwrap_err();
        assert_eq!(err, ShapeError::UnknownShapeField("nope".to_string()));
    }
}
