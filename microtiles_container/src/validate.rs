//! Structural validation of input documents.
//!
//! This is not a full JSON-schema pass: it checks the structure the
//! converter relies on (known type tags, coordinate arrays, object-shaped
//! properties) and reports every finding, so a caller can reject a document
//! before any tile is built.

use microtiles_core::TilesetError;
use serde_json::Value;

const GEOMETRY_TYPES: [&str; 7] = [
	"Point",
	"MultiPoint",
	"LineString",
	"MultiLineString",
	"Polygon",
	"MultiPolygon",
	"GeometryCollection",
];

/// Collects all structural errors of a document. An empty result means the
/// document is safe to convert.
#[must_use]
pub fn validate_document(document: &Value) -> Vec<TilesetError> {
	let mut errors = Vec::new();

	match document.get("type").and_then(Value::as_str) {
		Some("FeatureCollection") => match document.get("features").and_then(Value::as_array) {
			Some(features) => {
				for (index, feature) in features.iter().enumerate() {
					validate_feature(feature, &format!("features[{index}]"), &mut errors);
				}
			}
			None => errors.push(invalid("FeatureCollection without a 'features' array")),
		},
		Some("Feature") => validate_feature(document, "root feature", &mut errors),
		Some(tag) if GEOMETRY_TYPES.contains(&tag) => validate_geometry(document, "root geometry", &mut errors),
		Some(tag) => errors.push(invalid(&format!("unknown root type '{tag}'"))),
		None => errors.push(invalid("document without a 'type' tag")),
	}

	errors
}

fn validate_feature(feature: &Value, context: &str, errors: &mut Vec<TilesetError>) {
	match feature.get("type").and_then(Value::as_str) {
		Some("Feature") => {}
		Some(tag) => errors.push(invalid(&format!("{context}: type is '{tag}', expected 'Feature'"))),
		None => errors.push(invalid(&format!("{context}: missing 'type'"))),
	}

	if let Some(properties) = feature.get("properties") {
		if !properties.is_object() && !properties.is_null() {
			errors.push(invalid(&format!("{context}: 'properties' is not an object")));
		}
	}

	if let Some(id) = feature.get("id") {
		if !id.is_string() && !id.is_number() {
			errors.push(invalid(&format!("{context}: 'id' must be a string or an integer")));
		}
	}

	match feature.get("geometry") {
		None => errors.push(invalid(&format!("{context}: missing 'geometry'"))),
		Some(Value::Null) => {}
		Some(geometry) => validate_geometry(geometry, context, errors),
	}
}

fn validate_geometry(geometry: &Value, context: &str, errors: &mut Vec<TilesetError>) {
	let Some(tag) = geometry.get("type").and_then(Value::as_str) else {
		errors.push(invalid(&format!("{context}: geometry without a 'type' tag")));
		return;
	};

	if !GEOMETRY_TYPES.contains(&tag) {
		errors.push(invalid(&format!("{context}: unknown geometry type '{tag}'")));
		return;
	}

	if tag == "GeometryCollection" {
		match geometry.get("geometries").and_then(Value::as_array) {
			Some(geometries) => {
				for (index, inner) in geometries.iter().enumerate() {
					validate_geometry(inner, &format!("{context}.geometries[{index}]"), errors);
				}
			}
			None => errors.push(invalid(&format!("{context}: GeometryCollection without a 'geometries' array"))),
		}
		return;
	}

	if geometry.get("coordinates").and_then(Value::as_array).is_none() {
		errors.push(invalid(&format!("{context}: geometry '{tag}' without a 'coordinates' array")));
	}
}

fn invalid(message: &str) -> TilesetError {
	TilesetError::InvalidInput(message.to_string())
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_valid_collection() {
		let data = json!({
			"type": "FeatureCollection",
			"features": [
				{"type": "Feature", "geometry": {"type": "Point", "coordinates": [1.0, 2.0]}, "properties": {"a": 1}},
				{"type": "Feature", "geometry": null, "properties": null}
			]
		});
		assert!(validate_document(&data).is_empty());
	}

	#[test]
	fn test_all_errors_are_reported() {
		let data = json!({
			"type": "FeatureCollection",
			"features": [
				{"type": "Feature", "geometry": {"type": "Circle", "coordinates": []}, "properties": {}},
				{"type": "Feature", "geometry": {"type": "Point"}, "properties": 7},
				{"geometry": null}
			]
		});
		let errors = validate_document(&data);
		assert_eq!(errors.len(), 4);
		assert!(errors.iter().all(|e| matches!(e, TilesetError::InvalidInput(_))));
	}

	#[test]
	fn test_bare_geometry_root() {
		let data = json!({"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]]});
		assert!(validate_document(&data).is_empty());
	}

	#[test]
	fn test_geometry_collection() {
		let data = json!({
			"type": "GeometryCollection",
			"geometries": [
				{"type": "Point", "coordinates": [0.0, 0.0]},
				{"type": "Square", "coordinates": []}
			]
		});
		let errors = validate_document(&data);
		assert_eq!(errors.len(), 1);
	}

	#[test]
	fn test_unknown_root() {
		assert_eq!(validate_document(&json!({"type": "Tileset"})).len(), 1);
		assert_eq!(validate_document(&json!({})).len(), 1);
	}
}
