//! Converts a decoded input document into projected intermediate features.

use super::feature::{VtFeature, VtFeatureKind, VtGeometry, VtSlice};
use super::options::TileOptions;
use super::projector::{Projection, projector_from_options};
use crate::geo::{GeoProperties, GeoValue};
use anyhow::{Context, Result};
use microtiles_core::{GeoBBox, TilesetError};
use serde_json::{Map, Value};

/// Converts a `FeatureCollection`, a single `Feature` or a bare geometry
/// into intermediate features, using the projector configured in `options`.
pub fn convert(data: &Value, options: &TileOptions) -> Result<Vec<VtFeature>> {
	let projector = projector_from_options(options)?;
	convert_with_projector(data, options, projector.as_ref())
}

/// Like [`convert`], but with a caller-supplied projection.
pub fn convert_with_projector(
	data: &Value,
	options: &TileOptions,
	projector: &dyn Projection,
) -> Result<Vec<VtFeature>> {
	log::debug!("converting input document");
	let mut features = Vec::new();

	match data.get("type").and_then(Value::as_str) {
		Some("FeatureCollection") => {
			let collection = data
				.get("features")
				.and_then(Value::as_array)
				.ok_or_else(|| TilesetError::InvalidInput("FeatureCollection without a 'features' array".to_string()))?;
			for (index, feature) in collection.iter().enumerate() {
				convert_feature(&mut features, feature, options, Some(index), projector)?;
			}
		}
		Some("Feature") => convert_feature(&mut features, data, options, None, projector)?,
		_ => {
			// a bare geometry or geometry collection
			convert_geometry(&mut features, None, data, &GeoProperties::new(), options, projector)?;
		}
	}

	Ok(features)
}

/// Extended ("MicroJSON") feature keys that ride along as tags.
const EXTENDED_FEATURE_KEYS: [&str; 4] = ["ref", "parentId", "featureClass", "multiscale"];

fn convert_feature(
	features: &mut Vec<VtFeature>,
	feature: &Value,
	options: &TileOptions,
	index: Option<usize>,
	projector: &dyn Projection,
) -> Result<()> {
	let Some(geometry) = feature.get("geometry") else {
		return Ok(());
	};
	if geometry.is_null() {
		return Ok(());
	}

	let properties = feature.get("properties").and_then(Value::as_object);
	let id = resolve_id(feature, properties, options, index);

	let mut tags = parse_tags(properties);
	for key in EXTENDED_FEATURE_KEYS {
		if let Some(value) = feature.get(key) {
			tags.insert(key.to_string(), GeoValue::from_json(value));
		}
	}

	convert_geometry(features, id, geometry, &tags, options, projector)
}

/// Feature id policy: a promoted property wins, then generated input-order
/// ids, then the feature's own id.
fn resolve_id(
	feature: &Value,
	properties: Option<&Map<String, Value>>,
	options: &TileOptions,
	index: Option<usize>,
) -> Option<GeoValue> {
	if let Some(name) = &options.promote_id {
		if let Some(value) = properties.and_then(|p| p.get(name)) {
			return Some(GeoValue::from_json(value));
		}
	} else if options.generate_id {
		return Some(GeoValue::from(index.unwrap_or(0)));
	}
	feature.get("id").map(GeoValue::from_json).filter(|v| *v != GeoValue::Null)
}

fn convert_geometry(
	features: &mut Vec<VtFeature>,
	id: Option<GeoValue>,
	geometry: &Value,
	tags: &GeoProperties,
	options: &TileOptions,
	projector: &dyn Projection,
) -> Result<()> {
	let kind_tag = geometry
		.get("type")
		.and_then(Value::as_str)
		.ok_or_else(|| TilesetError::InvalidInput("geometry without a 'type' tag".to_string()))?;

	if kind_tag == "GeometryCollection" {
		let inner = geometry
			.get("geometries")
			.and_then(Value::as_array)
			.ok_or_else(|| TilesetError::InvalidInput("GeometryCollection without a 'geometries' array".to_string()))?;
		// inner features inherit the properties and a stringified parent id
		let parent_id = id.map(|v| GeoValue::String(v.to_string()));
		for single in inner {
			convert_geometry(features, parent_id.clone(), single, tags, options, projector)?;
		}
		return Ok(());
	}

	let coords = geometry.get("coordinates").and_then(Value::as_array);
	let Some(coords) = coords else {
		return Ok(());
	};
	if coords.is_empty() {
		return Ok(());
	}

	let (kind, converted) = match kind_tag {
		"Point" => {
			let mut slice = VtSlice::default();
			convert_point(coords, &mut slice, projector)?;
			(VtFeatureKind::Point, VtGeometry::Points(slice))
		}
		"MultiPoint" => {
			let mut slice = VtSlice::default();
			for point in coords {
				convert_point(point_array(point)?, &mut slice, projector)?;
			}
			(VtFeatureKind::MultiPoint, VtGeometry::Points(slice))
		}
		"LineString" => (
			VtFeatureKind::LineString,
			VtGeometry::Lines(vec![convert_line(coords, false, projector)?]),
		),
		"MultiLineString" => {
			if options.line_metrics {
				// explode into single lines so that clip fractions can be
				// tracked per line
				for line in coords {
					let slice = convert_line(line_array(line)?, false, projector)?;
					push_feature(
						features,
						id.clone(),
						VtFeatureKind::LineString,
						VtGeometry::Lines(vec![slice]),
						tags.clone(),
					);
				}
				return Ok(());
			}
			(
				VtFeatureKind::MultiLineString,
				VtGeometry::Lines(convert_lines(coords, false, projector)?),
			)
		}
		"Polygon" => (
			VtFeatureKind::Polygon,
			VtGeometry::Lines(convert_lines(coords, true, projector)?),
		),
		"MultiPolygon" => {
			let mut polygons = Vec::new();
			for polygon in coords {
				let rings = polygon
					.as_array()
					.ok_or_else(|| TilesetError::InvalidInput("MultiPolygon entry is not an array".to_string()))?;
				polygons.push(convert_lines(rings, true, projector)?);
			}
			(VtFeatureKind::MultiPolygon, VtGeometry::Polygons(polygons))
		}
		_ => {
			return Err(TilesetError::InvalidInput(format!("unknown geometry type '{kind_tag}'")).into());
		}
	};

	push_feature(features, id, kind, converted, tags.clone());
	Ok(())
}

fn push_feature(
	features: &mut Vec<VtFeature>,
	id: Option<GeoValue>,
	kind: VtFeatureKind,
	geometry: VtGeometry,
	tags: GeoProperties,
) {
	if geometry.is_empty() {
		return;
	}
	features.push(VtFeature::new(id, kind, geometry, tags));
}

fn point_array(value: &Value) -> Result<&Vec<Value>> {
	value
		.as_array()
		.ok_or_else(|| TilesetError::InvalidInput("coordinate is not an array".to_string()).into())
}

fn line_array(value: &Value) -> Result<&Vec<Value>> {
	value
		.as_array()
		.ok_or_else(|| TilesetError::InvalidInput("line is not an array".to_string()).into())
}

fn coord_component(point: &[Value], i: usize) -> Result<f64> {
	point
		.get(i)
		.and_then(Value::as_f64)
		.ok_or_else(|| TilesetError::InvalidInput("coordinate component is not a number".to_string()).into())
}

fn convert_point(point: &[Value], out: &mut VtSlice, projector: &dyn Projection) -> Result<()> {
	let x = projector.project_x(coord_component(point, 0)?);
	let y = projector.project_y(coord_component(point, 1)?);
	out.push_point(x, y, 0.0);
	Ok(())
}

/// Projects one line or ring, accumulating its length (lines) or absolute
/// area (rings) into the slice `size`.
fn convert_line(line: &[Value], is_polygon: bool, projector: &dyn Projection) -> Result<VtSlice> {
	let mut slice = VtSlice::default();
	let mut size = 0.0;
	let mut x0 = 0.0;
	let mut y0 = 0.0;

	for (j, point) in line.iter().enumerate() {
		let point = point_array(point).context("while reading a line coordinate")?;
		let x = projector.project_x(coord_component(point, 0)?);
		let y = projector.project_y(coord_component(point, 1)?);
		slice.push_point(x, y, 0.0);

		if j > 0 {
			if is_polygon {
				size += (x0 * y - x * y0) / 2.0;
			} else {
				size += ((x - x0).powi(2) + (y - y0).powi(2)).sqrt();
			}
		}
		x0 = x;
		y0 = y;
	}

	slice.size = size.abs();
	slice.start = 0.0;
	slice.end = slice.size;
	Ok(slice)
}

fn convert_lines(lines: &[Value], is_polygon: bool, projector: &dyn Projection) -> Result<Vec<VtSlice>> {
	lines
		.iter()
		.map(|line| convert_line(line_array(line)?, is_polygon, projector))
		.collect()
}

fn parse_tags(properties: Option<&Map<String, Value>>) -> GeoProperties {
	match properties {
		Some(map) => map
			.iter()
			.map(|(k, v)| (k.clone(), GeoValue::from_json(v)))
			.collect(),
		None => GeoProperties::new(),
	}
}

/// One pass over the polygonal coordinates of a document, returning the
/// enclosing `[min_x, min_y, max_x, max_y]` rectangle. Used to configure
/// the Cartesian projector and the TileJSON bounds.
#[must_use]
pub fn get_bounds(data: &Value) -> GeoBBox {
	let mut bounds = GeoBBox::new_empty();

	let mut include_ring = |ring: &Value| {
		for point in ring.as_array().into_iter().flatten() {
			if let Some(p) = point.as_array() {
				if let (Some(x), Some(y)) = (p.first().and_then(Value::as_f64), p.get(1).and_then(Value::as_f64)) {
					bounds.include_point(x, y);
				}
			}
		}
	};

	for feature in data.get("features").and_then(Value::as_array).into_iter().flatten() {
		let Some(geometry) = feature.get("geometry") else {
			continue;
		};
		let coords = geometry.get("coordinates");
		match (geometry.get("type").and_then(Value::as_str), coords) {
			(Some("Polygon"), Some(rings)) => {
				for ring in rings.as_array().into_iter().flatten() {
					include_ring(ring);
				}
			}
			(Some("MultiPolygon"), Some(polygons)) => {
				for polygon in polygons.as_array().into_iter().flatten() {
					for ring in polygon.as_array().into_iter().flatten() {
						include_ring(ring);
					}
				}
			}
			_ => {}
		}
	}

	bounds
}

#[cfg(test)]
mod tests {
	use super::*;
	use microtiles_core::GeoBBox;
	use serde_json::json;

	fn cartesian_options() -> TileOptions {
		TileOptions {
			bounds: Some(GeoBBox(0.0, 0.0, 1.0, 1.0)),
			..TileOptions::default()
		}
	}

	#[test]
	fn test_feature_collection() -> Result<()> {
		let data = json!({
			"type": "FeatureCollection",
			"features": [
				{
					"type": "Feature",
					"geometry": {"type": "Point", "coordinates": [0.25, 0.75]},
					"properties": {"Label": 7}
				},
				{
					"type": "Feature",
					"geometry": null,
					"properties": {}
				}
			]
		});
		let features = convert(&data, &cartesian_options())?;
		assert_eq!(features.len(), 1);
		assert_eq!(features[0].kind, VtFeatureKind::Point);
		assert_eq!(features[0].tags.get("Label"), Some(&GeoValue::UInt(7)));
		assert_eq!((features[0].min_x, features[0].max_y), (0.25, 0.75));
		Ok(())
	}

	#[test]
	fn test_polygon_ring_size_is_area() -> Result<()> {
		let data = json!({
			"type": "Feature",
			"geometry": {
				"type": "Polygon",
				"coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]
			},
			"properties": {}
		});
		let features = convert(&data, &cartesian_options())?;
		let VtGeometry::Lines(rings) = &features[0].geometry else {
			panic!("expected rings");
		};
		assert_eq!(rings[0].size, 1.0);
		Ok(())
	}

	#[test]
	fn test_line_size_is_length() -> Result<()> {
		let data = json!({
			"type": "Feature",
			"geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 0.0]]},
			"properties": {}
		});
		let features = convert(&data, &cartesian_options())?;
		let VtGeometry::Lines(lines) = &features[0].geometry else {
			panic!("expected lines");
		};
		assert_eq!((lines[0].size, lines[0].start, lines[0].end), (1.0, 0.0, 1.0));
		Ok(())
	}

	#[test]
	fn test_geometry_collection_is_flattened() -> Result<()> {
		let data = json!({
			"type": "Feature",
			"id": 9,
			"geometry": {
				"type": "GeometryCollection",
				"geometries": [
					{"type": "Point", "coordinates": [0.5, 0.5]},
					{"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]]}
				]
			},
			"properties": {"source": "collection"}
		});
		let features = convert(&data, &cartesian_options())?;
		assert_eq!(features.len(), 2);
		for feature in &features {
			assert_eq!(feature.id, Some(GeoValue::from("9")));
			assert_eq!(feature.tags.get("source"), Some(&GeoValue::from("collection")));
		}
		Ok(())
	}

	#[test]
	fn test_promote_id() -> Result<()> {
		let data = json!({
			"type": "FeatureCollection",
			"features": [
				{"type": "Feature", "geometry": {"type": "Point", "coordinates": [0.1, 0.1]}, "properties": {"gid": 7}},
				{"type": "Feature", "geometry": {"type": "Point", "coordinates": [0.9, 0.9]}, "properties": {"gid": 8}}
			]
		});
		let options = TileOptions {
			promote_id: Some("gid".to_string()),
			..cartesian_options()
		};
		let features = convert(&data, &options)?;
		assert_eq!(features[0].id, Some(GeoValue::UInt(7)));
		assert_eq!(features[1].id, Some(GeoValue::UInt(8)));
		Ok(())
	}

	#[test]
	fn test_generate_id() -> Result<()> {
		let data = json!({
			"type": "FeatureCollection",
			"features": [
				{"type": "Feature", "id": 77, "geometry": {"type": "Point", "coordinates": [0.1, 0.1]}, "properties": {}},
				{"type": "Feature", "geometry": {"type": "Point", "coordinates": [0.9, 0.9]}, "properties": {}}
			]
		});
		let options = TileOptions {
			generate_id: true,
			..cartesian_options()
		};
		let features = convert(&data, &options)?;
		assert_eq!(features[0].id, Some(GeoValue::UInt(0)));
		assert_eq!(features[1].id, Some(GeoValue::UInt(1)));
		Ok(())
	}

	#[test]
	fn test_multi_line_string_explodes_under_line_metrics() -> Result<()> {
		let data = json!({
			"type": "Feature",
			"geometry": {
				"type": "MultiLineString",
				"coordinates": [[[0.0, 0.0], [1.0, 0.0]], [[0.0, 1.0], [1.0, 1.0]]]
			},
			"properties": {}
		});
		let options = TileOptions {
			line_metrics: true,
			..cartesian_options()
		};
		let features = convert(&data, &options)?;
		assert_eq!(features.len(), 2);
		assert!(features.iter().all(|f| f.kind == VtFeatureKind::LineString));
		Ok(())
	}

	#[test]
	fn test_extended_feature_keys_become_tags() -> Result<()> {
		let data = json!({
			"type": "Feature",
			"geometry": {"type": "Point", "coordinates": [0.5, 0.5]},
			"properties": {"Label": 3},
			"featureClass": "cell",
			"parentId": "img-1",
			"multiscale": {"axes": [{"name": "x"}]}
		});
		let features = convert(&data, &cartesian_options())?;
		let tags = &features[0].tags;
		assert_eq!(tags.get("featureClass"), Some(&GeoValue::from("cell")));
		assert_eq!(tags.get("parentId"), Some(&GeoValue::from("img-1")));
		// non-scalar extensions ride along as their JSON text
		assert_eq!(
			tags.get("multiscale"),
			Some(&GeoValue::from(r#"{"axes":[{"name":"x"}]}"#))
		);
		assert_eq!(tags.get("Label"), Some(&GeoValue::UInt(3)));
		Ok(())
	}

	#[test]
	fn test_unknown_geometry_tag() {
		let data = json!({
			"type": "Feature",
			"geometry": {"type": "Circle", "coordinates": [0.0, 0.0]},
			"properties": {}
		});
		let error = convert(&data, &cartesian_options()).unwrap_err();
		assert!(matches!(
			error.downcast_ref::<TilesetError>(),
			Some(TilesetError::InvalidInput(_))
		));
	}

	#[test]
	fn test_get_bounds() {
		let data = json!({
			"type": "FeatureCollection",
			"features": [
				{"type": "Feature", "geometry": {"type": "Polygon", "coordinates": [[[1.0, 2.0], [5.0, 2.0], [5.0, 9.0], [1.0, 2.0]]]}, "properties": {}},
				{"type": "Feature", "geometry": {"type": "MultiPolygon", "coordinates": [[[[0.0, 4.0], [7.0, 4.0], [7.0, 6.0], [0.0, 4.0]]]]}, "properties": {}}
			]
		});
		assert_eq!(get_bounds(&data).as_vec(), vec![0.0, 2.0, 7.0, 9.0]);
	}
}
