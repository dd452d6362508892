//! Accumulates clipped features into a tile record.

use super::feature::{VtFeature, VtFeatureKind, VtGeometry, VtSlice};
use super::options::TileOptions;
use super::simplify::simplify;
use crate::geo::{GeoProperties, GeoValue};
use microtiles_core::{TileCoord, TilesetError};
use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;
use std::rc::Rc;

/// The wire-format geometry class of a tile feature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileFeatureKind {
	Point = 1,
	Line = 2,
	Polygon = 3,
}

impl Serialize for TileFeatureKind {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_u8(*self as u8)
	}
}

/// One ring (or sub-line) of a tile feature. `outer` marks the outer
/// boundary of a polygon; orientation is enforced only at encode time.
#[derive(Clone, Debug, PartialEq)]
pub struct TileRing {
	pub points: Vec<[f64; 2]>,
	pub outer: bool,
}

/// Tile feature geometry. Coordinates are unit-square floats until the tile
/// is transformed, integer-valued floats afterwards; the JSON form always
/// rounds to integers.
#[derive(Clone, Debug, PartialEq)]
pub enum TileGeometry {
	Points(Vec<[f64; 2]>),
	Rings(Vec<TileRing>),
}

fn serialize_rounded<S: Serializer>(points: &[[f64; 2]], serializer: S) -> Result<S::Ok, S::Error> {
	let mut seq = serializer.serialize_seq(Some(points.len()))?;
	for p in points {
		seq.serialize_element(&[p[0].round() as i64, p[1].round() as i64])?;
	}
	seq.end()
}

impl Serialize for TileGeometry {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			TileGeometry::Points(points) => serialize_rounded(points, serializer),
			TileGeometry::Rings(rings) => {
				let mut seq = serializer.serialize_seq(Some(rings.len()))?;
				for ring in rings {
					seq.serialize_element(&RoundedRing(&ring.points))?;
				}
				seq.end()
			}
		}
	}
}

struct RoundedRing<'a>(&'a [[f64; 2]]);

impl Serialize for RoundedRing<'_> {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serialize_rounded(self.0, serializer)
	}
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TileFeature {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub id: Option<GeoValue>,
	#[serde(rename = "type")]
	pub kind: TileFeatureKind,
	pub geometry: TileGeometry,
	pub tags: GeoProperties,
}

/// A tile record: the accumulated features of one `(z, x, y)` cell plus the
/// counters and the retained `source` features used for drill-down.
#[derive(Clone, Debug, Serialize)]
pub struct Tile {
	pub z: u8,
	pub x: u32,
	pub y: u32,
	pub features: Vec<TileFeature>,
	#[serde(rename = "numPoints")]
	pub num_points: u64,
	#[serde(rename = "numSimplified")]
	pub num_simplified: u64,
	#[serde(rename = "numFeatures")]
	pub num_features: u64,
	pub transformed: bool,
	#[serde(rename = "minX")]
	pub min_x: f64,
	#[serde(rename = "minY")]
	pub min_y: f64,
	#[serde(rename = "maxX")]
	pub max_x: f64,
	#[serde(rename = "maxY")]
	pub max_y: f64,
	/// Untransformed parent features for later drill-down; cleared once the
	/// tile is split further.
	#[serde(skip)]
	pub source: Option<Vec<Rc<VtFeature>>>,
}

impl Tile {
	/// Builds the tile for `coord` from the zoom-matched simplified
	/// geometries of `features`.
	#[must_use]
	pub fn new(features: &[Rc<VtFeature>], coord: TileCoord, options: &TileOptions) -> Tile {
		let sq_tolerance = if coord.z == options.max_zoom {
			0.0
		} else {
			options.tolerance_curve.squared_tolerance(coord.z, options)
		};

		let mut tile = Tile {
			z: coord.z,
			x: coord.x,
			y: coord.y,
			features: Vec::new(),
			num_points: 0,
			num_simplified: 0,
			num_features: features.len() as u64,
			transformed: false,
			min_x: 2.0,
			min_y: 1.0,
			max_x: -1.0,
			max_y: 0.0,
			source: None,
		};
		for feature in features {
			add_feature(&mut tile, feature, sq_tolerance, options);
		}
		tile
	}
}

fn add_feature(tile: &mut Tile, feature: &VtFeature, sq_tolerance: f64, options: &TileOptions) {
	tile.min_x = tile.min_x.min(feature.min_x);
	tile.min_y = tile.min_y.min(feature.min_y);
	tile.max_x = tile.max_x.max(feature.max_x);
	tile.max_y = tile.max_y.max(feature.max_y);

	let geometry = feature.geometry_at(tile.z);
	let is_polygon = feature.kind.is_polygon();

	let simplified = match geometry {
		VtGeometry::Points(slice) => {
			let points: Vec<[f64; 2]> = slice.pairs();
			tile.num_points += points.len() as u64;
			tile.num_simplified += points.len() as u64;
			if points.is_empty() {
				return;
			}
			TileGeometry::Points(points)
		}

		VtGeometry::Lines(slices) => {
			let mut rings = Vec::new();
			let mut outer_dropped = false;
			for (i, slice) in slices.iter().enumerate() {
				let is_outer = i == 0;
				if is_polygon && outer_dropped {
					break;
				}
				match add_line(tile, slice, sq_tolerance, is_polygon) {
					Some(points) => rings.push(TileRing { points, outer: is_outer }),
					None if is_polygon && is_outer => outer_dropped = true,
					None => {}
				}
			}
			if rings.is_empty() {
				return;
			}
			TileGeometry::Rings(rings)
		}

		VtGeometry::Polygons(polygons) => {
			let mut rings = Vec::new();
			for polygon in polygons {
				for (i, slice) in polygon.iter().enumerate() {
					let is_outer = i == 0;
					match add_line(tile, slice, sq_tolerance, true) {
						Some(points) => rings.push(TileRing { points, outer: is_outer }),
						// a collapsed outer ring drops the whole polygon
						None if is_outer => break,
						None => {}
					}
				}
			}
			if rings.is_empty() {
				return;
			}
			TileGeometry::Rings(rings)
		}
	};

	let mut tags = feature.tags.clone();
	if feature.kind == VtFeatureKind::LineString && options.line_metrics {
		if let VtGeometry::Lines(slices) = geometry {
			if let Some(slice) = slices.first() {
				if slice.size > 0.0 {
					tags.insert("mapbox_clip_start".to_string(), GeoValue::from(slice.start / slice.size));
					tags.insert("mapbox_clip_end".to_string(), GeoValue::from(slice.end / slice.size));
				}
			}
		}
	}

	let kind = match feature.kind.tile_type() {
		1 => TileFeatureKind::Point,
		2 => TileFeatureKind::Line,
		_ => TileFeatureKind::Polygon,
	};

	tile.features.push(TileFeature {
		id: feature.id.clone(),
		kind,
		geometry: simplified,
		tags,
	});
}

/// Simplifies one line or ring into tile-ready coordinate pairs. Returns
/// `None` for polygon rings that degenerate below four vertices.
fn add_line(tile: &mut Tile, slice: &VtSlice, sq_tolerance: f64, is_polygon: bool) -> Option<Vec<[f64; 2]>> {
	let coords = slice.pairs();
	tile.num_points += coords.len() as u64;
	if coords.is_empty() {
		return None;
	}

	let simplified = if sq_tolerance > 0.0 {
		simplify(&coords, sq_tolerance, if is_polygon { 3 } else { 0 })
	} else {
		coords
	};

	if is_polygon && simplified.len() < 4 {
		log::debug!(
			"{}",
			TilesetError::GeometryDegenerate(format!("ring collapsed by simplification at z{}", tile.z))
		);
		return None;
	}

	tile.num_simplified += simplified.len() as u64;
	Some(simplified)
}
