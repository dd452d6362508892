//! The projected intermediate representation shared by the converter, the
//! clipper and the tile builder.

use super::options::TileOptions;
use super::simplify::simplify;
use crate::geo::{GeoProperties, GeoValue};

/// A flat buffer of projected `(x, y, 0)` coordinate triples.
///
/// `size` is the length of a line or the absolute ring area; `start` and
/// `end` are the distances along the original line covered by this slice,
/// updated by the clipper when line metrics are enabled.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VtSlice {
	pub coords: Vec<f64>,
	pub size: f64,
	pub start: f64,
	pub end: f64,
}

impl VtSlice {
	pub fn push_point(&mut self, x: f64, y: f64, z: f64) {
		self.coords.push(x);
		self.coords.push(y);
		self.coords.push(z);
	}

	/// Number of coordinate triples.
	#[must_use]
	pub fn len_points(&self) -> usize {
		self.coords.len() / 3
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.coords.is_empty()
	}

	/// An empty slice inheriting `size`, `start` and `end`.
	#[must_use]
	pub fn derived(&self) -> VtSlice {
		VtSlice {
			coords: Vec::new(),
			size: self.size,
			start: self.start,
			end: self.end,
		}
	}

	/// The coordinate pairs without the reserved z slot.
	#[must_use]
	pub fn pairs(&self) -> Vec<[f64; 2]> {
		self.coords.chunks_exact(3).map(|c| [c[0], c[1]]).collect()
	}

	/// Replaces the coordinates with the given pairs, zeroing the z slot.
	pub fn set_pairs(&mut self, pairs: &[[f64; 2]]) {
		self.coords.clear();
		for p in pairs {
			self.push_point(p[0], p[1], 0.0);
		}
	}
}

impl From<Vec<[f64; 2]>> for VtSlice {
	fn from(pairs: Vec<[f64; 2]>) -> Self {
		let mut slice = VtSlice::default();
		slice.set_pairs(&pairs);
		slice
	}
}

/// Projected geometry of an intermediate feature. The nesting mirrors the
/// feature kind: points are one flat slice, lines and polygon rings a list
/// of slices, multi-polygons a list of ring lists.
#[derive(Clone, Debug, PartialEq)]
pub enum VtGeometry {
	Points(VtSlice),
	Lines(Vec<VtSlice>),
	Polygons(Vec<Vec<VtSlice>>),
}

impl VtGeometry {
	#[must_use]
	pub fn is_empty(&self) -> bool {
		match self {
			VtGeometry::Points(slice) => slice.is_empty(),
			VtGeometry::Lines(lines) => lines.iter().all(VtSlice::is_empty),
			VtGeometry::Polygons(polygons) => polygons.iter().all(|rings| rings.iter().all(VtSlice::is_empty)),
		}
	}

	/// Visits every coordinate pair.
	pub fn for_each_point<F: FnMut(f64, f64)>(&self, mut visit: F) {
		let mut visit_slice = |slice: &VtSlice| {
			for c in slice.coords.chunks_exact(3) {
				visit(c[0], c[1]);
			}
		};
		match self {
			VtGeometry::Points(slice) => visit_slice(slice),
			VtGeometry::Lines(lines) => lines.iter().for_each(&mut visit_slice),
			VtGeometry::Polygons(polygons) => {
				for rings in polygons {
					rings.iter().for_each(&mut visit_slice);
				}
			}
		}
	}
}

/// The geometry kind of an intermediate feature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VtFeatureKind {
	Point,
	MultiPoint,
	LineString,
	MultiLineString,
	Polygon,
	MultiPolygon,
}

impl VtFeatureKind {
	/// The wire-format geometry class: 1 = point, 2 = line, 3 = polygon.
	#[must_use]
	pub fn tile_type(&self) -> u8 {
		match self {
			VtFeatureKind::Point | VtFeatureKind::MultiPoint => 1,
			VtFeatureKind::LineString | VtFeatureKind::MultiLineString => 2,
			VtFeatureKind::Polygon | VtFeatureKind::MultiPolygon => 3,
		}
	}

	#[must_use]
	pub fn is_polygon(&self) -> bool {
		matches!(self, VtFeatureKind::Polygon | VtFeatureKind::MultiPolygon)
	}
}

/// An intermediate feature: projected geometry, its bounding box, the
/// property bag, and the eagerly simplified per-zoom geometry copies.
#[derive(Clone, Debug)]
pub struct VtFeature {
	pub id: Option<GeoValue>,
	pub kind: VtFeatureKind,
	pub geometry: VtGeometry,
	pub tags: GeoProperties,
	pub min_x: f64,
	pub min_y: f64,
	pub max_x: f64,
	pub max_y: f64,
	/// Simplified copy per zoom level, indexed by `z`. Empty for features
	/// created by the clipper, which fall back to `geometry`.
	pub zoom_geometries: Vec<VtGeometry>,
}

impl VtFeature {
	#[must_use]
	pub fn new(id: Option<GeoValue>, kind: VtFeatureKind, geometry: VtGeometry, tags: GeoProperties) -> VtFeature {
		let mut feature = VtFeature {
			id,
			kind,
			geometry,
			tags,
			min_x: f64::INFINITY,
			min_y: f64::INFINITY,
			max_x: f64::NEG_INFINITY,
			max_y: f64::NEG_INFINITY,
			zoom_geometries: Vec::new(),
		};
		let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
		let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
		feature.geometry.for_each_point(|x, y| {
			min_x = min_x.min(x);
			min_y = min_y.min(y);
			max_x = max_x.max(x);
			max_y = max_y.max(y);
		});
		feature.min_x = min_x;
		feature.min_y = min_y;
		feature.max_x = max_x;
		feature.max_y = max_y;
		feature
	}

	/// The geometry to build a tile at zoom `z` from: the per-zoom
	/// simplified copy when available, the base geometry otherwise.
	#[must_use]
	pub fn geometry_at(&self, z: u8) -> &VtGeometry {
		self.zoom_geometries.get(z as usize).unwrap_or(&self.geometry)
	}

	/// Creates the per-zoom geometry copies. Polygon rings are simplified
	/// with the tolerance of each zoom level; rings that would fall below
	/// four vertices keep their original shape. Other kinds are carried
	/// unchanged.
	pub(crate) fn build_zoom_geometries(&mut self, options: &TileOptions) {
		self.zoom_geometries = (0..=options.max_zoom)
			.map(|z| {
				if !self.kind.is_polygon() {
					return self.geometry.clone();
				}
				let sq_tolerance = options.tolerance_curve.squared_tolerance(z, options);
				match &self.geometry {
					VtGeometry::Lines(rings) => {
						VtGeometry::Lines(rings.iter().map(|ring| simplify_ring(ring, sq_tolerance)).collect())
					}
					VtGeometry::Polygons(polygons) => VtGeometry::Polygons(
						polygons
							.iter()
							.map(|rings| rings.iter().map(|ring| simplify_ring(ring, sq_tolerance)).collect())
							.collect(),
					),
					VtGeometry::Points(_) => self.geometry.clone(),
				}
			})
			.collect();
	}
}

fn simplify_ring(ring: &VtSlice, sq_tolerance: f64) -> VtSlice {
	let pairs = ring.pairs();
	let simplified = simplify(&pairs, sq_tolerance, 3);
	if simplified.len() < 4 {
		return ring.clone();
	}
	let mut out = ring.derived();
	out.set_pairs(&simplified);
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	fn square_ring() -> VtSlice {
		VtSlice::from(vec![
			[0.0, 0.0],
			[0.5, 0.0],
			[1.0, 0.0],
			[1.0, 1.0],
			[0.0, 1.0],
			[0.0, 0.0],
		])
	}

	#[test]
	fn test_bbox_is_computed_on_creation() {
		let feature = VtFeature::new(
			None,
			VtFeatureKind::LineString,
			VtGeometry::Lines(vec![VtSlice::from(vec![[0.25, 0.5], [0.75, 0.25]])]),
			GeoProperties::new(),
		);
		assert_eq!(
			(feature.min_x, feature.min_y, feature.max_x, feature.max_y),
			(0.25, 0.25, 0.75, 0.5)
		);
	}

	#[test]
	fn test_zoom_geometries_simplify_polygon_rings() {
		let mut feature = VtFeature::new(
			None,
			VtFeatureKind::Polygon,
			VtGeometry::Lines(vec![square_ring()]),
			GeoProperties::new(),
		);
		feature.build_zoom_geometries(&TileOptions {
			max_zoom: 2,
			..TileOptions::default()
		});
		assert_eq!(feature.zoom_geometries.len(), 3);

		// the collinear midpoint on the lower edge is gone at z=0
		let VtGeometry::Lines(rings) = &feature.zoom_geometries[0] else {
			panic!("expected ring geometry");
		};
		assert_eq!(rings[0].len_points(), 5);
	}

	#[test]
	fn test_zoom_geometries_keep_lines_unchanged() {
		let line = VtGeometry::Lines(vec![VtSlice::from(vec![[0.0, 0.0], [0.5, 0.0], [1.0, 0.0]])]);
		let mut feature = VtFeature::new(None, VtFeatureKind::LineString, line.clone(), GeoProperties::new());
		feature.build_zoom_geometries(&TileOptions {
			max_zoom: 1,
			..TileOptions::default()
		});
		assert_eq!(feature.zoom_geometries[0], line);
		assert_eq!(feature.geometry_at(1), &line);
		// out-of-range zooms fall back to the base geometry
		assert_eq!(feature.geometry_at(9), &line);
	}

	#[test]
	fn test_slice_derived_keeps_metrics() {
		let mut slice = VtSlice::from(vec![[0.0, 0.0], [1.0, 0.0]]);
		slice.size = 1.0;
		slice.end = 1.0;
		let derived = slice.derived();
		assert!(derived.is_empty());
		assert_eq!((derived.size, derived.start, derived.end), (1.0, 0.0, 1.0));
	}
}
