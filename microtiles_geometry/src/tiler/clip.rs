//! Axis-aligned clipping of intermediate features against a buffered slab.
//!
//! Lines are cut Cohen/Liang–Barsky style into sub-lines, polygon rings are
//! clipped Sutherland–Hodgman style against the two slab edges in one
//! streaming pass. Features whose bounding box lies entirely inside the
//! slab are passed through by reference; features entirely outside are
//! dropped.

use super::feature::{VtFeature, VtFeatureKind, VtGeometry, VtSlice};
use super::options::TileOptions;
use microtiles_core::TilesetError;
use std::rc::Rc;

/// The axis the slab constrains: `X` clips columns, `Y` clips rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
	X,
	Y,
}

impl Axis {
	fn component(self, x: f64, y: f64) -> f64 {
		match self {
			Axis::X => x,
			Axis::Y => y,
		}
	}
}

/// Clips `features` against the slab `[k1 / scale, k2 / scale]` along
/// `axis`. `min_all`/`max_all` is the bounding interval of the whole
/// collection along that axis, used for the trivial accept/reject paths.
///
/// Returns `None` when no feature survives, so the splitter can
/// short-circuit whole subtrees.
pub fn clip(
	features: &[Rc<VtFeature>],
	scale: f64,
	k1: f64,
	k2: f64,
	axis: Axis,
	min_all: f64,
	max_all: f64,
	options: &TileOptions,
) -> Option<Vec<Rc<VtFeature>>> {
	let k1 = k1 / scale;
	let k2 = k2 / scale;

	if min_all >= k1 && max_all < k2 {
		// all features fit, pass the collection through
		return Some(features.to_vec());
	} else if max_all < k1 || min_all >= k2 {
		return None;
	}

	let mut clipped: Vec<Rc<VtFeature>> = Vec::new();

	for feature in features {
		let (min, max) = match axis {
			Axis::X => (feature.min_x, feature.max_x),
			Axis::Y => (feature.min_y, feature.max_y),
		};

		if min >= k1 && max < k2 {
			clipped.push(Rc::clone(feature));
			continue;
		} else if max < k1 || min >= k2 {
			continue;
		}

		match (&feature.kind, &feature.geometry) {
			(VtFeatureKind::Point | VtFeatureKind::MultiPoint, VtGeometry::Points(slice)) => {
				let out = clip_points(slice, k1, k2, axis);
				if !out.is_empty() {
					let kind = if out.len_points() == 1 {
						VtFeatureKind::Point
					} else {
						VtFeatureKind::MultiPoint
					};
					push(&mut clipped, feature, kind, VtGeometry::Points(out));
				}
			}

			(VtFeatureKind::LineString, VtGeometry::Lines(lines)) => {
				let mut parts = Vec::new();
				for line in lines {
					clip_line(line, k1, k2, axis, false, options.line_metrics, &mut parts);
				}
				if options.line_metrics {
					// one feature per sub-line, so that each keeps its own
					// clip fractions
					for part in parts {
						push(&mut clipped, feature, VtFeatureKind::LineString, VtGeometry::Lines(vec![part]));
					}
				} else if !parts.is_empty() {
					let kind = if parts.len() == 1 {
						VtFeatureKind::LineString
					} else {
						VtFeatureKind::MultiLineString
					};
					push(&mut clipped, feature, kind, VtGeometry::Lines(parts));
				}
			}

			(VtFeatureKind::MultiLineString, VtGeometry::Lines(lines)) => {
				let mut parts = Vec::new();
				for line in lines {
					clip_line(line, k1, k2, axis, false, false, &mut parts);
				}
				if !parts.is_empty() {
					let kind = if parts.len() == 1 {
						VtFeatureKind::LineString
					} else {
						VtFeatureKind::MultiLineString
					};
					push(&mut clipped, feature, kind, VtGeometry::Lines(parts));
				}
			}

			(VtFeatureKind::Polygon, VtGeometry::Lines(rings)) => {
				if let Some(rings) = clip_rings(rings, k1, k2, axis) {
					push(&mut clipped, feature, VtFeatureKind::Polygon, VtGeometry::Lines(rings));
				}
			}

			(VtFeatureKind::MultiPolygon, VtGeometry::Polygons(polygons)) => {
				let mut out = Vec::new();
				for rings in polygons {
					if let Some(rings) = clip_rings(rings, k1, k2, axis) {
						out.push(rings);
					}
				}
				if !out.is_empty() {
					push(&mut clipped, feature, VtFeatureKind::MultiPolygon, VtGeometry::Polygons(out));
				}
			}

			// the converter ties geometry layout to the feature kind
			_ => {}
		}
	}

	if clipped.is_empty() { None } else { Some(clipped) }
}

fn push(clipped: &mut Vec<Rc<VtFeature>>, source: &VtFeature, kind: VtFeatureKind, geometry: VtGeometry) {
	clipped.push(Rc::new(VtFeature::new(
		source.id.clone(),
		kind,
		geometry,
		source.tags.clone(),
	)));
}

fn clip_points(slice: &VtSlice, k1: f64, k2: f64, axis: Axis) -> VtSlice {
	let mut out = slice.derived();
	for c in slice.coords.chunks_exact(3) {
		let a = axis.component(c[0], c[1]);
		if a >= k1 && a <= k2 {
			out.push_point(c[0], c[1], c[2]);
		}
	}
	out
}

/// Clips the rings of one polygon. The first ring is the outer boundary;
/// when it is clipped away entirely, the holes are dropped with it.
fn clip_rings(rings: &[VtSlice], k1: f64, k2: f64, axis: Axis) -> Option<Vec<VtSlice>> {
	let mut out = Vec::new();
	for (i, ring) in rings.iter().enumerate() {
		let mut parts = Vec::new();
		clip_line(ring, k1, k2, axis, true, false, &mut parts);
		match parts.pop() {
			Some(part) => out.push(part),
			None if i == 0 => return None,
			None => {}
		}
	}
	Some(out)
}

/// Clips one line or ring against the slab, appending the surviving parts
/// to `out`. Lines may split into several sub-lines; rings stay one part,
/// re-closed after clipping, and are dropped when fewer than four vertices
/// remain.
fn clip_line(line: &VtSlice, k1: f64, k2: f64, axis: Axis, is_polygon: bool, track_metrics: bool, out: &mut Vec<VtSlice>) {
	let coords = &line.coords;
	if coords.len() < 3 {
		return;
	}

	let mut slice = line.derived();
	let mut len = line.start;
	let mut seg_len = 0.0;
	let mut t = 0.0;

	let mut i = 0;
	while i + 3 < coords.len() {
		let ax = coords[i];
		let ay = coords[i + 1];
		let az = coords[i + 2];
		let bx = coords[i + 3];
		let by = coords[i + 4];
		let a = axis.component(ax, ay);
		let b = axis.component(bx, by);
		let mut exited = false;

		if track_metrics {
			seg_len = ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt();
		}

		if a < k1 {
			// segment enters through the lower edge
			if b > k1 {
				t = intersect(&mut slice, axis, ax, ay, bx, by, k1);
				if track_metrics {
					slice.start = len + seg_len * t;
				}
			}
		} else if a > k2 {
			// segment enters through the upper edge
			if b < k2 {
				t = intersect(&mut slice, axis, ax, ay, bx, by, k2);
				if track_metrics {
					slice.start = len + seg_len * t;
				}
			}
		} else {
			slice.push_point(ax, ay, az);
		}

		if b < k1 && a >= k1 {
			t = intersect(&mut slice, axis, ax, ay, bx, by, k1);
			exited = true;
		}
		if b > k2 && a <= k2 {
			t = intersect(&mut slice, axis, ax, ay, bx, by, k2);
			exited = true;
		}

		if !is_polygon && exited {
			if track_metrics {
				slice.end = len + seg_len * t;
			}
			out.push(slice);
			slice = line.derived();
		}

		if track_metrics {
			len += seg_len;
		}
		i += 3;
	}

	// add the last point if it is inside
	let last = coords.len() - 3;
	let ax = coords[last];
	let ay = coords[last + 1];
	let az = coords[last + 2];
	if (k1..=k2).contains(&axis.component(ax, ay)) {
		slice.push_point(ax, ay, az);
	}

	if is_polygon {
		// re-close the ring if clipping separated its endpoints
		let m = slice.coords.len();
		if m >= 9 && (slice.coords[m - 3] != slice.coords[0] || slice.coords[m - 2] != slice.coords[1]) {
			let (x0, y0, z0) = (slice.coords[0], slice.coords[1], slice.coords[2]);
			slice.push_point(x0, y0, z0);
		}
		if slice.len_points() < 4 {
			log::debug!(
				"{}",
				TilesetError::GeometryDegenerate("ring collapsed by clipping".to_string())
			);
			return;
		}
	}

	if !slice.is_empty() {
		out.push(slice);
	}
}

/// Adds the intersection of segment `a..b` with the slab edge at `edge` and
/// returns the interpolation parameter along the segment.
fn intersect(slice: &mut VtSlice, axis: Axis, ax: f64, ay: f64, bx: f64, by: f64, edge: f64) -> f64 {
	match axis {
		Axis::X => {
			let t = (edge - ax) / (bx - ax);
			slice.push_point(edge, ay + (by - ay) * t, 1.0);
			t
		}
		Axis::Y => {
			let t = (edge - ay) / (by - ay);
			slice.push_point(ax + (bx - ax) * t, edge, 1.0);
			t
		}
	}
}
