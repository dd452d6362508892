//! Converts tile feature coordinates from the unit square to the integer
//! extent grid of the tile.

use super::tile::{Tile, TileGeometry};

/// Transforms the tile in place; idempotent through the `transformed` flag.
/// Each coordinate becomes `round(extent * (u * 2^z - tile))`, an
/// integer-valued float.
pub fn transform_tile(tile: &mut Tile, extent: u32) {
	if tile.transformed {
		return;
	}

	let z2 = f64::from(1u32 << tile.z);
	let tx = f64::from(tile.x);
	let ty = f64::from(tile.y);
	let extent = f64::from(extent);

	for feature in &mut tile.features {
		match &mut feature.geometry {
			TileGeometry::Points(points) => {
				for p in points.iter_mut() {
					*p = transform_point(*p, extent, z2, tx, ty);
				}
			}
			TileGeometry::Rings(rings) => {
				for ring in rings.iter_mut() {
					for p in ring.points.iter_mut() {
						*p = transform_point(*p, extent, z2, tx, ty);
					}
				}
			}
		}
	}

	tile.transformed = true;
}

fn transform_point(p: [f64; 2], extent: f64, z2: f64, tx: f64, ty: f64) -> [f64; 2] {
	[
		(extent * (p[0] * z2 - tx)).round(),
		(extent * (p[1] * z2 - ty)).round(),
	]
}
