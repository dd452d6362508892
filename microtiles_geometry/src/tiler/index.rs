//! The tile index: breadth-first quadtree splitting over an explicit stack,
//! a packed-id tile cache, and on-demand drill-down from retained ancestor
//! geometry.

use super::clip::{Axis, clip};
use super::convert::convert;
use super::feature::VtFeature;
use super::options::TileOptions;
use super::tile::Tile;
use super::transform::transform_tile;
use anyhow::Result;
use microtiles_core::{CancellationToken, TileCoord, TilesetError};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, hash_map::Entry};
use std::rc::Rc;

#[derive(Debug)]
pub struct TileIndex {
	options: TileOptions,
	cancel: CancellationToken,
	tiles: HashMap<u64, Tile>,
	tile_coords: Vec<TileCoord>,
	stats: BTreeMap<u8, u32>,
	total: u32,
}

impl TileIndex {
	/// Converts and tiles a whole input document.
	pub fn from_document(data: &Value, options: TileOptions, cancel: CancellationToken) -> Result<TileIndex> {
		options.validate()?;
		let features = convert(data, &options)?;
		TileIndex::new(features, options, cancel)
	}

	/// Builds the index from already converted features: creates the
	/// per-zoom simplified copies, then splits from the root tile until the
	/// stop conditions hold.
	pub fn new(mut features: Vec<VtFeature>, options: TileOptions, cancel: CancellationToken) -> Result<TileIndex> {
		options.validate()?;

		for feature in &mut features {
			feature.build_zoom_geometries(&options);
		}
		let features: Vec<Rc<VtFeature>> = features.into_iter().map(Rc::new).collect();

		let mut index = TileIndex {
			options,
			cancel,
			tiles: HashMap::new(),
			tile_coords: Vec::new(),
			stats: BTreeMap::new(),
			total: 0,
		};

		if !features.is_empty() {
			index.split_tile(features, TileCoord { z: 0, x: 0, y: 0 }, None)?;
		}

		Ok(index)
	}

	/// Returns the transformed tile at `(z, x, y)`, drilling down from the
	/// nearest cached ancestor when the tile was not built eagerly. The `x`
	/// column wraps modulo `2^z`.
	pub fn get_tile(&mut self, z: u8, x: u32, y: u32) -> Result<Option<&Tile>> {
		if z > 24 {
			return Ok(None);
		}
		let coord = TileCoord::wrapped(z, x, y);
		let id = coord.to_id();
		let extent = self.options.extent;

		if let Some(tile) = self.tiles.get_mut(&id) {
			transform_tile(tile, extent);
			return Ok(self.tiles.get(&id));
		}

		log::debug!("drilling down to z{}-{}-{}", coord.z, coord.x, coord.y);

		// walk up to the nearest cached ancestor
		let mut parent = None;
		let (mut pz, mut px, mut py) = (coord.z, coord.x, coord.y);
		while pz > 0 {
			pz -= 1;
			px >>= 1;
			py >>= 1;
			let candidate = TileCoord { z: pz, x: px, y: py };
			if self.tiles.contains_key(&candidate.to_id()) {
				parent = Some(candidate);
				break;
			}
		}

		let Some(parent) = parent else {
			return Ok(None);
		};
		let Some(source) = self.tiles.get(&parent.to_id()).and_then(|tile| tile.source.clone()) else {
			return Ok(None);
		};

		log::debug!("found parent tile z{}-{}-{}", parent.z, parent.x, parent.y);
		self.split_tile(source, parent, Some(coord))?;

		if self.tiles.contains_key(&id) {
			if let Some(tile) = self.tiles.get_mut(&id) {
				transform_tile(tile, extent);
			}
			return Ok(self.tiles.get(&id));
		}
		Ok(None)
	}

	/// Splits features from `start` down the quadtree. Without a target the
	/// recursion stops at `index_max_zoom` or once a tile is simple enough;
	/// with a target it descends only along the target's ancestor path until
	/// the target zoom.
	fn split_tile(&mut self, features: Vec<Rc<VtFeature>>, start: TileCoord, target: Option<TileCoord>) -> Result<()> {
		let mut stack: Vec<(Vec<Rc<VtFeature>>, TileCoord)> = vec![(features, start)];

		while let Some((features, coord)) = stack.pop() {
			if self.cancel.is_cancelled() {
				return Err(TilesetError::Cancelled.into());
			}

			let (z, x, y) = (coord.z, coord.x, coord.y);
			let id = coord.to_id();

			let tile = match self.tiles.entry(id) {
				Entry::Occupied(entry) => entry.into_mut(),
				Entry::Vacant(entry) => {
					self.tile_coords.push(coord);
					*self.stats.entry(z).or_insert(0) += 1;
					self.total += 1;
					entry.insert(Tile::new(&features, coord, &self.options))
				}
			};

			// collection bounds, needed for clipping after the features have
			// moved into the tile's source slot
			let (min_x, min_y, max_x, max_y) = (tile.min_x, tile.min_y, tile.max_x, tile.max_y);
			let num_points = tile.num_points;
			tile.source = Some(features);

			let stop = match target {
				None => {
					z == self.options.index_max_zoom
						|| z == self.options.max_zoom
						|| num_points <= self.options.index_max_points
				}
				Some(t) => {
					if z == self.options.max_zoom || z == t.z {
						true
					} else {
						!coord.is_ancestor_of(&t)
					}
				}
			};
			if stop {
				continue;
			}

			// slicing further down, the source geometry is no longer needed
			let features = tile.source.take().unwrap_or_default();
			if features.is_empty() {
				continue;
			}

			log::debug!("clipping tile z{z}-{x}-{y}");

			let z2 = f64::from(1u32 << z);
			let k1 = self.options.half_buffer();
			let k2 = 0.5 - k1;
			let k3 = 0.5 + k1;
			let k4 = 1.0 + k1;
			let xf = f64::from(x);
			let yf = f64::from(y);

			let left = clip(&features, z2, xf - k1, xf + k3, Axis::X, min_x, max_x, &self.options);
			let right = clip(&features, z2, xf + k2, xf + k4, Axis::X, min_x, max_x, &self.options);
			drop(features);

			if let Some(left) = left {
				let tl = clip(&left, z2, yf - k1, yf + k3, Axis::Y, min_y, max_y, &self.options);
				let bl = clip(&left, z2, yf + k2, yf + k4, Axis::Y, min_y, max_y, &self.options);
				if let Some(tl) = tl {
					stack.push((tl, TileCoord { z: z + 1, x: x * 2, y: y * 2 }));
				}
				if let Some(bl) = bl {
					stack.push((bl, TileCoord { z: z + 1, x: x * 2, y: y * 2 + 1 }));
				}
			}

			if let Some(right) = right {
				let tr = clip(&right, z2, yf - k1, yf + k3, Axis::Y, min_y, max_y, &self.options);
				let br = clip(&right, z2, yf + k2, yf + k4, Axis::Y, min_y, max_y, &self.options);
				if let Some(tr) = tr {
					stack.push((tr, TileCoord { z: z + 1, x: x * 2 + 1, y: y * 2 }));
				}
				if let Some(br) = br {
					stack.push((br, TileCoord { z: z + 1, x: x * 2 + 1, y: y * 2 + 1 }));
				}
			}
		}

		Ok(())
	}

	pub fn options(&self) -> &TileOptions {
		&self.options
	}

	/// Built tile coordinates in insertion order.
	pub fn tile_coords(&self) -> &[TileCoord] {
		&self.tile_coords
	}

	pub fn contains(&self, coord: &TileCoord) -> bool {
		self.tiles.contains_key(&coord.to_id())
	}

	/// Number of tiles built per zoom level.
	pub fn stats(&self) -> &BTreeMap<u8, u32> {
		&self.stats
	}

	pub fn total(&self) -> u32 {
		self.total
	}
}
