//! Writes a tileset to a `{z}/{x}/{y}` directory tree.

use crate::validate::validate_document;
use anyhow::{Context, Result};
use microtiles_core::{Blob, CancellationToken, GeoBBox, TileCoord, TilesetError, tilejson::TileJSON};
use microtiles_geometry::geo::GeoValue;
use microtiles_geometry::tiler::{Tile, TileIndex, TileOptions};
use microtiles_geometry::vector_tile::{VectorTile, VectorTileLayer};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// How tile payloads are encoded on disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileEncoding {
	/// A JSON dump of the transformed tile record.
	Json,
	/// The binary vector-tile layer message.
	Pbf,
}

impl TileEncoding {
	fn extension(self) -> &'static str {
		match self {
			TileEncoding::Json => "json",
			TileEncoding::Pbf => "pbf",
		}
	}
}

/// Drives the tiling pipeline for one document and writes the resulting
/// tiles plus the TileJSON sidecar.
///
/// Feature ids are repaired per build before encoding: missing ids are
/// assigned from a monotone counter and duplicates are bumped past every id
/// seen so far. The counter and the seen set live in the writer, not in any
/// global state.
pub struct TilesetWriter {
	tile_json: TileJSON,
	encoding: TileEncoding,
	/// Log and continue on tile IO/encoding failures instead of aborting.
	pub best_effort: bool,
	/// Write a JSON dump instead when a tile fails to encode as PBF.
	pub json_fallback: bool,
	id_counter: u64,
	id_set: HashSet<u64>,
}

impl TilesetWriter {
	/// Validates the TileJSON and creates a writer.
	pub fn new(tile_json: TileJSON, encoding: TileEncoding) -> Result<TilesetWriter> {
		tile_json.check().context("invalid TileJSON")?;
		Ok(TilesetWriter {
			tile_json,
			encoding,
			best_effort: false,
			json_fallback: false,
			id_counter: 0,
			id_set: HashSet::new(),
		})
	}

	/// Tiles `document` and writes `metadata.json` plus one file per tile
	/// under `out_dir`, returning the written tile paths.
	///
	/// The zoom range is the intersection of the TileJSON's global range
	/// and its first layer's range; the index is built eagerly to the
	/// effective maximum zoom. With `validate` set, all structural input
	/// errors are reported before any tile is built.
	pub fn write_tiles(
		&mut self,
		document: &Value,
		out_dir: &Path,
		options: &TileOptions,
		cancel: &CancellationToken,
		validate: bool,
	) -> Result<Vec<PathBuf>> {
		if validate {
			let errors = validate_document(document);
			if !errors.is_empty() {
				let summary = errors.iter().map(ToString::to_string).collect::<Vec<String>>().join("; ");
				return Err(TilesetError::InvalidInput(format!("{} error(s): {summary}", errors.len())).into());
			}
		}

		let layer = &self.tile_json.vector_layers[0];
		let maxzoom = self.tile_json.maxzoom.min(layer.maxzoom.unwrap_or(22));
		let minzoom = self.tile_json.minzoom.max(layer.minzoom.unwrap_or(0));

		let mut options = options.clone();
		options.max_zoom = maxzoom;
		options.index_max_zoom = maxzoom;
		options.index_max_points = 0;
		if options.bounds.is_none() {
			if let Some(bounds) = &self.tile_json.bounds {
				options.bounds = Some(GeoBBox::try_from(bounds.as_slice())?);
			}
		}
		let extent = options.extent;

		let mut index = TileIndex::from_document(document, options, cancel.clone())?;

		write_blob(&out_dir.join("metadata.json"), &Blob::from(self.tile_json.as_string()?))?;

		let mut written = Vec::new();
		let coords: Vec<TileCoord> = index.tile_coords().to_vec();
		for coord in coords {
			if coord.z < minzoom || coord.z > maxzoom {
				continue;
			}
			let Some(tile) = index.get_tile(coord.z, coord.x, coord.y)? else {
				continue;
			};
			let tile = tile.clone();

			let (blob, extension) = match self.encode_tile(&tile, extent) {
				Ok(encoded) => encoded,
				Err(error) if self.best_effort => {
					log::warn!("skipping tile z{}-{}-{}: {error}", coord.z, coord.x, coord.y);
					continue;
				}
				Err(error) => return Err(error),
			};

			let path = out_dir
				.join(coord.z.to_string())
				.join(coord.x.to_string())
				.join(format!("{}.{extension}", coord.y));
			match write_blob(&path, &blob) {
				Ok(()) => written.push(path),
				Err(error) if self.best_effort => {
					log::warn!("failed to write {}: {error}", path.display());
				}
				Err(error) => return Err(error),
			}
		}

		Ok(written)
	}

	fn encode_tile(&mut self, tile: &Tile, extent: u32) -> Result<(Blob, &'static str)> {
		let tile = self.repair_ids(tile.clone())?;

		if self.encoding == TileEncoding::Pbf {
			match VectorTileLayer::from_tile("tile", &tile, extent)
				.and_then(|layer| VectorTile::new(vec![layer]).to_blob())
			{
				Ok(blob) => return Ok((blob, TileEncoding::Pbf.extension())),
				Err(error) if self.json_fallback => {
					log::warn!("tile z{}-{}-{} falls back to JSON: {error}", tile.z, tile.x, tile.y);
				}
				Err(error) => return Err(error),
			}
		}

		let mut value = serde_json::to_value(&tile).context("Failed to serialize tile")?;
		value["name"] = Value::from("tile");
		Ok((Blob::from(value.to_string()), TileEncoding::Json.extension()))
	}

	/// Gives every feature an integer id: existing ids must encode an
	/// integer, missing ids come from the writer's counter, and ids already
	/// used in this build are bumped.
	fn repair_ids(&mut self, mut tile: Tile) -> Result<Tile> {
		for feature in &mut tile.features {
			let wanted = match &feature.id {
				Some(value) => Some(value.as_u64().map_err(|_| {
					TilesetError::EncoderFailure(format!("feature id {value:?} does not encode an integer"))
				})?),
				None => None,
			};
			let id = self.claim_id(wanted);
			feature.id = Some(GeoValue::UInt(id));
		}
		Ok(tile)
	}

	fn claim_id(&mut self, wanted: Option<u64>) -> u64 {
		let mut id = match wanted {
			Some(id) => id,
			None => self.next_counter(),
		};
		while !self.id_set.insert(id) {
			id = self.next_counter();
		}
		id
	}

	fn next_counter(&mut self) -> u64 {
		let id = self.id_counter;
		self.id_counter += 1;
		id
	}
}

fn write_blob(path: &Path, blob: &Blob) -> Result<()> {
	let io_failure = |source: std::io::Error| TilesetError::IoFailure {
		path: path.to_path_buf(),
		source,
	};

	if let Some(parent) = path.parent() {
		if !parent.exists() {
			fs::create_dir_all(parent).map_err(io_failure)?;
		}
	}
	fs::write(path, blob.as_slice()).map_err(io_failure)?;
	Ok(())
}
