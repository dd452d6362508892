use super::{feature::VectorTileFeature, property_manager::PropertyManager, value::GeoValuePBF};
use crate::tiler::Tile;
use anyhow::{Context, Result};
use microtiles_core::{
	Blob, TilesetError,
	io::{ValueWriter, ValueWriterBlob},
};

/// One encoded layer: name, extent, the key/value dictionaries and the
/// encoded features. Each encode call builds exactly one layer and keeps no
/// state across tiles.
#[derive(Debug, Default, PartialEq)]
pub struct VectorTileLayer {
	pub version: u32,
	pub name: String,
	pub extent: u32,
	pub features: Vec<VectorTileFeature>,
	pub property_manager: PropertyManager,
}

impl VectorTileLayer {
	/// Encodes a transformed tile into a version 2 layer.
	pub fn from_tile(name: &str, tile: &Tile, extent: u32) -> Result<VectorTileLayer> {
		if !tile.transformed {
			return Err(
				TilesetError::EncoderFailure(format!("tile z{}-{}-{} has not been transformed", tile.z, tile.x, tile.y)).into(),
			);
		}

		let mut property_manager = PropertyManager::new();
		let features = tile
			.features
			.iter()
			.map(|feature| {
				let tag_ids = property_manager.encode_tag_ids(feature.tags.clone());
				VectorTileFeature::from_tile_feature(feature, tag_ids)
			})
			.collect::<Result<Vec<VectorTileFeature>>>()?;

		Ok(VectorTileLayer {
			version: 2,
			name: name.to_string(),
			extent,
			features,
			property_manager,
		})
	}

	pub fn to_blob(&self) -> Result<Blob> {
		let mut writer = ValueWriterBlob::new_le();

		writer
			.write_pbf_key(1, 2)
			.context("Failed to write PBF key for layer name")?;
		writer
			.write_pbf_string(&self.name)
			.context("Failed to write layer name")?;

		for feature in &self.features {
			writer
				.write_pbf_key(2, 2)
				.context("Failed to write PBF key for feature")?;
			writer
				.write_pbf_blob(&feature.to_blob().context("Failed to convert feature to blob")?)
				.context("Failed to write feature blob")?;
		}

		for key in self.property_manager.iter_key() {
			writer
				.write_pbf_key(3, 2)
				.context("Failed to write PBF key for property key")?;
			writer.write_pbf_string(key).context("Failed to write property key")?;
		}

		for value in self.property_manager.iter_val() {
			writer
				.write_pbf_key(4, 2)
				.context("Failed to write PBF key for property value")?;
			writer
				.write_pbf_blob(&value.to_blob().context("Failed to convert property value to blob")?)
				.context("Failed to write property value blob")?;
		}

		if self.extent != 4096 {
			writer
				.write_pbf_key(5, 0)
				.context("Failed to write PBF key for extent")?;
			writer
				.write_varint(u64::from(self.extent))
				.context("Failed to write extent")?;
		}

		if self.version != 1 {
			writer
				.write_pbf_key(15, 0)
				.context("Failed to write PBF key for version")?;
			writer
				.write_varint(u64::from(self.version))
				.context("Failed to write version")?;
		}

		Ok(writer.into_blob())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::geo::{GeoProperties, GeoValue};
	use crate::math::area_ring;
	use crate::tiler::{
		TileFeature, TileFeatureKind, TileGeometry, TileOptions, TileRing, VtFeature, VtFeatureKind, VtGeometry,
		VtSlice, transform_tile,
	};
	use crate::tiler::Tile as TilerTile;
	use microtiles_core::TileCoord;
	use pretty_assertions::assert_eq;
	use std::rc::Rc;

	fn point_tile() -> TilerTile {
		let features = vec![Rc::new(VtFeature::new(
			Some(GeoValue::UInt(1)),
			VtFeatureKind::Point,
			VtGeometry::Points(VtSlice::from(vec![[0.25, 0.75]])),
			GeoProperties::from(vec![("name", GeoValue::from("a"))]),
		))];
		let mut tile = TilerTile::new(&features, TileCoord::new(0, 0, 0).unwrap(), &TileOptions::default());
		transform_tile(&mut tile, 4096);
		tile
	}

	#[test]
	fn test_untransformed_tile_is_rejected() {
		let features = vec![Rc::new(VtFeature::new(
			None,
			VtFeatureKind::Point,
			VtGeometry::Points(VtSlice::from(vec![[0.5, 0.5]])),
			GeoProperties::new(),
		))];
		let tile = TilerTile::new(&features, TileCoord::new(0, 0, 0).unwrap(), &TileOptions::default());
		assert!(VectorTileLayer::from_tile("tile", &tile, 4096).is_err());
	}

	#[test]
	fn test_layer_blob() -> Result<()> {
		let layer = VectorTileLayer::from_tile("tile", &point_tile(), 4096)?;
		assert_eq!(layer.version, 2);
		assert_eq!(
			layer.to_blob()?.into_vec(),
			vec![
				0x0A, 4, b't', b'i', b'l', b'e', // name
				0x12, 15, // feature message
				0x08, 1, // id
				0x12, 2, 0, 0, // tag ids
				0x18, 1, // geometry type
				0x22, 5, 9, 128, 16, 128, 48, // geometry commands
				0x1A, 4, b'n', b'a', b'm', b'e', // key dictionary
				0x22, 3, 0x0A, 1, b'a', // value dictionary
				0x78, 2, // version
			]
		);
		Ok(())
	}

	#[test]
	fn test_custom_extent_is_written() -> Result<()> {
		let mut layer = VectorTileLayer::from_tile("tile", &point_tile(), 512)?;
		layer.features.clear();
		let blob = layer.to_blob()?.into_vec();
		// key (5, 0) followed by varint 512
		let tail = &blob[blob.len() - 5..];
		assert_eq!(tail, &[0x28, 0x80, 0x04, 0x78, 0x02]);
		Ok(())
	}

	#[test]
	fn test_encoded_polygon_orientation() -> Result<()> {
		// outer ring entered clockwise, hole counter-clockwise: the encoder
		// must flip both
		let tile = TilerTile {
			z: 0,
			x: 0,
			y: 0,
			features: vec![TileFeature {
				id: None,
				kind: TileFeatureKind::Polygon,
				geometry: TileGeometry::Rings(vec![
					TileRing {
						points: vec![[0.0, 0.0], [0.0, 40.0], [40.0, 40.0], [40.0, 0.0], [0.0, 0.0]],
						outer: true,
					},
					TileRing {
						points: vec![[10.0, 10.0], [30.0, 10.0], [30.0, 30.0], [10.0, 30.0], [10.0, 10.0]],
						outer: false,
					},
				]),
				tags: GeoProperties::new(),
			}],
			num_points: 10,
			num_simplified: 10,
			num_features: 1,
			transformed: true,
			min_x: 0.0,
			min_y: 0.0,
			max_x: 1.0,
			max_y: 1.0,
			source: None,
		};

		let layer = VectorTileLayer::from_tile("tile", &tile, 4096)?;
		let decoded = decode_rings(layer.features[0].geom_data.as_slice());
		assert!(area_ring(&decoded[0]) > 0.0, "outer ring must be counter-clockwise");
		assert!(area_ring(&decoded[1]) < 0.0, "inner ring must be clockwise");
		Ok(())
	}

	/// Minimal command stream decoder used by the orientation tests.
	fn decode_rings(data: &[u8]) -> Vec<Vec<[f64; 2]>> {
		fn read_varint(data: &[u8], pos: &mut usize) -> u64 {
			let mut value = 0u64;
			let mut shift = 0;
			loop {
				let byte = data[*pos];
				*pos += 1;
				value |= u64::from(byte & 0x7F) << shift;
				if byte & 0x80 == 0 {
					return value;
				}
				shift += 7;
			}
		}
		fn unzigzag(v: u64) -> i64 {
			((v >> 1) as i64) ^ -((v & 1) as i64)
		}

		let mut rings: Vec<Vec<[f64; 2]>> = Vec::new();
		let mut ring: Vec<[f64; 2]> = Vec::new();
		let (mut x, mut y) = (0i64, 0i64);
		let mut pos = 0;

		while pos < data.len() {
			let first = read_varint(data, &mut pos);
			let command = first & 0x7;
			let count = first >> 3;
			match command {
				1 | 2 => {
					for _ in 0..count {
						if command == 1 && !ring.is_empty() {
							rings.push(std::mem::take(&mut ring));
						}
						x += unzigzag(read_varint(data, &mut pos));
						y += unzigzag(read_varint(data, &mut pos));
						ring.push([x as f64, y as f64]);
					}
				}
				7 => {
					if let Some(head) = ring.first().copied() {
						ring.push(head);
					}
				}
				_ => panic!("unknown command {command}"),
			}
		}
		if !ring.is_empty() {
			rings.push(ring);
		}
		rings
	}
}
