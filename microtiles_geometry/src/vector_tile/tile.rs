use super::layer::VectorTileLayer;
use anyhow::{Context, Result};
use microtiles_core::{
	Blob,
	io::{ValueWriter, ValueWriterBlob},
};

/// A whole binary tile: one or more layers.
#[derive(Debug, Default, PartialEq)]
pub struct VectorTile {
	pub layers: Vec<VectorTileLayer>,
}

impl VectorTile {
	pub fn new(layers: Vec<VectorTileLayer>) -> VectorTile {
		VectorTile { layers }
	}

	pub fn to_blob(&self) -> Result<Blob> {
		let mut writer = ValueWriterBlob::new_le();

		for layer in &self.layers {
			writer.write_pbf_key(3, 2).context("Failed to write PBF key")?;
			writer
				.write_pbf_blob(&layer.to_blob().context("Failed to convert VectorTileLayer to blob")?)
				.context("Failed to write PBF blob")?;
		}

		Ok(writer.into_blob())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_to_blob_wraps_layers() -> Result<()> {
		let layer = VectorTileLayer {
			version: 2,
			name: "tile".to_string(),
			extent: 4096,
			features: vec![],
			property_manager: super::super::PropertyManager::new(),
		};
		let layer_bytes = layer.to_blob()?.into_vec();
		let tile_bytes = VectorTile::new(vec![layer]).to_blob()?.into_vec();

		assert_eq!(tile_bytes[0], 0x1A);
		assert_eq!(tile_bytes[1] as usize, layer_bytes.len());
		assert_eq!(&tile_bytes[2..], layer_bytes.as_slice());
		Ok(())
	}

	#[test]
	fn test_empty_tile() -> Result<()> {
		assert!(VectorTile::default().to_blob()?.is_empty());
		Ok(())
	}
}
