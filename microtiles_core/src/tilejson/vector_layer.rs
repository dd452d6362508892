use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single entry of `vector_layers` in a TileJSON document.
///
/// Besides the fields of the TileJSON 3.0.0 specification, a layer may carry
/// observed value statistics: numeric `fieldranges` (`name -> [min, max]`)
/// and string `fieldenums` (`name -> distinct values`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VectorLayer {
	pub id: String,

	#[serde(default)]
	pub fields: BTreeMap<String, String>,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub minzoom: Option<u8>,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub maxzoom: Option<u8>,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub fieldranges: Option<BTreeMap<String, Vec<f64>>>,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub fieldenums: Option<BTreeMap<String, Vec<String>>>,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub fielddescriptions: Option<BTreeMap<String, String>>,
}

impl VectorLayer {
	pub fn new(id: &str) -> VectorLayer {
		VectorLayer {
			id: id.to_string(),
			fields: BTreeMap::new(),
			description: None,
			minzoom: None,
			maxzoom: None,
			fieldranges: None,
			fieldenums: None,
			fielddescriptions: None,
		}
	}

	/// Validates the layer against the TileJSON 3.0.0 constraints.
	pub fn check(&self) -> Result<()> {
		// See: https://github.com/mapbox/tilejson-spec/tree/master/3.0.0#33-vector_layers
		ensure!(!self.id.is_empty(), "Empty layer id");
		ensure!(self.id.len() <= 255, "Layer id too long: '{}'", self.id);
		ensure!(
			self.id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
			"Invalid layer id '{}'",
			self.id
		);

		for key in self.fields.keys() {
			ensure!(!key.is_empty(), "Empty field name in layer '{}'", self.id);
			ensure!(key.len() <= 255, "Field name too long: '{key}'");
		}

		if let Some(mz) = self.minzoom {
			ensure!(mz <= 30, "minzoom too high: {mz}");
		}
		if let Some(mz) = self.maxzoom {
			ensure!(mz <= 30, "maxzoom too high: {mz}");
			if let Some(minz) = self.minzoom {
				ensure!(minz <= mz, "minzoom must be <= maxzoom, found min={minz}, max={mz}");
			}
		}

		if let Some(ranges) = &self.fieldranges {
			for (name, range) in ranges {
				ensure!(range.len() == 2, "field range of '{name}' must be [min, max]");
				ensure!(range[0] <= range[1], "field range of '{name}' is inverted");
			}
		}

		Ok(())
	}
}

/// Validates a whole `vector_layers` array.
pub fn check_vector_layers(layers: &[VectorLayer]) -> Result<()> {
	ensure!(!layers.is_empty(), "at least one vector layer is required");
	for layer in layers {
		layer.check().with_context(|| format!("layer '{}'", layer.id))?;
	}
	Ok(())
}
