//! The TileJSON metadata descriptor.
//!
//! A [`TileJSON`] declares where the tiles of a tileset live (a
//! `{z}/{x}/{y}` URL template), its zoom range and bounds, and the schema of
//! each vector layer. [`TileJSON::check`] validates a document against the
//! TileJSON 3.0.0 specification before any tile is written.
//!
//! # Example
//! ```rust
//! use microtiles_core::tilejson::TileJSON;
//!
//! let tilejson = TileJSON::try_from(r#"{
//!   "tilejson": "3.0.0",
//!   "tiles": ["tiles/{z}/{x}/{y}.pbf"],
//!   "vector_layers": [{"id": "cells", "fields": {"Label": "Number"}}]
//! }"#).unwrap();
//! assert_eq!(tilejson.maxzoom, 22);
//! ```

mod vector_layer;

pub use vector_layer::{VectorLayer, check_vector_layers};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileJSON {
	/// TileJSON specification version, e.g. `"3.0.0"`.
	pub tilejson: String,

	/// Tile URL templates; each must contain `{z}`, `{x}` and `{y}`.
	pub tiles: Vec<String>,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub version: Option<String>,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub attribution: Option<String>,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub template: Option<String>,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub legend: Option<String>,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub scheme: Option<String>,

	#[serde(default)]
	pub minzoom: u8,

	#[serde(default = "default_maxzoom")]
	pub maxzoom: u8,

	/// `[min_x, min_y, max_x, max_y]`, optionally followed by further
	/// dimensions (4 to 10 values).
	#[serde(skip_serializing_if = "Option::is_none")]
	pub bounds: Option<Vec<f64>>,

	/// `[x, y, zoom]`, optionally followed by further dimensions (3 to 6
	/// values).
	#[serde(skip_serializing_if = "Option::is_none")]
	pub center: Option<Vec<f64>>,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub fillzoom: Option<u8>,

	pub vector_layers: Vec<VectorLayer>,

	/// Opaque multiscale axes/transformations passthrough of extended
	/// documents.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub multiscale: Option<serde_json::Value>,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub scale_factor: Option<f64>,
}

fn default_maxzoom() -> u8 {
	22
}

impl TileJSON {
	/// Validates the document: tile templates, zoom range, bounds/center
	/// arity and every vector layer.
	pub fn check(&self) -> Result<()> {
		ensure!(!self.tiles.is_empty(), "at least one tile URL template is required");
		for template in &self.tiles {
			for placeholder in ["{z}", "{x}", "{y}"] {
				ensure!(
					template.contains(placeholder),
					"tile URL template '{template}' is missing '{placeholder}'"
				);
			}
		}

		ensure!(self.maxzoom <= 30, "maxzoom too high: {}", self.maxzoom);
		ensure!(
			self.minzoom <= self.maxzoom,
			"minzoom ({}) must be <= maxzoom ({})",
			self.minzoom,
			self.maxzoom
		);

		if let Some(bounds) = &self.bounds {
			ensure!(
				(4..=10).contains(&bounds.len()),
				"bounds must hold 4 to 10 values, got {}",
				bounds.len()
			);
		}
		if let Some(center) = &self.center {
			ensure!(
				(3..=6).contains(&center.len()),
				"center must hold 3 to 6 values, got {}",
				center.len()
			);
		}

		check_vector_layers(&self.vector_layers)
	}

	pub fn as_string(&self) -> Result<String> {
		serde_json::to_string_pretty(self).context("Failed to serialize TileJSON")
	}
}

impl TryFrom<&str> for TileJSON {
	type Error = anyhow::Error;

	fn try_from(text: &str) -> Result<Self> {
		let tilejson: TileJSON = serde_json::from_str(text).context("Failed to parse TileJSON")?;
		tilejson.check()?;
		Ok(tilejson)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn example() -> TileJSON {
		TileJSON {
			tilejson: "3.0.0".to_string(),
			tiles: vec!["tiles/{z}/{x}/{y}.pbf".to_string()],
			name: Some("Example Tile Layer".to_string()),
			description: None,
			version: Some("1.0.0".to_string()),
			attribution: None,
			template: None,
			legend: None,
			scheme: None,
			minzoom: 0,
			maxzoom: 7,
			bounds: Some(vec![0.0, 0.0, 10000.0, 10000.0]),
			center: Some(vec![0.0, 5000.0, 5000.0]),
			fillzoom: None,
			vector_layers: vec![VectorLayer::new("polygon-layer")],
			multiscale: None,
			scale_factor: None,
		}
	}

	#[test]
	fn test_check_valid() {
		assert!(example().check().is_ok());
	}

	#[test]
	fn test_check_missing_placeholder() {
		let mut tilejson = example();
		tilejson.tiles = vec!["tiles/{z}/{x}.pbf".to_string()];
		assert!(
			tilejson
				.check()
				.unwrap_err()
				.to_string()
				.contains("is missing '{y}'")
		);
	}

	#[test]
	fn test_check_bounds_arity() {
		let mut tilejson = example();
		tilejson.bounds = Some(vec![0.0, 0.0, 1.0]);
		assert!(tilejson.check().is_err());
		tilejson.bounds = Some(vec![0.0; 11]);
		assert!(tilejson.check().is_err());
	}

	#[test]
	fn test_check_center_arity() {
		let mut tilejson = example();
		tilejson.center = Some(vec![0.0, 0.0]);
		assert!(tilejson.check().is_err());
	}

	#[test]
	fn test_check_no_layers() {
		let mut tilejson = example();
		tilejson.vector_layers.clear();
		assert!(tilejson.check().is_err());
	}

	#[test]
	fn test_try_from_defaults() -> Result<()> {
		let tilejson = TileJSON::try_from(
			r#"{"tilejson":"3.0.0","tiles":["t/{z}/{x}/{y}.json"],"vector_layers":[{"id":"a"}]}"#,
		)?;
		assert_eq!(tilejson.minzoom, 0);
		assert_eq!(tilejson.maxzoom, 22);
		Ok(())
	}

	#[test]
	fn test_serialization_skips_empty_fields() -> Result<()> {
		let mut tilejson = example();
		tilejson.bounds = None;
		tilejson.center = None;
		tilejson.name = None;
		tilejson.version = None;
		let text = tilejson.as_string()?;
		assert!(!text.contains("bounds"));
		assert!(!text.contains("\"name\""));
		assert_eq!(TileJSON::try_from(text.as_str())?, tilejson);
		Ok(())
	}
}
