use super::tolerance::ToleranceCurve;
use anyhow::Result;
use microtiles_core::{GeoBBox, TilesetError};

/// Which projection maps input coordinates into the unit square.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProjectorChoice {
	/// Cartesian when `bounds` is configured, Spherical otherwise.
	#[default]
	Auto,
	/// Affine normalisation against the configured `bounds` rectangle.
	Cartesian,
	/// Web-Mercator projection of longitude/latitude degrees.
	Spherical,
}

/// Options of the tiling pipeline.
#[derive(Clone, Debug)]
pub struct TileOptions {
	/// Deepest zoom level written (0..=24).
	pub max_zoom: u8,
	/// Deepest zoom level built eagerly into the index.
	pub index_max_zoom: u8,
	/// Stop splitting once a tile holds at most this many points.
	pub index_max_points: u64,
	/// Base simplification tolerance (higher means simpler).
	pub tolerance: f64,
	/// Integer grid resolution inside a tile.
	pub extent: u32,
	/// Overlap on each tile edge, in extent units.
	pub buffer: u32,
	/// Retain clip fractions per LineString.
	pub line_metrics: bool,
	/// Property name to adopt as feature id.
	pub promote_id: Option<String>,
	/// Synthesise integer ids from input order.
	pub generate_id: bool,
	pub projector: ProjectorChoice,
	/// Source rectangle of the Cartesian projector.
	pub bounds: Option<GeoBBox>,
	/// Zoom-to-squared-tolerance curve.
	pub tolerance_curve: ToleranceCurve,
}

impl Default for TileOptions {
	fn default() -> Self {
		TileOptions {
			max_zoom: 8,
			index_max_zoom: 5,
			index_max_points: 100_000,
			tolerance: 50.0,
			extent: 4096,
			buffer: 64,
			line_metrics: false,
			promote_id: None,
			generate_id: false,
			projector: ProjectorChoice::Auto,
			bounds: None,
			tolerance_curve: ToleranceCurve::Default,
		}
	}
}

impl TileOptions {
	/// Rejects contradictory or out-of-range options before any work starts.
	pub fn validate(&self) -> Result<()> {
		if self.max_zoom > 24 {
			return Err(TilesetError::InvalidConfig(format!("maxZoom should be in the 0-24 range, got {}", self.max_zoom)).into());
		}
		if self.promote_id.is_some() && self.generate_id {
			return Err(TilesetError::InvalidConfig("promoteId and generateId cannot be used together".to_string()).into());
		}
		if self.extent == 0 {
			return Err(TilesetError::InvalidConfig("extent must be positive".to_string()).into());
		}
		if self.projector == ProjectorChoice::Cartesian && self.bounds.is_none() {
			return Err(TilesetError::InvalidConfig("the Cartesian projector requires bounds".to_string()).into());
		}
		Ok(())
	}

	/// Half buffer width in unit-square coordinates (`0.5 * buffer / extent`).
	#[must_use]
	pub fn half_buffer(&self) -> f64 {
		0.5 * f64::from(self.buffer) / f64::from(self.extent)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use microtiles_core::TilesetError;

	#[test]
	fn test_defaults() {
		let options = TileOptions::default();
		assert_eq!(options.max_zoom, 8);
		assert_eq!(options.index_max_zoom, 5);
		assert_eq!(options.index_max_points, 100_000);
		assert_eq!(options.extent, 4096);
		assert_eq!(options.buffer, 64);
		assert!(options.validate().is_ok());
		assert_eq!(options.half_buffer(), 0.0078125);
	}

	#[test]
	fn test_validate_max_zoom() {
		let options = TileOptions {
			max_zoom: 25,
			..TileOptions::default()
		};
		let error = options.validate().unwrap_err();
		assert!(matches!(
			error.downcast_ref::<TilesetError>(),
			Some(TilesetError::InvalidConfig(_))
		));
	}

	#[test]
	fn test_validate_id_conflict() {
		let options = TileOptions {
			promote_id: Some("gid".to_string()),
			generate_id: true,
			..TileOptions::default()
		};
		assert!(options.validate().is_err());
	}

	#[test]
	fn test_validate_cartesian_needs_bounds() {
		let options = TileOptions {
			projector: ProjectorChoice::Cartesian,
			..TileOptions::default()
		};
		assert!(options.validate().is_err());
	}
}
