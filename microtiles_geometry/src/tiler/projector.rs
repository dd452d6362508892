//! Projection of input coordinates into the unit square.

use super::options::{ProjectorChoice, TileOptions};
use anyhow::Result;
use microtiles_core::{GeoBBox, TilesetError};

/// A projection of input coordinates into `[0, 1] x [0, 1]`.
///
/// Implement this trait to plug a custom projection into
/// [`convert_with_projector`](super::convert::convert_with_projector).
pub trait Projection {
	fn project_x(&self, x: f64) -> f64;
	fn project_y(&self, y: f64) -> f64;
}

/// Affine normalisation against a source bounding rectangle.
pub struct CartesianProjector {
	bounds: GeoBBox,
}

impl CartesianProjector {
	pub fn new(bounds: GeoBBox) -> Result<CartesianProjector> {
		if !bounds.is_valid() {
			return Err(TilesetError::InvalidConfig(format!("degenerate projector bounds {bounds:?}")).into());
		}
		Ok(CartesianProjector { bounds })
	}
}

impl Projection for CartesianProjector {
	fn project_x(&self, x: f64) -> f64 {
		(x - self.bounds.0) / self.bounds.width()
	}

	fn project_y(&self, y: f64) -> f64 {
		(y - self.bounds.1) / self.bounds.height()
	}
}

/// Web-Mercator projection of longitude/latitude degrees, clamped to the
/// unit square; the poles map to 0 and 1.
pub struct SphericalProjector;

impl Projection for SphericalProjector {
	fn project_x(&self, x: f64) -> f64 {
		x / 360.0 + 0.5
	}

	fn project_y(&self, y: f64) -> f64 {
		let sin = (y * std::f64::consts::PI / 180.0).sin();
		if sin >= 1.0 {
			return 0.0;
		}
		if sin <= -1.0 {
			return 1.0;
		}
		let y2 = 0.5 - 0.25 * ((1.0 + sin) / (1.0 - sin)).ln() / std::f64::consts::PI;
		y2.clamp(0.0, 1.0)
	}
}

/// Resolves the projector configured in `options`: an explicit choice wins,
/// otherwise Cartesian when bounds are present, Spherical when not.
pub fn projector_from_options(options: &TileOptions) -> Result<Box<dyn Projection>> {
	match (options.projector, &options.bounds) {
		(ProjectorChoice::Spherical, _) | (ProjectorChoice::Auto, None) => Ok(Box::new(SphericalProjector)),
		(ProjectorChoice::Cartesian | ProjectorChoice::Auto, Some(bounds)) => {
			Ok(Box::new(CartesianProjector::new(*bounds)?))
		}
		(ProjectorChoice::Cartesian, None) => {
			Err(TilesetError::InvalidConfig("the Cartesian projector requires bounds".to_string()).into())
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[test]
	fn test_cartesian() -> Result<()> {
		let projector = CartesianProjector::new(GeoBBox(0.0, 0.0, 200.0, 100.0))?;
		assert_eq!(projector.project_x(0.0), 0.0);
		assert_eq!(projector.project_x(50.0), 0.25);
		assert_eq!(projector.project_x(200.0), 1.0);
		assert_eq!(projector.project_y(25.0), 0.25);
		Ok(())
	}

	#[test]
	fn test_cartesian_rejects_degenerate_bounds() {
		assert!(CartesianProjector::new(GeoBBox(0.0, 0.0, 0.0, 1.0)).is_err());
	}

	#[rstest]
	#[case(-180.0, 0.0)]
	#[case(0.0, 0.5)]
	#[case(180.0, 1.0)]
	fn test_spherical_x(#[case] lon: f64, #[case] expected: f64) {
		assert_eq!(SphericalProjector.project_x(lon), expected);
	}

	#[test]
	fn test_spherical_y() {
		let projector = SphericalProjector;
		assert_eq!(projector.project_y(0.0), 0.5);
		// the poles map to the edges of the unit square
		assert_eq!(projector.project_y(90.0), 0.0);
		assert_eq!(projector.project_y(-90.0), 1.0);
		// monotonically decreasing in latitude
		assert!(projector.project_y(45.0) < projector.project_y(0.0));
	}

	#[test]
	fn test_from_options_auto() -> Result<()> {
		let spherical = projector_from_options(&TileOptions::default())?;
		assert_eq!(spherical.project_x(0.0), 0.5);

		let cartesian = projector_from_options(&TileOptions {
			bounds: Some(GeoBBox(0.0, 0.0, 10.0, 10.0)),
			..TileOptions::default()
		})?;
		assert_eq!(cartesian.project_x(5.0), 0.5);
		Ok(())
	}
}
