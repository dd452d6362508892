use anyhow::{Result, ensure};
use std::fmt::{self, Debug};

/// A bounding rectangle `[min_x, min_y, max_x, max_y]` in source coordinates.
#[derive(Clone, Copy, PartialEq)]
pub struct GeoBBox(pub f64, pub f64, pub f64, pub f64);

impl GeoBBox {
	#[must_use]
	pub fn new_empty() -> GeoBBox {
		GeoBBox(f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY)
	}

	pub fn include_point(&mut self, x: f64, y: f64) {
		self.0 = self.0.min(x);
		self.1 = self.1.min(y);
		self.2 = self.2.max(x);
		self.3 = self.3.max(y);
	}

	#[must_use]
	pub fn width(&self) -> f64 {
		self.2 - self.0
	}

	#[must_use]
	pub fn height(&self) -> f64 {
		self.3 - self.1
	}

	/// True once at least one point has been included and the rectangle has
	/// a positive extent in both dimensions.
	#[must_use]
	pub fn is_valid(&self) -> bool {
		self.0.is_finite() && self.2.is_finite() && self.width() > 0.0 && self.height() > 0.0
	}

	#[must_use]
	pub fn as_vec(&self) -> Vec<f64> {
		vec![self.0, self.1, self.2, self.3]
	}
}

impl TryFrom<&[f64]> for GeoBBox {
	type Error = anyhow::Error;

	fn try_from(value: &[f64]) -> Result<Self> {
		ensure!(value.len() >= 4, "bounds need at least 4 values, got {}", value.len());
		Ok(GeoBBox(value[0], value[1], value[2], value[3]))
	}
}

impl Debug for GeoBBox {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_fmt(format_args!("GeoBBox[{}, {}, {}, {}]", self.0, self.1, self.2, self.3))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_include_point() {
		let mut bbox = GeoBBox::new_empty();
		assert!(!bbox.is_valid());
		bbox.include_point(3.0, 7.0);
		bbox.include_point(-1.0, 2.0);
		assert_eq!(bbox.as_vec(), vec![-1.0, 2.0, 3.0, 7.0]);
		assert!(bbox.is_valid());
		assert_eq!(bbox.width(), 4.0);
		assert_eq!(bbox.height(), 5.0);
	}

	#[test]
	fn test_try_from() {
		assert!(GeoBBox::try_from([0.0, 0.0, 1.0].as_slice()).is_err());
		let bbox = GeoBBox::try_from([0.0, 0.0, 10.0, 20.0, 99.0].as_slice()).unwrap();
		assert_eq!(bbox, GeoBBox(0.0, 0.0, 10.0, 20.0));
	}
}
