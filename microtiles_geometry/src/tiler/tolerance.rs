//! Zoom-to-tolerance strategies.
//!
//! Every curve is a pure function of `(z, options)` returning the *squared*
//! simplification tolerance in unit-square coordinates. The default shrinks
//! the tolerance by a factor of two per zoom level; the alternatives trade
//! detail against tile size differently.

use super::options::TileOptions;
use anyhow::Result;
use microtiles_core::TilesetError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ToleranceCurve {
	/// `(tolerance / ((1 << z) * extent))^2`
	#[default]
	Default,
	/// Like `Default` but without the square.
	Linear,
	/// Independent of zoom: `(tolerance / extent)^2`.
	Constant,
	/// Slower exponential decay with exponent 1.5.
	SlowExponential,
	/// `tolerance / (ln(z + 2) * extent)`.
	Logarithmic,
	/// Coarser below the index zoom, finer near the maximum zoom.
	Step,
}

const NAMED_CURVES: [(&str, ToleranceCurve); 6] = [
	("default", ToleranceCurve::Default),
	("linear", ToleranceCurve::Linear),
	("constant", ToleranceCurve::Constant),
	("slow_exponential", ToleranceCurve::SlowExponential),
	("logarithmic", ToleranceCurve::Logarithmic),
	("step", ToleranceCurve::Step),
];

impl ToleranceCurve {
	/// Looks up a curve by its registered name.
	pub fn from_name(name: &str) -> Result<ToleranceCurve> {
		NAMED_CURVES
			.iter()
			.find(|(key, _)| *key == name)
			.map(|(_, curve)| *curve)
			.ok_or_else(|| {
				let names: Vec<&str> = NAMED_CURVES.iter().map(|(key, _)| *key).collect();
				TilesetError::InvalidConfig(format!(
					"unknown tolerance function '{name}', available: {}",
					names.join(", ")
				))
				.into()
			})
	}

	/// Squared simplification tolerance for zoom `z`.
	#[must_use]
	pub fn squared_tolerance(&self, z: u8, options: &TileOptions) -> f64 {
		let tolerance = options.tolerance;
		let extent = f64::from(options.extent);
		let denominator = ((1u64 << z) as f64) * extent;
		if denominator == 0.0 || extent == 0.0 {
			return 1e-12;
		}

		match self {
			ToleranceCurve::Default => (tolerance / denominator).powi(2),
			ToleranceCurve::Linear => tolerance / denominator,
			ToleranceCurve::Constant => (tolerance / extent).powi(2),
			ToleranceCurve::SlowExponential => (tolerance / denominator).powf(1.5),
			ToleranceCurve::Logarithmic => tolerance / (f64::from(z + 2).ln() * extent),
			ToleranceCurve::Step => {
				let effective = if z < options.index_max_zoom.saturating_sub(1) {
					tolerance * 4.0
				} else if z < options.max_zoom.saturating_sub(1) {
					tolerance * 1.5
				} else {
					tolerance * 0.5
				};
				(effective / denominator).powi(2)
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[test]
	fn test_from_name() {
		assert_eq!(ToleranceCurve::from_name("default").unwrap(), ToleranceCurve::Default);
		assert_eq!(ToleranceCurve::from_name("step").unwrap(), ToleranceCurve::Step);
		assert!(ToleranceCurve::from_name("cubic").is_err());
	}

	#[test]
	fn test_default_curve() {
		let options = TileOptions::default();
		let expected = (50.0f64 / (2.0 * 4096.0)).powi(2);
		assert_eq!(ToleranceCurve::Default.squared_tolerance(1, &options), expected);
	}

	#[rstest]
	#[case(ToleranceCurve::Default)]
	#[case(ToleranceCurve::Linear)]
	#[case(ToleranceCurve::SlowExponential)]
	#[case(ToleranceCurve::Logarithmic)]
	#[case(ToleranceCurve::Step)]
	fn test_curves_shrink_with_zoom(#[case] curve: ToleranceCurve) {
		let options = TileOptions::default();
		let coarse = curve.squared_tolerance(0, &options);
		let fine = curve.squared_tolerance(8, &options);
		assert!(fine < coarse, "{curve:?} should decrease with zoom");
	}

	#[test]
	fn test_constant_curve_ignores_zoom() {
		let options = TileOptions::default();
		assert_eq!(
			ToleranceCurve::Constant.squared_tolerance(0, &options),
			ToleranceCurve::Constant.squared_tolerance(8, &options)
		);
	}
}
