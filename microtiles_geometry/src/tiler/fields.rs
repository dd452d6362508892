//! One-pass extraction of per-field type tags, numeric ranges and string
//! enums from converted features, used to enrich the TileJSON layer schema.

use super::feature::VtFeature;
use crate::geo::GeoValue;
use std::collections::{BTreeMap, BTreeSet};

/// Observed field statistics of a feature collection.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldStats {
	/// Field name to type tag (`String`, `Number`, `Boolean`).
	pub fields: BTreeMap<String, String>,
	/// Numeric fields to their observed `[min, max]`.
	pub ranges: BTreeMap<String, Vec<f64>>,
	/// String fields to their distinct observed values.
	pub enums: BTreeMap<String, Vec<String>>,
}

/// Walks all feature tags once, recording field types, numeric min/max
/// ranges, and distinct string values.
#[must_use]
pub fn extract_fields_ranges_enums(features: &[VtFeature]) -> FieldStats {
	let mut fields = BTreeMap::new();
	let mut ranges: BTreeMap<String, (f64, f64)> = BTreeMap::new();
	let mut enums: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

	for feature in features {
		for (key, value) in feature.tags.iter() {
			let type_tag = match value {
				GeoValue::Bool(_) => "Boolean",
				GeoValue::Double(_) | GeoValue::Float(_) | GeoValue::Int(_) | GeoValue::UInt(_) => "Number",
				GeoValue::String(_) => "String",
				GeoValue::Null => continue,
			};
			fields.entry(key.clone()).or_insert_with(|| type_tag.to_string());

			match value {
				GeoValue::Double(v) => include_number(&mut ranges, key, *v),
				GeoValue::Float(v) => include_number(&mut ranges, key, f64::from(*v)),
				GeoValue::Int(v) => include_number(&mut ranges, key, *v as f64),
				GeoValue::UInt(v) => include_number(&mut ranges, key, *v as f64),
				GeoValue::String(v) => {
					enums.entry(key.clone()).or_default().insert(v.clone());
				}
				_ => {}
			}
		}
	}

	FieldStats {
		fields,
		ranges: ranges
			.into_iter()
			.map(|(key, (min, max))| (key, vec![min, max]))
			.collect(),
		enums: enums
			.into_iter()
			.map(|(key, values)| (key, values.into_iter().collect()))
			.collect(),
	}
}

fn include_number(ranges: &mut BTreeMap<String, (f64, f64)>, key: &str, value: f64) {
	let entry = ranges.entry(key.to_string()).or_insert((value, value));
	entry.0 = entry.0.min(value);
	entry.1 = entry.1.max(value);
}
