use super::GeoValue;
use serde::Serialize;
use std::{
	collections::{BTreeMap, btree_map},
	fmt::Debug,
};

/// The property bag of a feature, ordered by key for deterministic output.
#[derive(Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GeoProperties {
	properties: BTreeMap<String, GeoValue>,
}

impl GeoProperties {
	pub fn new() -> GeoProperties {
		GeoProperties {
			properties: BTreeMap::new(),
		}
	}

	pub fn insert(&mut self, key: String, value: GeoValue) {
		self.properties.insert(key, value);
	}

	pub fn get(&self, key: &str) -> Option<&GeoValue> {
		self.properties.get(key)
	}

	pub fn iter(&self) -> btree_map::Iter<'_, String, GeoValue> {
		self.properties.iter()
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.properties.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.properties.is_empty()
	}
}

impl IntoIterator for GeoProperties {
	type Item = (String, GeoValue);
	type IntoIter = btree_map::IntoIter<String, GeoValue>;
	fn into_iter(self) -> Self::IntoIter {
		self.properties.into_iter()
	}
}

impl From<Vec<(&str, GeoValue)>> for GeoProperties {
	fn from(value: Vec<(&str, GeoValue)>) -> Self {
		GeoProperties {
			properties: value.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
		}
	}
}

impl FromIterator<(String, GeoValue)> for GeoProperties {
	fn from_iter<T: IntoIterator<Item = (String, GeoValue)>>(iter: T) -> Self {
		GeoProperties {
			properties: BTreeMap::from_iter(iter),
		}
	}
}

impl Debug for GeoProperties {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_map().entries(self.properties.iter()).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_insert_and_get() {
		let mut properties = GeoProperties::new();
		assert!(properties.is_empty());
		properties.insert("label".to_string(), GeoValue::from(7));
		assert_eq!(properties.get("label"), Some(&GeoValue::UInt(7)));
		assert_eq!(properties.len(), 1);
	}

	#[test]
	fn test_serialize_as_map() {
		let properties = GeoProperties::from(vec![("b", GeoValue::from(2)), ("a", GeoValue::from("x"))]);
		assert_eq!(serde_json::to_string(&properties).unwrap(), r#"{"a":"x","b":2}"#);
	}
}
