use crate::geo::{GeoProperties, GeoValue};
use anyhow::{Context, Result, anyhow, ensure};
use std::{collections::HashMap, fmt::Debug, hash::Hash};

/// An append-only list with reverse lookup; entries keep the index of their
/// first occurrence.
#[derive(Clone, PartialEq)]
pub struct DictionaryMap<T>
where
	T: Clone + Eq + Hash,
{
	pub list: Vec<T>,
	map: HashMap<T, u32>,
}

impl<T> DictionaryMap<T>
where
	T: Clone + Debug + Eq + Hash,
{
	pub fn new() -> DictionaryMap<T> {
		DictionaryMap {
			list: Vec::new(),
			map: HashMap::new(),
		}
	}

	pub fn add(&mut self, entry: T) -> u32 {
		if let Some(index) = self.map.get(&entry) {
			return *index;
		}
		let index = self.list.len() as u32;
		self.map.insert(entry.clone(), index);
		self.list.push(entry);
		index
	}

	pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
		self.list.iter()
	}

	pub fn get(&self, id: u32) -> Result<&T> {
		self.list.get(id as usize).ok_or_else(|| anyhow!("id '{id:?}' not found"))
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.list.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.list.is_empty()
	}
}

impl<T: Clone + Debug + Eq + Hash> Default for DictionaryMap<T> {
	fn default() -> DictionaryMap<T> {
		DictionaryMap::new()
	}
}

impl<T> Debug for DictionaryMap<T>
where
	T: Clone + Debug + Eq + Hash,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_list().entries(&self.list).finish()
	}
}

/// The per-layer key and value dictionaries, filled in first-seen order
/// while features are added.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyManager {
	pub key: DictionaryMap<String>,
	pub val: DictionaryMap<GeoValue>,
}

impl PropertyManager {
	pub fn new() -> Self {
		Self {
			key: DictionaryMap::default(),
			val: DictionaryMap::default(),
		}
	}

	pub fn iter_key(&self) -> impl Iterator<Item = &String> + '_ {
		self.key.iter()
	}

	pub fn iter_val(&self) -> impl Iterator<Item = &GeoValue> + '_ {
		self.val.iter()
	}

	/// Interns the properties, returning the alternating key/value index
	/// list of one feature.
	pub fn encode_tag_ids(&mut self, properties: GeoProperties) -> Vec<u32> {
		let mut tag_ids: Vec<u32> = Vec::new();
		for (key, val) in properties {
			tag_ids.push(self.key.add(key));
			tag_ids.push(self.val.add(val));
		}
		tag_ids
	}

	pub fn decode_tag_ids(&self, tag_ids: &[u32]) -> Result<GeoProperties> {
		ensure!(tag_ids.len() % 2 == 0, "Tag IDs must be even");
		let mut properties = GeoProperties::new();
		for pair in tag_ids.chunks_exact(2) {
			properties.insert(
				self.key.get(pair[0]).context("Failed to get property key")?.clone(),
				self.val.get(pair[1]).context("Failed to get property value")?.clone(),
			);
		}
		Ok(properties)
	}
}
