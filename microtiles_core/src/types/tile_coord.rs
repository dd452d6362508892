//! Tile coordinates `(z, x, y)` and their packed 64-bit index key.

use anyhow::{Result, ensure};
use std::fmt::{self, Debug};

#[derive(Eq, PartialEq, Clone, Hash, Copy)]
pub struct TileCoord {
	pub z: u8,
	pub x: u32,
	pub y: u32,
}

impl TileCoord {
	pub fn new(z: u8, x: u32, y: u32) -> Result<TileCoord> {
		ensure!(z <= 24, "zoom level ({z}) must be <= 24");
		Ok(TileCoord { z, x, y })
	}

	/// Same coordinate with `x` wrapped modulo `2^z`, so that queries across
	/// the antimeridian resolve to the canonical column.
	#[must_use]
	pub fn wrapped(z: u8, x: u32, y: u32) -> TileCoord {
		let z2 = 1u32 << z;
		TileCoord {
			z,
			x: (x % z2 + z2) % z2,
			y,
		}
	}

	/// Packed index key `((1 << z) * y + x) * 32 + z`, collision-free for
	/// zoom levels up to 24.
	#[must_use]
	pub fn to_id(&self) -> u64 {
		((1u64 << self.z) * u64::from(self.y) + u64::from(self.x)) * 32 + u64::from(self.z)
	}

	/// True if `self` lies on the ancestor path of `descendant`.
	#[must_use]
	pub fn is_ancestor_of(&self, descendant: &TileCoord) -> bool {
		if descendant.z <= self.z {
			return false;
		}
		let steps = descendant.z - self.z;
		self.x == descendant.x >> steps && self.y == descendant.y >> steps
	}

	#[must_use]
	pub fn is_valid(&self) -> bool {
		if self.z > 24 {
			return false;
		}
		let max = 2u32.pow(u32::from(self.z));
		self.x < max && self.y < max
	}
}

impl Debug for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_fmt(format_args!("TileCoord({}, [{}, {}])", &self.z, &self.x, &self.y))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[test]
	fn test_new_and_to_id() -> Result<()> {
		assert_eq!(TileCoord::new(0, 0, 0)?.to_id(), 0);
		assert_eq!(TileCoord::new(1, 0, 0)?.to_id(), 1);
		assert_eq!(TileCoord::new(1, 1, 1)?.to_id(), 3 * 32 + 1);
		assert!(TileCoord::new(25, 0, 0).is_err());
		Ok(())
	}

	#[test]
	fn test_ids_are_unique_per_level() -> Result<()> {
		let mut seen = std::collections::HashSet::new();
		for z in 0..=4u8 {
			for x in 0..(1u32 << z) {
				for y in 0..(1u32 << z) {
					assert!(seen.insert(TileCoord::new(z, x, y)?.to_id()));
				}
			}
		}
		Ok(())
	}

	#[rstest]
	#[case(2, 5, 1, 1, 1)]
	#[case(2, 4, 0, 0, 0)]
	#[case(3, 9, 2, 1, 2)]
	fn test_wrapped(#[case] z: u8, #[case] x: u32, #[case] y: u32, #[case] wx: u32, #[case] wy: u32) {
		let coord = TileCoord::wrapped(z, x, y);
		assert_eq!((coord.x, coord.y), (wx, wy));
	}

	#[test]
	fn test_is_ancestor_of() -> Result<()> {
		let root = TileCoord::new(0, 0, 0)?;
		let deep = TileCoord::new(6, 37, 22)?;
		assert!(root.is_ancestor_of(&deep));
		assert!(TileCoord::new(3, 4, 2)?.is_ancestor_of(&deep));
		assert!(!TileCoord::new(3, 5, 2)?.is_ancestor_of(&deep));
		assert!(!deep.is_ancestor_of(&deep));
		Ok(())
	}

	#[test]
	fn test_is_valid() -> Result<()> {
		assert!(TileCoord::new(2, 3, 3)?.is_valid());
		assert!(!TileCoord { z: 2, x: 4, y: 0 }.is_valid());
		Ok(())
	}
}
