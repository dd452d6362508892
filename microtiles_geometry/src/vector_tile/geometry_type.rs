use crate::tiler::TileFeatureKind;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum GeomType {
	#[default]
	Unknown = 0,
	Point = 1,
	LineString = 2,
	Polygon = 3,
}

impl GeomType {
	pub fn as_u64(&self) -> u64 {
		*self as u64
	}
}

impl From<TileFeatureKind> for GeomType {
	fn from(kind: TileFeatureKind) -> Self {
		match kind {
			TileFeatureKind::Point => GeomType::Point,
			TileFeatureKind::Line => GeomType::LineString,
			TileFeatureKind::Polygon => GeomType::Polygon,
		}
	}
}
