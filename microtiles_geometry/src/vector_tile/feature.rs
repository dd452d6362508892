use super::geometry_type::GeomType;
use crate::math::area_ring;
use crate::tiler::{TileFeature, TileFeatureKind, TileGeometry, TileRing};
use anyhow::{Context, Result};
use microtiles_core::{
	Blob, TilesetError,
	io::{ValueWriter, ValueWriterBlob},
};

const CMD_MOVE_TO: u64 = 1;
const CMD_LINE_TO: u64 = 2;
const CMD_CLOSE_PATH: u64 = 7;

/// One encoded feature: an optional integer id, tag indices into the layer
/// dictionaries, and the ZigZag-varint geometry command stream.
#[derive(Clone, Debug, PartialEq)]
pub struct VectorTileFeature {
	pub id: Option<u64>,
	pub tag_ids: Vec<u32>,
	pub geom_type: GeomType,
	pub geom_data: Blob,
}

impl VectorTileFeature {
	/// Encodes the geometry of a transformed tile feature. Polygon rings
	/// are reoriented here: outer rings counter-clockwise (positive
	/// shoelace area), inner rings opposite; zero-area ties stay as-is.
	pub fn from_tile_feature(feature: &TileFeature, tag_ids: Vec<u32>) -> Result<VectorTileFeature> {
		let id = match &feature.id {
			Some(value) => Some(value.as_u64().map_err(|_| {
				TilesetError::EncoderFailure(format!("feature id {value:?} does not encode an integer"))
			})?),
			None => None,
		};

		let geom_data = match (&feature.kind, &feature.geometry) {
			(TileFeatureKind::Point, TileGeometry::Points(points)) => write_points(points)?,
			(TileFeatureKind::Line, TileGeometry::Rings(rings)) => write_lines(rings)?,
			(TileFeatureKind::Polygon, TileGeometry::Rings(rings)) => write_polygons(rings)?,
			_ => {
				return Err(
					TilesetError::EncoderFailure(format!("geometry does not match feature type {:?}", feature.kind)).into(),
				);
			}
		};

		Ok(VectorTileFeature {
			id,
			tag_ids,
			geom_type: GeomType::from(feature.kind),
			geom_data,
		})
	}

	pub fn to_blob(&self) -> Result<Blob> {
		let mut writer = ValueWriterBlob::new_le();

		if let Some(id) = self.id {
			writer
				.write_pbf_key(1, 0)
				.context("Failed to write PBF key for feature ID")?;
			writer.write_varint(id).context("Failed to write feature ID")?;
		}

		if !self.tag_ids.is_empty() {
			writer
				.write_pbf_key(2, 2)
				.context("Failed to write PBF key for tag IDs")?;
			writer
				.write_pbf_packed_uint32(&self.tag_ids)
				.context("Failed to write tag IDs")?;
		}

		writer
			.write_pbf_key(3, 0)
			.context("Failed to write PBF key for geometry type")?;
		writer
			.write_varint(self.geom_type.as_u64())
			.context("Failed to write geometry type")?;

		if !self.geom_data.is_empty() {
			writer
				.write_pbf_key(4, 2)
				.context("Failed to write PBF key for geometry data")?;
			writer
				.write_pbf_blob(&self.geom_data)
				.context("Failed to write geometry data")?;
		}

		Ok(writer.into_blob())
	}
}

fn write_point(writer: &mut ValueWriterBlob<byteorder::LittleEndian>, cursor: &mut (i64, i64), p: [f64; 2]) -> Result<()> {
	let x = p[0].round() as i64;
	let y = p[1].round() as i64;
	writer.write_svarint(x - cursor.0)?;
	writer.write_svarint(y - cursor.1)?;
	cursor.0 = x;
	cursor.1 = y;
	Ok(())
}

fn write_points(points: &[[f64; 2]]) -> Result<Blob> {
	let mut writer = ValueWriterBlob::new_le();
	let cursor = &mut (0i64, 0i64);

	writer.write_varint(((points.len() as u64) << 3) | CMD_MOVE_TO)?;
	for p in points {
		write_point(&mut writer, cursor, *p)?;
	}
	Ok(writer.into_blob())
}

fn write_lines(lines: &[TileRing]) -> Result<Blob> {
	let mut writer = ValueWriterBlob::new_le();
	let cursor = &mut (0i64, 0i64);

	for line in lines {
		if line.points.is_empty() {
			continue;
		}
		writer.write_varint((1 << 3) | CMD_MOVE_TO)?;
		write_point(&mut writer, cursor, line.points[0])?;
		let rest = &line.points[1..];
		if !rest.is_empty() {
			writer.write_varint(((rest.len() as u64) << 3) | CMD_LINE_TO)?;
			for p in rest {
				write_point(&mut writer, cursor, *p)?;
			}
		}
	}

	Ok(writer.into_blob())
}

fn write_polygons(rings: &[TileRing]) -> Result<Blob> {
	let mut writer = ValueWriterBlob::new_le();
	let cursor = &mut (0i64, 0i64);

	for ring in rings {
		if ring.points.len() < 4 {
			continue;
		}
		let mut points = rewound(&ring.points, ring.outer);

		// the wire format closes rings implicitly
		if points.first() == points.last() {
			points.pop();
		}

		writer.write_varint((1 << 3) | CMD_MOVE_TO)?;
		write_point(&mut writer, cursor, points[0])?;
		let rest = &points[1..];
		if !rest.is_empty() {
			writer.write_varint(((rest.len() as u64) << 3) | CMD_LINE_TO)?;
			for p in rest {
				write_point(&mut writer, cursor, *p)?;
			}
		}
		writer.write_varint(CMD_CLOSE_PATH)?;
	}

	Ok(writer.into_blob())
}

/// Reverses the ring when its winding does not match the expected
/// orientation for `outer`.
fn rewound(points: &[[f64; 2]], outer: bool) -> Vec<[f64; 2]> {
	let area = area_ring(points);
	if (outer && area < 0.0) || (!outer && area > 0.0) {
		points.iter().rev().copied().collect()
	} else {
		points.to_vec()
	}
}
