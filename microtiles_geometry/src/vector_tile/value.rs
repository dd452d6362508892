use crate::geo::GeoValue;
use anyhow::{Context, Result};
use microtiles_core::{
	Blob,
	io::{ValueWriter, ValueWriterBlob},
};

/// Encoding of a [`GeoValue`] as an MVT `value` message.
pub trait GeoValuePBF {
	fn to_blob(&self) -> Result<Blob>;
}

impl GeoValuePBF for GeoValue {
	fn to_blob(&self) -> Result<Blob> {
		let mut writer = ValueWriterBlob::new_le();

		match self {
			GeoValue::String(s) => {
				writer
					.write_pbf_key(1, 2)
					.context("Failed to write PBF key for string value")?;
				writer.write_pbf_string(s).context("Failed to write string value")?;
			}
			GeoValue::Float(f) => {
				writer
					.write_pbf_key(2, 5)
					.context("Failed to write PBF key for float value")?;
				writer.write_f32(*f).context("Failed to write float value")?;
			}
			GeoValue::Double(f) => {
				writer
					.write_pbf_key(3, 1)
					.context("Failed to write PBF key for double value")?;
				writer.write_f64(*f).context("Failed to write double value")?;
			}
			GeoValue::UInt(u) => {
				writer
					.write_pbf_key(5, 0)
					.context("Failed to write PBF key for uint value")?;
				writer.write_varint(*u).context("Failed to write uint value")?;
			}
			GeoValue::Int(v) => {
				writer
					.write_pbf_key(6, 0)
					.context("Failed to write PBF key for int value")?;
				writer.write_svarint(*v).context("Failed to write int value")?;
			}
			GeoValue::Null => {
				// nulls are carried as a zero sint value
				writer
					.write_pbf_key(6, 0)
					.context("Failed to write PBF key for null value")?;
				writer.write_svarint(0).context("Failed to write null value")?;
			}
			GeoValue::Bool(b) => {
				writer
					.write_pbf_key(7, 0)
					.context("Failed to write PBF key for bool value")?;
				writer
					.write_varint(u64::from(*b))
					.context("Failed to write bool value")?;
			}
		}

		Ok(writer.into_blob())
	}
}
