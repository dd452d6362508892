//! Typed property values for features.
//!
//! [`GeoValue`] is the small sum type used for feature properties and ids.
//! It supports construction from primitive Rust types and from parsed JSON,
//! total ordering and hashing for use in encoder dictionaries, and parsing
//! from strings (so that a string id like `"42"` can still be encoded as an
//! integer feature id).

use anyhow::{Result, bail, ensure};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::{
	cmp::Ordering,
	fmt::{Debug, Display},
	hash::Hash,
};

#[derive(Clone, PartialEq)]
pub enum GeoValue {
	Bool(bool),
	Double(f64),
	Float(f32),
	Int(i64),
	Null,
	String(String),
	UInt(u64),
}

impl Debug for GeoValue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::String(v) => f.debug_tuple("String").field(v).finish(),
			Self::Float(v) => f.debug_tuple("Float").field(v).finish(),
			Self::Double(v) => f.debug_tuple("Double").field(v).finish(),
			Self::Int(v) => f.debug_tuple("Int").field(v).finish(),
			Self::UInt(v) => f.debug_tuple("UInt").field(v).finish(),
			Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
			Self::Null => f.debug_tuple("Null").finish(),
		}
	}
}

impl From<&str> for GeoValue {
	fn from(value: &str) -> Self {
		GeoValue::String(value.to_string())
	}
}

impl From<String> for GeoValue {
	fn from(value: String) -> Self {
		GeoValue::String(value)
	}
}

impl From<i32> for GeoValue {
	fn from(value: i32) -> Self {
		if value < 0 {
			GeoValue::Int(i64::from(value))
		} else {
			GeoValue::UInt(value as u64)
		}
	}
}

impl From<i64> for GeoValue {
	fn from(value: i64) -> Self {
		GeoValue::Int(value)
	}
}

impl From<u64> for GeoValue {
	fn from(value: u64) -> Self {
		GeoValue::UInt(value)
	}
}

impl From<usize> for GeoValue {
	fn from(value: usize) -> Self {
		GeoValue::UInt(value as u64)
	}
}

impl From<f32> for GeoValue {
	fn from(value: f32) -> Self {
		GeoValue::Float(value)
	}
}

impl From<f64> for GeoValue {
	fn from(value: f64) -> Self {
		GeoValue::Double(value)
	}
}

impl From<bool> for GeoValue {
	fn from(value: bool) -> Self {
		GeoValue::Bool(value)
	}
}

impl Eq for GeoValue {}

impl Hash for GeoValue {
	fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
		core::mem::discriminant(self).hash(state);
		match self {
			GeoValue::Bool(v) => v.hash(state),
			GeoValue::Double(v) => v.to_bits().hash(state),
			GeoValue::Float(v) => v.to_bits().hash(state),
			GeoValue::Int(v) => v.hash(state),
			GeoValue::Null => (),
			GeoValue::String(v) => v.hash(state),
			GeoValue::UInt(v) => v.hash(state),
		}
	}
}

impl PartialOrd for GeoValue {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

/// Total ordering used for deterministic output across mixed variants.
impl Ord for GeoValue {
	fn cmp(&self, other: &Self) -> Ordering {
		use GeoValue::{Bool, Double, Float, Int, String, UInt};
		match (self, other) {
			(String(a), String(b)) => a.cmp(b),
			(Float(a), Float(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
			(Double(a), Double(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
			(Int(a), Int(b)) => a.cmp(b),
			(UInt(a), UInt(b)) => a.cmp(b),
			(Bool(a), Bool(b)) => a.cmp(b),
			_ => self.variant_order().cmp(&other.variant_order()),
		}
	}
}

impl Display for GeoValue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"{}",
			match self {
				GeoValue::Bool(v) => v.to_string(),
				GeoValue::Double(v) => v.to_string(),
				GeoValue::Float(v) => v.to_string(),
				GeoValue::Int(v) => v.to_string(),
				GeoValue::Null => "null".to_string(),
				GeoValue::String(v) => v.to_string(),
				GeoValue::UInt(v) => v.to_string(),
			}
		)
	}
}

impl Serialize for GeoValue {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		match self {
			GeoValue::Bool(v) => serializer.serialize_bool(*v),
			GeoValue::Double(v) => serializer.serialize_f64(*v),
			GeoValue::Float(v) => serializer.serialize_f32(*v),
			GeoValue::Int(v) => serializer.serialize_i64(*v),
			GeoValue::Null => serializer.serialize_unit(),
			GeoValue::String(v) => serializer.serialize_str(v),
			GeoValue::UInt(v) => serializer.serialize_u64(*v),
		}
	}
}

impl GeoValue {
	fn variant_order(&self) -> u8 {
		match self {
			GeoValue::String(_) => 0,
			GeoValue::Float(_) => 1,
			GeoValue::Double(_) => 2,
			GeoValue::Int(_) => 3,
			GeoValue::UInt(_) => 4,
			GeoValue::Bool(_) => 5,
			GeoValue::Null => 6,
		}
	}

	/// Converts a parsed JSON scalar. Arrays and objects are carried opaquely
	/// as their JSON text.
	#[must_use]
	pub fn from_json(value: &serde_json::Value) -> Self {
		use serde_json::Value;
		match value {
			Value::Null => GeoValue::Null,
			Value::Bool(v) => GeoValue::Bool(*v),
			Value::Number(n) => {
				if let Some(u) = n.as_u64() {
					GeoValue::UInt(u)
				} else if let Some(i) = n.as_i64() {
					GeoValue::Int(i)
				} else {
					GeoValue::Double(n.as_f64().unwrap_or(f64::NAN))
				}
			}
			Value::String(s) => GeoValue::String(s.clone()),
			Value::Array(_) | Value::Object(_) => GeoValue::String(value.to_string()),
		}
	}

	/// Parses a string by detecting booleans, integers and floating-point
	/// numbers; falls back to `String`. Numbers with leading zeros (except
	/// `0` itself or `0.x`) stay strings.
	#[must_use]
	pub fn parse_str(value: &str) -> Self {
		lazy_static! {
			static ref REG_DOUBLE: Regex =
				Regex::new(r"^-?(?:0|[1-9]\d*)(?:(?:\.\d+)(?:[eE][+-]?\d+)?|[eE][+-]?\d+)$").unwrap();
			static ref REG_INT: Regex = Regex::new(r"^-(?:0|[1-9]\d*)$").unwrap();
			static ref REG_UINT: Regex = Regex::new(r"^(?:0|[1-9]\d*)$").unwrap();
		}

		match value {
			"" => GeoValue::String(String::new()),
			"true" => GeoValue::Bool(true),
			"false" => GeoValue::Bool(false),
			_ => {
				if REG_DOUBLE.is_match(value) {
					GeoValue::Double(value.parse::<f64>().unwrap())
				} else if REG_INT.is_match(value) {
					GeoValue::Int(value.parse::<i64>().unwrap())
				} else if REG_UINT.is_match(value) {
					GeoValue::UInt(value.parse::<u64>().unwrap())
				} else {
					GeoValue::String(value.to_string())
				}
			}
		}
	}

	/// Returns the value as `u64` if it is a non-negative integer or a
	/// string encoding one; otherwise returns an error.
	pub fn as_u64(&self) -> Result<u64> {
		match self {
			GeoValue::Int(v) => {
				ensure!(*v >= 0, "value {v} is negative");
				Ok(*v as u64)
			}
			GeoValue::UInt(v) => Ok(*v),
			GeoValue::String(s) => match GeoValue::parse_str(s) {
				GeoValue::UInt(v) => Ok(v),
				GeoValue::Int(v) if v >= 0 => Ok(v as u64),
				_ => bail!("string '{s}' does not encode an integer"),
			},
			_ => bail!("value {self:?} is not an integer"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[test]
	fn test_ord() {
		assert!(GeoValue::from("a") < GeoValue::from("b"));
		assert!(GeoValue::from(1) < GeoValue::from(2));
		assert!(GeoValue::from(-1) < GeoValue::from(0));
		assert!(GeoValue::from(false) < GeoValue::from(true));
		// cross-variant ordering is fixed by variant precedence
		assert!(GeoValue::from("a") < GeoValue::from(1.0f32));
		assert!(GeoValue::from(1u64) < GeoValue::from(false));
	}

	#[rstest]
	#[case(GeoValue::Bool(false), "false")]
	#[case(GeoValue::Bool(true), "true")]
	#[case(GeoValue::Double(-0.42), "-0.42")]
	#[case(GeoValue::Double(1.5e10), "1.5e10")]
	#[case(GeoValue::Int(-42), "-42")]
	#[case(GeoValue::UInt(0), "0")]
	#[case(GeoValue::UInt(42), "42")]
	#[case(GeoValue::String("042".to_string()), "042")]
	#[case(GeoValue::String("1.2.3".to_string()), "1.2.3")]
	#[case(GeoValue::String(String::new()), "")]
	fn test_parse_str(#[case] value: GeoValue, #[case] text: &str) {
		assert_eq!(GeoValue::parse_str(text), value);
	}

	#[test]
	fn test_as_u64() {
		assert_eq!(GeoValue::UInt(7).as_u64().unwrap(), 7);
		assert_eq!(GeoValue::Int(8).as_u64().unwrap(), 8);
		assert_eq!(GeoValue::from("42").as_u64().unwrap(), 42);
		assert!(GeoValue::Int(-1).as_u64().is_err());
		assert!(GeoValue::from("a7").as_u64().is_err());
		assert!(GeoValue::Bool(true).as_u64().is_err());
	}

	#[test]
	fn test_from_json() {
		use serde_json::json;
		assert_eq!(GeoValue::from_json(&json!(null)), GeoValue::Null);
		assert_eq!(GeoValue::from_json(&json!(true)), GeoValue::Bool(true));
		assert_eq!(GeoValue::from_json(&json!(42)), GeoValue::UInt(42));
		assert_eq!(GeoValue::from_json(&json!(-42)), GeoValue::Int(-42));
		assert_eq!(GeoValue::from_json(&json!(0.5)), GeoValue::Double(0.5));
		assert_eq!(GeoValue::from_json(&json!("x")), GeoValue::from("x"));
		assert_eq!(GeoValue::from_json(&json!([1, 2])), GeoValue::from("[1,2]"));
	}

	#[test]
	fn test_serialize() {
		assert_eq!(serde_json::to_string(&GeoValue::UInt(42)).unwrap(), "42");
		assert_eq!(serde_json::to_string(&GeoValue::from("x")).unwrap(), "\"x\"");
		assert_eq!(serde_json::to_string(&GeoValue::Null).unwrap(), "null");
	}
}
