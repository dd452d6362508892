//! Error taxonomy of the tiling pipeline.
//!
//! All fallible functions in this workspace return `anyhow::Result`; errors
//! that belong to one of the categories below are constructed as a
//! [`TilesetError`] first, so callers can `downcast_ref` and react per
//! category.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TilesetError {
	/// Malformed document: missing required fields, unknown geometry tag,
	/// or a structural schema violation. Fatal to the current document.
	#[error("invalid input: {0}")]
	InvalidInput(String),

	/// Contradictory or out-of-range options. Raised before any work is done.
	#[error("invalid configuration: {0}")]
	InvalidConfig(String),

	/// A ring collapsed below four vertices after simplification or
	/// clipping. Recovered locally by dropping the ring (or the whole
	/// polygon when it was the outer ring); surfaced only in logs.
	#[error("degenerate geometry: {0}")]
	GeometryDegenerate(String),

	/// A tile or the metadata sidecar could not be written.
	#[error("io failure at {}: {source}", path.display())]
	IoFailure {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// A tile could not be encoded, e.g. a feature id that does not encode
	/// an integer. Fatal for that tile only.
	#[error("encoder failure: {0}")]
	EncoderFailure(String),

	/// The caller cancelled the build via its [`crate::CancellationToken`].
	#[error("tile build cancelled")]
	Cancelled,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_display() {
		assert_eq!(
			TilesetError::InvalidConfig("promoteId and generateId cannot be used together".to_string()).to_string(),
			"invalid configuration: promoteId and generateId cannot be used together"
		);
		assert_eq!(TilesetError::Cancelled.to_string(), "tile build cancelled");
	}

	#[test]
	fn test_downcast_through_anyhow() {
		let error: anyhow::Error = TilesetError::EncoderFailure("feature id 'a7' is not an integer".to_string()).into();
		assert!(matches!(
			error.downcast_ref::<TilesetError>(),
			Some(TilesetError::EncoderFailure(_))
		));
	}
}
