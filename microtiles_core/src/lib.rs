//! Shared primitives for the microtiles workspace: byte blobs, the
//! little-endian varint/PBF writer, tile coordinates, bounding boxes,
//! the error taxonomy and the TileJSON metadata model.

pub mod concurrency;
pub mod error;
pub mod io;
pub mod tilejson;
pub mod types;

pub use concurrency::CancellationToken;
pub use error::TilesetError;
pub use types::*;
