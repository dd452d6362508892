//! Tileset output for the microtiles workspace.
//!
//! [`TilesetWriter`] converts an input document into a `{z}/{x}/{y}`
//! directory tree of JSON or binary vector tiles plus a `metadata.json`
//! TileJSON sidecar.

mod validate;
mod writer;

pub use validate::validate_document;
pub use writer::{TileEncoding, TilesetWriter};
