//! Geometry handling for the microtiles workspace.
//!
//! It includes modules for:
//! - `geo`: typed property values and property bags.
//! - `math`: signed ring area (shoelace).
//! - `tiler`: the tiling pipeline from an input document to a tile index.
//! - `vector_tile`: writing Mapbox Vector Tile (MVT) protobuf data.

pub mod geo;
pub mod math;
pub mod tiler;
pub mod vector_tile;

pub use geo::*;
