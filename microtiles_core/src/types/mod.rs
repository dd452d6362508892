mod blob;
mod geo_bbox;
mod tile_coord;

pub use blob::Blob;
pub use geo_bbox::GeoBBox;
pub use tile_coord::TileCoord;
