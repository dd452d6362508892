//! Writing Mapbox Vector Tile (MVT) protobuf data from transformed tiles.

mod feature;
mod geometry_type;
mod layer;
mod property_manager;
mod tile;
mod value;

pub use feature::VectorTileFeature;
pub use geometry_type::GeomType;
pub use layer::VectorTileLayer;
pub use property_manager::PropertyManager;
pub use tile::VectorTile;
pub use value::GeoValuePBF;
