//! The tiling pipeline: projection, conversion, per-zoom simplification,
//! quadtree splitting with buffered clipping, and the tile index with
//! on-demand drill-down.

pub mod clip;
pub mod convert;
pub mod feature;
pub mod fields;
mod index;
pub mod options;
pub mod projector;
pub mod simplify;
pub mod tile;
pub mod tolerance;
pub mod transform;

pub use clip::{Axis, clip};
pub use convert::{convert, convert_with_projector, get_bounds};
pub use feature::{VtFeature, VtFeatureKind, VtGeometry, VtSlice};
pub use fields::{FieldStats, extract_fields_ranges_enums};
pub use index::TileIndex;
pub use options::{ProjectorChoice, TileOptions};
pub use projector::{CartesianProjector, Projection, SphericalProjector, projector_from_options};
pub use simplify::simplify;
pub use tile::{Tile, TileFeature, TileFeatureKind, TileGeometry, TileRing};
pub use tolerance::ToleranceCurve;
pub use transform::transform_tile;
