mod properties;
mod value;

pub use properties::GeoProperties;
pub use value::GeoValue;
