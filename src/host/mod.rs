//! Boundary with the geoprocessing host: feature set parsing and the
//! per-invocation driver.

mod feature_set;
mod invocation;

pub use feature_set::{parse_polygon_feature_set, parse_polyline_feature_set};
pub use invocation::Invocation;
