pub mod line_dataset;
pub mod polygon;
pub mod spatial_reference;

pub use line_dataset::{LineDataset, Polyline};
pub use polygon::{Polygon, Ring};
pub use spatial_reference::{LinearUnit, SpatialReference};
