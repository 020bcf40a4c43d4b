mod clip;
mod density;
mod reproject;
mod serialize;
mod validate;

pub use clip::{ClipLines, ClipResult};
pub use density::{round_report, ComputeDensity, DensityResult, FormattedDensity, REPORT_DIGITS};
pub use reproject::{Reproject, WebMercator};
pub use serialize::{parse_rings, serialize_ring, RingText, SerializeRings, DEFAULT_PRECISION};
pub use validate::ValidatePolygon;
