use tracing::debug;

use crate::error::{GeometryError, Result};
use crate::geometry::{Polygon, Ring};
use crate::math::intersect_2d::segment_segment_params;
use crate::math::TOLERANCE;

/// Checks that a polygon can be measured.
///
/// Accepts exactly one closed ring with finite coordinates, at least three
/// distinct vertices, positive clockwise area and no crossing edges. A
/// counter-clockwise ring and a self-intersecting ring are reported with the
/// same error, since a non-positive area cannot tell them apart.
pub struct ValidatePolygon<'a> {
    polygon: &'a Polygon,
}

impl<'a> ValidatePolygon<'a> {
    /// Creates a new `ValidatePolygon` check.
    #[must_use]
    pub fn new(polygon: &'a Polygon) -> Self {
        Self { polygon }
    }

    /// Executes the check, returning the single accepted ring.
    ///
    /// # Errors
    ///
    /// Returns a `GeometryError` describing the first violated precondition.
    pub fn execute(&self) -> Result<&'a Ring> {
        let rings = self.polygon.rings();
        let ring = match rings {
            [] => return Err(GeometryError::NoRing.into()),
            [ring] => ring,
            _ => return Err(GeometryError::MultipleRings(rings.len()).into()),
        };

        let points = ring.points();
        if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(GeometryError::NonFiniteCoordinate.into());
        }
        if points.len() < 4 {
            return Err(GeometryError::TooFewVertices(points.len()).into());
        }
        if !ring.is_closed() {
            return Err(GeometryError::NotClosed.into());
        }

        let area = ring.signed_area();
        debug!(
            parts = rings.len(),
            vertices = points.len(),
            area,
            "validating input polygon"
        );
        if area <= 0.0 || has_crossing_edges(ring) {
            return Err(GeometryError::NotSimpleClockwise { area }.into());
        }
        Ok(ring)
    }
}

/// Returns `true` if two non-adjacent edges of a closed ring cross or touch.
///
/// Repeated consecutive vertices are dropped first, so zero-length edges do
/// not make their neighbours look like touching edges.
fn has_crossing_edges(ring: &Ring) -> bool {
    let mut points = ring.points().to_vec();
    points.dedup_by(|a, b| (*a - *b).norm() < TOLERANCE);
    if points.len() < 4 {
        // Collapsed ring, the area check rejects it.
        return false;
    }
    // Last point repeats the first, so there are len - 1 edges.
    let edges = points.len() - 1;
    for i in 0..edges {
        let (a0, a1) = (&points[i], &points[i + 1]);
        for j in (i + 2)..edges {
            // The first and last edges share the closing vertex.
            if i == 0 && j == edges - 1 {
                continue;
            }
            let (b0, b1) = (&points[j], &points[j + 1]);
            if segment_segment_params(a0, a1, b0, b1).is_some() {
                return true;
            }
        }
    }
    false
}
