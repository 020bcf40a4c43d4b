use crate::math::polygon_2d::{bounds, signed_area_cw};
use crate::math::{Point2, TOLERANCE};

use super::SpatialReference;

/// Closed sequence of coordinates bounding a polygon region.
///
/// A well-formed ring repeats its first coordinate at the end. The type does
/// not enforce this; `ValidatePolygon` does.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    points: Vec<Point2>,
}

impl Ring {
    /// Creates a ring from its vertices.
    #[must_use]
    pub fn new(points: Vec<Point2>) -> Self {
        Self { points }
    }

    /// Creates a ring from `(x, y)` pairs.
    #[must_use]
    pub fn from_coords(coords: &[(f64, f64)]) -> Self {
        Self::new(coords.iter().map(|&(x, y)| Point2::new(x, y)).collect())
    }

    #[must_use]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns `true` if the first and last coordinates coincide.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) if self.points.len() > 1 => {
                (first - last).norm() < TOLERANCE
            }
            _ => false,
        }
    }

    /// Signed area, positive for clockwise winding.
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        signed_area_cw(&self.points)
    }

    /// Axis-aligned bounds of the ring.
    #[must_use]
    pub fn bounds(&self) -> Option<(Point2, Point2)> {
        bounds(&self.points)
    }
}

/// A polygon in a given spatial reference.
///
/// Only single-ring polygons are measured, but the type can carry more so
/// that the validator can reject them with a proper diagnosis.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    rings: Vec<Ring>,
    spatial_reference: SpatialReference,
}

impl Polygon {
    #[must_use]
    pub fn new(rings: Vec<Ring>, spatial_reference: SpatialReference) -> Self {
        Self {
            rings,
            spatial_reference,
        }
    }

    /// Creates a single-ring polygon.
    #[must_use]
    pub fn from_ring(ring: Ring, spatial_reference: SpatialReference) -> Self {
        Self::new(vec![ring], spatial_reference)
    }

    #[must_use]
    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    /// Number of rings (parts).
    #[must_use]
    pub fn part_count(&self) -> usize {
        self.rings.len()
    }

    #[must_use]
    pub fn exterior(&self) -> Option<&Ring> {
        self.rings.first()
    }

    #[must_use]
    pub fn spatial_reference(&self) -> SpatialReference {
        self.spatial_reference
    }

    /// Area in native units: sum of signed ring areas.
    ///
    /// Counter-clockwise rings subtract, matching how holes are encoded.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.rings.iter().map(Ring::signed_area).sum()
    }
}
