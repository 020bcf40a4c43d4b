use crate::math::polygon_2d::{bounds, path_length};
use crate::math::Point2;

use super::SpatialReference;

/// An open polyline, one seismic survey profile or a piece of one.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    points: Vec<Point2>,
}

impl Polyline {
    #[must_use]
    pub fn new(points: Vec<Point2>) -> Self {
        Self { points }
    }

    /// Creates a polyline from `(x, y)` pairs.
    #[must_use]
    pub fn from_coords(coords: &[(f64, f64)]) -> Self {
        Self::new(coords.iter().map(|&(x, y)| Point2::new(x, y)).collect())
    }

    #[must_use]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// Length in native units.
    #[must_use]
    pub fn length(&self) -> f64 {
        path_length(&self.points)
    }

    #[must_use]
    pub fn bounds(&self) -> Option<(Point2, Point2)> {
        bounds(&self.points)
    }
}

/// Reference collection of seismic profiles in one spatial reference.
#[derive(Debug, Clone, PartialEq)]
pub struct LineDataset {
    lines: Vec<Polyline>,
    spatial_reference: SpatialReference,
}

impl LineDataset {
    #[must_use]
    pub fn new(lines: Vec<Polyline>, spatial_reference: SpatialReference) -> Self {
        Self {
            lines,
            spatial_reference,
        }
    }

    #[must_use]
    pub fn lines(&self) -> &[Polyline] {
        &self.lines
    }

    #[must_use]
    pub fn spatial_reference(&self) -> SpatialReference {
        self.spatial_reference
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polyline_length() {
        let line = Polyline::from_coords(&[(0.0, 0.0), (300.0, 400.0), (300.0, 500.0)]);
        assert!((line.length() - 600.0).abs() < 1e-9);
    }

    #[test]
    fn empty_polyline_has_zero_length() {
        assert!(Polyline::new(Vec::new()).length().abs() < 1e-12);
        assert!(Polyline::new(Vec::new()).bounds().is_none());
    }
}
