use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use crate::error::{BackendError, Result};
use crate::geometry::{LineDataset, Polygon, Polyline, Ring, SpatialReference};
use crate::math::Point2;

/// Semi-major axis of the Web Mercator sphere, meters.
const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude limit of the Web Mercator square, degrees.
const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Moves geometry between spatial references.
///
/// Implementors only provide the point transform; polygons and datasets are
/// mapped vertex by vertex.
pub trait Reproject {
    /// Transforms points from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::UnsupportedSpatialReference` if the pair of
    /// references is not supported.
    fn project_points(
        &self,
        points: &[Point2],
        from: SpatialReference,
        to: SpatialReference,
    ) -> Result<Vec<Point2>>;

    /// Reprojects every ring of a polygon into `to`.
    ///
    /// # Errors
    ///
    /// See [`Reproject::project_points`].
    fn reproject_polygon(&self, polygon: &Polygon, to: SpatialReference) -> Result<Polygon> {
        let from = polygon.spatial_reference();
        if from == to {
            return Ok(polygon.clone());
        }
        let rings = polygon
            .rings()
            .iter()
            .map(|ring| self.project_points(ring.points(), from, to).map(Ring::new))
            .collect::<Result<Vec<_>>>()?;
        Ok(Polygon::new(rings, to))
    }

    /// Reprojects every polyline of a dataset into `to`.
    ///
    /// # Errors
    ///
    /// See [`Reproject::project_points`].
    fn reproject_dataset(&self, dataset: &LineDataset, to: SpatialReference) -> Result<LineDataset> {
        let from = dataset.spatial_reference();
        if from == to {
            return Ok(dataset.clone());
        }
        let lines = dataset
            .lines()
            .iter()
            .map(|line| self.project_points(line.points(), from, to).map(Polyline::new))
            .collect::<Result<Vec<_>>>()?;
        Ok(LineDataset::new(lines, to))
    }
}

/// Spherical Web Mercator transforms between WGS84 (4326) and 3857/102100.
///
/// Equivalent references pass through unchanged; any other pair fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebMercator;

impl WebMercator {
    /// Geographic degrees to Web Mercator meters.
    #[must_use]
    pub fn forward(p: &Point2) -> Point2 {
        let lat = p.y.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        Point2::new(
            EARTH_RADIUS * p.x.to_radians(),
            EARTH_RADIUS * (FRAC_PI_4 + lat * 0.5).tan().ln(),
        )
    }

    /// Web Mercator meters to geographic degrees.
    #[must_use]
    pub fn inverse(p: &Point2) -> Point2 {
        let lon = (p.x / EARTH_RADIUS).to_degrees();
        let lat = (2.0 * (p.y / EARTH_RADIUS).exp().atan() - FRAC_PI_2).to_degrees();
        Point2::new(lon, lat)
    }
}

impl Reproject for WebMercator {
    fn project_points(
        &self,
        points: &[Point2],
        from: SpatialReference,
        to: SpatialReference,
    ) -> Result<Vec<Point2>> {
        if from == to {
            return Ok(points.to_vec());
        }
        let transform: fn(&Point2) -> Point2 = if from.is_wgs84() && to.is_web_mercator() {
            Self::forward
        } else if from.is_web_mercator() && to.is_wgs84() {
            Self::inverse
        } else {
            return Err(BackendError::UnsupportedSpatialReference {
                from: from.wkid(),
                to: to.wkid(),
            }
            .into());
        };
        Ok(points.iter().map(transform).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn forward_known_point() {
        let p = WebMercator::forward(&Point2::new(180.0, 0.0));
        assert_abs_diff_eq!(p.x, 20_037_508.342_789_244, epsilon = 1e-6);
        assert_abs_diff_eq!(p.y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn inverse_undoes_forward() {
        let geo = Point2::new(68.2, 66.5);
        let back = WebMercator::inverse(&WebMercator::forward(&geo));
        assert_abs_diff_eq!(back.x, geo.x, epsilon = 1e-9);
        assert_abs_diff_eq!(back.y, geo.y, epsilon = 1e-9);
    }

    #[test]
    fn alias_is_identity() {
        let ring = Ring::from_coords(&[(1.0, 2.0), (3.0, 4.0)]);
        let poly = Polygon::from_ring(ring, SpatialReference::new(102_100));
        let out = WebMercator
            .reproject_polygon(&poly, SpatialReference::new(3857))
            .unwrap();
        assert_eq!(out.rings()[0].points()[1], Point2::new(3.0, 4.0));
    }

    #[test]
    fn polygon_to_wgs84_keeps_winding() {
        let ring = Ring::from_coords(&[
            (7_592_337.478, 9_803_507.488),
            (7_924_991.425, 10_312_272.348),
            (8_277_213.251, 9_979_618.401),
            (7_592_337.478, 9_803_507.488),
        ]);
        let poly = Polygon::from_ring(ring, SpatialReference::new(102_100));
        let geo = WebMercator
            .reproject_polygon(&poly, SpatialReference::wgs84())
            .unwrap();
        assert_eq!(geo.spatial_reference().wkid(), 4326);
        assert!(geo.area() > 0.0);
        let first = geo.rings()[0].points()[0];
        assert!(first.x > 60.0 && first.x < 80.0);
        assert!(first.y > 60.0 && first.y < 70.0);
    }

    #[test]
    fn dataset_to_mercator() {
        let dataset = LineDataset::new(
            vec![Polyline::from_coords(&[(0.0, 0.0), (180.0, 0.0)])],
            SpatialReference::wgs84(),
        );
        let out = WebMercator
            .reproject_dataset(&dataset, SpatialReference::new(102_100))
            .unwrap();
        assert!(out.spatial_reference().is_web_mercator());
        assert_abs_diff_eq!(out.lines()[0].length(), 20_037_508.342_789_244, epsilon = 1e-6);
    }

    #[test]
    fn unsupported_pair_fails() {
        let err = WebMercator
            .project_points(
                &[Point2::new(0.0, 0.0)],
                SpatialReference::new(28_412),
                SpatialReference::wgs84(),
            )
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::BackendUnavailable);
    }
}
