use serde::Deserialize;
use tracing::debug;

use crate::error::{GeometryError, HostError, Result};
use crate::geometry::{LineDataset, Polygon, Polyline, Ring, SpatialReference};
use crate::math::Point2;

const POLYGON_TYPE: &str = "esriGeometryPolygon";
const POLYLINE_TYPE: &str = "esriGeometryPolyline";

/// Esri JSON feature set, as posted by the host.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeatureSetJson {
    geometry_type: Option<String>,
    spatial_reference: Option<SpatialReferenceJson>,
    #[serde(default)]
    features: Vec<FeatureJson>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpatialReferenceJson {
    wkid: Option<u32>,
    latest_wkid: Option<u32>,
}

impl SpatialReferenceJson {
    fn resolve(self) -> Option<SpatialReference> {
        self.wkid.or(self.latest_wkid).map(SpatialReference::new)
    }
}

#[derive(Debug, Deserialize)]
struct FeatureJson {
    geometry: Option<GeometryJson>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeometryJson {
    #[serde(default)]
    rings: Vec<Vec<Vec<f64>>>,
    #[serde(default)]
    paths: Vec<Vec<Vec<f64>>>,
    spatial_reference: Option<SpatialReferenceJson>,
}

impl FeatureSetJson {
    fn parse(text: &str, expected_type: &str) -> Result<Self> {
        let set: Self = serde_json::from_str(text).map_err(HostError::from)?;
        match set.geometry_type.as_deref() {
            Some(kind) if kind != expected_type => {
                Err(HostError::GeometryType(kind.to_owned()).into())
            }
            _ => Ok(set),
        }
    }

    /// Feature geometry reference wins over the set-level one.
    fn spatial_reference(&self, geometry: Option<&GeometryJson>) -> Result<SpatialReference> {
        geometry
            .and_then(|g| g.spatial_reference)
            .and_then(SpatialReferenceJson::resolve)
            .or_else(|| self.spatial_reference.and_then(SpatialReferenceJson::resolve))
            .ok_or_else(|| HostError::MissingSpatialReference.into())
    }
}

/// Parses the input polygon from an Esri JSON feature set.
///
/// Only the first feature is used; any further features are ignored.
///
/// # Errors
///
/// - `HostError` if the text is not a polygon feature set or lacks a
///   spatial reference
/// - `GeometryError::NoRing` if there is no feature or it has no geometry
pub fn parse_polygon_feature_set(text: &str) -> Result<Polygon> {
    let set = FeatureSetJson::parse(text, POLYGON_TYPE)?;
    if set.features.len() > 1 {
        debug!(
            ignored = set.features.len() - 1,
            "only the first polygon is processed"
        );
    }
    let geometry = set
        .features
        .first()
        .and_then(|feature| feature.geometry.as_ref())
        .ok_or(GeometryError::NoRing)?;

    let spatial_reference = set.spatial_reference(Some(geometry))?;
    let rings = geometry
        .rings
        .iter()
        .map(|ring| points(ring).map(Ring::new))
        .collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(rings, spatial_reference))
}

/// Parses a polyline feature set into a line dataset, one polyline per path.
///
/// # Errors
///
/// Returns `HostError` if the text is not a polyline feature set or lacks a
/// spatial reference.
pub fn parse_polyline_feature_set(text: &str) -> Result<LineDataset> {
    let set = FeatureSetJson::parse(text, POLYLINE_TYPE)?;
    let spatial_reference = set.spatial_reference(None)?;

    let mut lines = Vec::new();
    for geometry in set.features.iter().filter_map(|f| f.geometry.as_ref()) {
        for path in &geometry.paths {
            lines.push(Polyline::new(points(path)?));
        }
    }
    Ok(LineDataset::new(lines, spatial_reference))
}

/// Keeps x and y; z and m values are dropped.
fn points(coords: &[Vec<f64>]) -> Result<Vec<Point2>> {
    coords
        .iter()
        .map(|c| match c.as_slice() {
            [x, y, ..] => Ok(Point2::new(*x, *y)),
            _ => Err(HostError::Parse(serde::de::Error::custom(format!(
                "coordinate {c:?} needs at least x and y"
            )))
            .into()),
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, SeismodensError};

    const GOOD: &str = r#"{
        "geometryType": "esriGeometryPolygon",
        "spatialReference": {"wkid": 102100},
        "features": [{
            "geometry": {
                "spatialReference": {"wkid": 102100},
                "rings": [[[7592337.47835702, 9803507.48815798],
                           [7924991.42545401, 10312272.348424],
                           [8277213.25179201, 9979618.40132698],
                           [7592337.47835702, 9803507.48815798]]]
            },
            "attributes": {}
        }]
    }"#;

    #[test]
    fn parses_first_polygon() {
        let polygon = parse_polygon_feature_set(GOOD).unwrap();
        assert_eq!(polygon.part_count(), 1);
        assert_eq!(polygon.rings()[0].len(), 4);
        assert_eq!(polygon.spatial_reference(), SpatialReference::web_mercator());
    }

    #[test]
    fn extra_features_are_ignored() {
        let text = r#"{
            "spatialReference": {"wkid": 4326},
            "features": [
                {"geometry": {"rings": [[[0, 0], [0, 1], [1, 1], [0, 0]]]}},
                {"geometry": {"rings": [[[5, 5], [5, 6], [6, 6], [5, 5]]]}}
            ]
        }"#;
        let polygon = parse_polygon_feature_set(text).unwrap();
        assert_eq!(polygon.part_count(), 1);
        assert!((polygon.rings()[0].points()[1].y - 1.0).abs() < 1e-12);
        assert_eq!(polygon.spatial_reference().wkid(), 4326);
    }

    #[test]
    fn geometry_reference_wins() {
        let text = r#"{
            "spatialReference": {"wkid": 4326},
            "features": [{"geometry": {
                "spatialReference": {"latestWkid": 3857},
                "rings": [[[0, 0, 7], [0, 1, 7], [1, 1, 7], [0, 0, 7]]]
            }}]
        }"#;
        let polygon = parse_polygon_feature_set(text).unwrap();
        assert!(polygon.spatial_reference().is_web_mercator());
    }

    #[test]
    fn no_features_means_no_ring() {
        let text = r#"{"spatialReference": {"wkid": 4326}, "features": []}"#;
        let err = parse_polygon_feature_set(text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidGeometry);
    }

    #[test]
    fn empty_rings_survive_parsing() {
        // A counter-clockwise ring drawn in some clients arrives as zero parts.
        let text = r#"{"spatialReference": {"wkid": 4326},
            "features": [{"geometry": {"rings": []}}]}"#;
        let polygon = parse_polygon_feature_set(text).unwrap();
        assert_eq!(polygon.part_count(), 0);
    }

    #[test]
    fn wrong_type_and_bad_json_are_host_errors() {
        let err = parse_polygon_feature_set(r#"{"geometryType": "esriGeometryPoint"}"#).unwrap_err();
        assert!(matches!(err, SeismodensError::Host(HostError::GeometryType(_))));
        let err = parse_polygon_feature_set("{not json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::HostInput);
        let err = parse_polygon_feature_set(
            r#"{"features": [{"geometry": {"rings": [[[0, 0], [1, 1], [0, 0]]]}}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, SeismodensError::Host(HostError::MissingSpatialReference)));
        let err = parse_polygon_feature_set(
            r#"{"spatialReference": {"wkid": 4326},
                "features": [{"geometry": {"rings": [[[0], [1, 1], [0, 0]]]}}]}"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::HostInput);
    }

    #[test]
    fn polylines_one_per_path() {
        let text = r#"{
            "geometryType": "esriGeometryPolyline",
            "spatialReference": {"wkid": 28412},
            "features": [
                {"geometry": {"paths": [[[0, 0], [10, 0]], [[0, 5], [10, 5]]]}},
                {"geometry": null},
                {"geometry": {"paths": [[[1, 1], [2, 2], [3, 1]]]}}
            ]
        }"#;
        let dataset = parse_polyline_feature_set(text).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.spatial_reference().wkid(), 28_412);
        assert!((dataset.lines()[0].length() - 10.0).abs() < 1e-12);
    }
}
