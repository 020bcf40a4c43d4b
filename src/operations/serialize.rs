use crate::error::{BackendError, Result, SeismodensError};
use crate::geometry::{Polygon, Ring, SpatialReference};
use crate::math::Point2;

/// Decimal digits per coordinate, enough for decimal degrees to survive
/// the text round trip.
pub const DEFAULT_PRECISION: usize = 15;

/// Polygon rings rendered as a coordinate list, tagged with their reference.
///
/// One ring renders as `(x1 y1, x2 y2, ..., xn yn)`, several as
/// `(ring1), (ring2)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RingText {
    pub text: String,
    pub spatial_reference: SpatialReference,
}

impl RingText {
    /// Parses rendered rings back into coordinates.
    ///
    /// # Errors
    ///
    /// - `BackendError::UnexpectedResult` if the parentheses or coordinate
    ///   pairs are malformed
    /// - `BackendError::MalformedNumericField` if a coordinate is not a number
    pub fn parse_rings(&self) -> Result<Vec<Ring>> {
        parse_rings(&self.text)
    }
}

/// Serializes the rings of a polygon for a remote analytic function.
///
/// Expects the polygon to be in the target reference already; reprojection
/// happens before this step.
pub struct SerializeRings<'a> {
    polygon: &'a Polygon,
    precision: usize,
}

impl<'a> SerializeRings<'a> {
    /// Creates a new `SerializeRings` operation with 15-digit precision.
    #[must_use]
    pub fn new(polygon: &'a Polygon) -> Self {
        Self {
            polygon,
            precision: DEFAULT_PRECISION,
        }
    }

    /// Sets the number of decimal digits per coordinate.
    #[must_use]
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Executes the serialization.
    #[must_use]
    pub fn execute(&self) -> RingText {
        let mut text = String::new();
        for (i, ring) in self.polygon.rings().iter().enumerate() {
            if i > 0 {
                text.push_str(", ");
            }
            text.push_str(&serialize_ring(ring, self.precision));
        }
        RingText {
            text,
            spatial_reference: self.polygon.spatial_reference(),
        }
    }
}

/// Renders one ring as `(x1 y1, x2 y2, ...)` with fixed decimal digits.
#[must_use]
pub fn serialize_ring(ring: &Ring, precision: usize) -> String {
    let mut out = String::with_capacity(ring.len() * (2 * precision + 12) + 2);
    out.push('(');
    for (i, p) in ring.points().iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&format!("{:.prec$} {:.prec$}", p.x, p.y, prec = precision));
    }
    out.push(')');
    out
}

/// Parses `(x y, x y, ...), (x y, ...)` into rings.
///
/// # Errors
///
/// See [`RingText::parse_rings`].
pub fn parse_rings(text: &str) -> Result<Vec<Ring>> {
    let mut rings = Vec::new();
    let mut rest = text.trim();
    while !rest.is_empty() {
        let body = rest
            .strip_prefix('(')
            .ok_or_else(|| malformed(rest))?;
        let close = body.find(')').ok_or_else(|| malformed(rest))?;
        rings.push(parse_ring_body(&body[..close])?);

        rest = body[close + 1..].trim_start();
        if let Some(next) = rest.strip_prefix(',') {
            rest = next.trim_start();
            if rest.is_empty() {
                return Err(malformed(text));
            }
        } else if !rest.is_empty() {
            return Err(malformed(rest));
        }
    }
    Ok(rings)
}

fn parse_ring_body(body: &str) -> Result<Ring> {
    let mut points = Vec::new();
    for pair in body.split(',') {
        let mut fields = pair.split_whitespace();
        let (Some(x), Some(y), None) = (fields.next(), fields.next(), fields.next()) else {
            return Err(malformed(pair));
        };
        let index = points.len() * 2;
        points.push(Point2::new(parse_number(index, x)?, parse_number(index + 1, y)?));
    }
    Ok(Ring::new(points))
}

fn parse_number(index: usize, field: &str) -> Result<f64> {
    field.parse::<f64>().map_err(|_| {
        SeismodensError::from(BackendError::MalformedNumericField {
            index,
            value: field.to_owned(),
        })
    })
}

fn malformed(fragment: &str) -> SeismodensError {
    BackendError::UnexpectedResult(format!("malformed ring text near {fragment:?}")).into()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ring() -> Ring {
        Ring::from_coords(&[(70.0, 70.0), (71.0, 72.0), (85.0, 65.0), (70.0, 70.0)])
    }

    #[test]
    fn single_ring_format() {
        let text = serialize_ring(&ring(), 1);
        assert_eq!(text, "(70.0 70.0, 71.0 72.0, 85.0 65.0, 70.0 70.0)");
    }

    #[test]
    fn default_precision_has_fifteen_digits() {
        let poly = Polygon::from_ring(ring(), SpatialReference::wgs84());
        let rendered = SerializeRings::new(&poly).execute();
        assert!(rendered.text.starts_with("(70.000000000000000 70.000000000000000, "));
        assert_eq!(rendered.spatial_reference.wkid(), 4326);
    }

    #[test]
    fn multiple_rings_are_comma_separated_groups() {
        let poly = Polygon::new(vec![ring(), ring()], SpatialReference::wgs84());
        let rendered = SerializeRings::new(&poly).with_precision(0).execute();
        assert_eq!(
            rendered.text,
            "(70 70, 71 72, 85 65, 70 70), (70 70, 71 72, 85 65, 70 70)"
        );
    }

    #[test]
    fn round_trip_within_tolerance() {
        let original = Ring::from_coords(&[
            (-97.063_26, 32.759),
            (-97.061_53, 32.749),
            (-97.062_98, 32.755_123_456_789),
            (-97.063_26, 32.759),
        ]);
        let poly = Polygon::from_ring(original.clone(), SpatialReference::wgs84());
        let parsed = SerializeRings::new(&poly).execute().parse_rings().unwrap();
        assert_eq!(parsed.len(), 1);
        for (a, b) in original.points().iter().zip(parsed[0].points()) {
            assert!((a.x - b.x).abs() < 1e-9);
            assert!((a.y - b.y).abs() < 1e-9);
        }
    }

    #[test]
    fn parse_two_rings() {
        let rings = parse_rings(" (0 0, 0 1, 1 1, 0 0) ,(5 5, 5 6, 6 6, 5 5)").unwrap();
        assert_eq!(rings.len(), 2);
        assert_eq!(rings[1].len(), 4);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            parse_rings("0 0, 1 1"),
            Err(SeismodensError::Backend(BackendError::UnexpectedResult(_)))
        ));
        assert!(matches!(
            parse_rings("(0 0, 1)"),
            Err(SeismodensError::Backend(BackendError::UnexpectedResult(_)))
        ));
        assert!(matches!(
            parse_rings("(0 0, 1 x)"),
            Err(SeismodensError::Backend(BackendError::MalformedNumericField { index: 3, .. }))
        ));
        assert!(matches!(
            parse_rings("(0 0, 1 1),"),
            Err(SeismodensError::Backend(BackendError::UnexpectedResult(_)))
        ));
    }
}
