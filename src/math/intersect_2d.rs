use super::{Point2, TOLERANCE};

/// Bounded segment-segment intersection in 2D.
///
/// Returns `(t, u)` where `t` is the parameter along `a0`-`a1` and `u` along
/// `b0`-`b1`, both clamped to `[0, 1]`. Parallel and collinear segments
/// yield `None`; collinear overlaps are handled by the caller's endpoint
/// classification.
#[must_use]
pub fn segment_segment_params(
    a0: &Point2,
    a1: &Point2,
    b0: &Point2,
    b1: &Point2,
) -> Option<(f64, f64)> {
    let da = a1 - a0;
    let db = b1 - b0;

    let cross = da.x * db.y - da.y * db.x;
    if cross.abs() < TOLERANCE {
        return None;
    }

    let d = b0 - a0;
    let t = (d.x * db.y - d.y * db.x) / cross;
    let u = (d.x * da.y - d.y * da.x) / cross;

    // Use a small epsilon to include endpoints.
    let eps = TOLERANCE;
    if t >= -eps && t <= 1.0 + eps && u >= -eps && u <= 1.0 + eps {
        Some((t.clamp(0.0, 1.0), u.clamp(0.0, 1.0)))
    } else {
        None
    }
}

/// Linear interpolation along `a`-`b`.
#[must_use]
pub fn lerp(a: &Point2, b: &Point2, t: f64) -> Point2 {
    a + (b - a) * t
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn crossing_segments() {
        let (t, u) = segment_segment_params(
            &Point2::new(0.0, 0.0),
            &Point2::new(10.0, 10.0),
            &Point2::new(0.0, 10.0),
            &Point2::new(10.0, 0.0),
        )
        .unwrap();
        assert!((t - 0.5).abs() < TOLERANCE);
        assert!((u - 0.5).abs() < TOLERANCE);
    }

    #[test]
    fn touching_at_endpoint() {
        let hit = segment_segment_params(
            &Point2::new(0.0, 0.0),
            &Point2::new(5.0, 0.0),
            &Point2::new(5.0, -1.0),
            &Point2::new(5.0, 1.0),
        );
        assert!(matches!(hit, Some((t, _)) if (t - 1.0).abs() < TOLERANCE));
    }

    #[test]
    fn disjoint_and_parallel() {
        assert!(segment_segment_params(
            &Point2::new(0.0, 0.0),
            &Point2::new(1.0, 0.0),
            &Point2::new(2.0, -1.0),
            &Point2::new(2.0, 1.0),
        )
        .is_none());
        assert!(segment_segment_params(
            &Point2::new(0.0, 0.0),
            &Point2::new(1.0, 0.0),
            &Point2::new(0.0, 1.0),
            &Point2::new(1.0, 1.0),
        )
        .is_none());
    }

    #[test]
    fn lerp_midpoint() {
        let m = lerp(&Point2::new(0.0, 0.0), &Point2::new(4.0, 2.0), 0.5);
        assert!((m.x - 2.0).abs() < TOLERANCE);
        assert!((m.y - 1.0).abs() < TOLERANCE);
    }
}
