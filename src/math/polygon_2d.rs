use super::intersect_2d::{lerp, segment_segment_params};
use super::{Point2, TOLERANCE};

/// Computes the signed area of a ring (shoelace formula, clockwise-positive).
///
/// Follows the GIS convention for outer rings: positive for a clockwise
/// vertex sequence with Y pointing up, negative for counter-clockwise.
/// A self-intersecting ring whose lobes cancel out yields zero or a value
/// of arbitrary sign. The ring may or may not repeat its first vertex.
#[must_use]
pub fn signed_area_cw(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[j].x * points[i].y - points[i].x * points[j].y;
    }
    sum * 0.5
}

/// Length of an open polyline through `points`.
#[must_use]
pub fn path_length(points: &[Point2]) -> f64 {
    points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
}

/// Returns `true` if `p` lies on the segment `a`-`b` within [`TOLERANCE`].
#[must_use]
pub fn point_on_segment(p: &Point2, a: &Point2, b: &Point2) -> bool {
    let ab = b - a;
    let ap = p - a;
    let len_sq = ab.norm_squared();
    if len_sq < TOLERANCE * TOLERANCE {
        return ap.norm() < TOLERANCE;
    }
    let cross = ab.x * ap.y - ab.y * ap.x;
    if cross.abs() > TOLERANCE * len_sq.sqrt() {
        return false;
    }
    let t = ab.dot(&ap) / len_sq;
    (-TOLERANCE..=1.0 + TOLERANCE).contains(&t)
}

/// Tests whether a point lies inside a ring (non-zero winding rule).
///
/// Points on the boundary are reported as inside.
#[must_use]
pub fn point_in_ring(p: &Point2, ring: &[Point2]) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let n = ring.len();
    if (0..n).any(|i| point_on_segment(p, &ring[i], &ring[(i + 1) % n])) {
        return true;
    }
    winding_number(p, ring) != 0
}

/// Winding number of `p` with respect to `ring`.
fn winding_number(p: &Point2, ring: &[Point2]) -> i32 {
    let n = ring.len();
    let mut winding = 0i32;
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
        if a.y <= p.y {
            if b.y > p.y && cross > 0.0 {
                winding += 1;
            }
        } else if b.y <= p.y && cross < 0.0 {
            winding -= 1;
        }
    }
    winding
}

/// Clips the segment `start`-`end` against a ring.
///
/// Returns the inside sub-segments as `(t_start, t_end)` parameter pairs
/// along the segment, in increasing order. Contiguous inside intervals are
/// merged, so a segment lying completely inside yields `[(0.0, 1.0)]`.
#[must_use]
pub fn clip_segment_to_ring(start: &Point2, end: &Point2, ring: &[Point2]) -> Vec<(f64, f64)> {
    let n = ring.len();
    if n < 3 {
        return Vec::new();
    }

    // Parameters where the segment meets a ring edge, plus both endpoints
    let mut sample_ts = vec![0.0, 1.0];
    for i in 0..n {
        if let Some((t, _)) = segment_segment_params(start, end, &ring[i], &ring[(i + 1) % n]) {
            sample_ts.push(t);
        }
    }
    sample_ts.sort_by(f64::total_cmp);
    sample_ts.dedup_by(|a, b| (*a - *b).abs() < TOLERANCE);

    // Midpoint classification of each interval
    let mut result: Vec<(f64, f64)> = Vec::new();
    for win in sample_ts.windows(2) {
        let (t0, t1) = (win[0], win[1]);
        if t1 - t0 < TOLERANCE {
            continue;
        }
        let mid = lerp(start, end, (t0 + t1) * 0.5);
        if !point_in_ring(&mid, ring) {
            continue;
        }
        match result.last_mut() {
            Some(last) if (t0 - last.1).abs() < TOLERANCE => last.1 = t1,
            _ => result.push((t0, t1)),
        }
    }
    result
}

/// Axis-aligned bounds `(min, max)` of a point set, or `None` when empty.
#[must_use]
pub fn bounds(points: &[Point2]) -> Option<(Point2, Point2)> {
    let first = points.first()?;
    let mut min = *first;
    let mut max = *first;
    for p in &points[1..] {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    Some((min, max))
}
