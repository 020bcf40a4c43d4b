use tracing::debug;

use crate::geometry::{Polyline, Ring};
use crate::math::intersect_2d::lerp;
use crate::math::polygon_2d::clip_segment_to_ring;
use crate::math::{Point2, TOLERANCE};

/// Polyline fragments that fall inside a clip ring.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClipResult {
    fragments: Vec<Polyline>,
}

impl ClipResult {
    #[must_use]
    pub fn fragments(&self) -> &[Polyline] {
        &self.fragments
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Sum of fragment lengths in native units.
    #[must_use]
    pub fn total_length(&self) -> f64 {
        self.fragments.iter().map(Polyline::length).sum()
    }
}

/// Intersects a set of polylines with a ring.
///
/// # Algorithm
///
/// 1. Skip polylines whose bounding box misses the ring's bounding box
/// 2. Split every segment at its crossings with the ring edges
/// 3. Keep the pieces whose midpoint lies inside (or on) the ring
/// 4. Chain pieces that continue across a vertex into one fragment
///
/// Both inputs must share one spatial reference.
pub struct ClipLines<'a> {
    ring: &'a Ring,
}

impl<'a> ClipLines<'a> {
    /// Creates a new `ClipLines` operation for the given clip ring.
    #[must_use]
    pub fn new(ring: &'a Ring) -> Self {
        Self { ring }
    }

    /// Executes the clip over `lines`.
    #[must_use]
    pub fn execute(&self, lines: &[Polyline]) -> ClipResult {
        let Some((ring_min, ring_max)) = self.ring.bounds() else {
            return ClipResult::default();
        };

        let mut fragments = Vec::new();
        let mut candidates = 0usize;
        for line in lines {
            let Some((min, max)) = line.bounds() else {
                continue;
            };
            if max.x < ring_min.x || min.x > ring_max.x || max.y < ring_min.y || min.y > ring_max.y {
                continue;
            }
            candidates += 1;
            self.clip_polyline(line, &mut fragments);
        }

        debug!(
            lines = lines.len(),
            candidates,
            fragments = fragments.len(),
            "clipped lines against ring"
        );
        ClipResult { fragments }
    }

    fn clip_polyline(&self, line: &Polyline, out: &mut Vec<Polyline>) {
        let ring = self.ring.points();
        let mut current: Vec<Point2> = Vec::new();

        for seg in line.points().windows(2) {
            let (a, b) = (&seg[0], &seg[1]);
            let spans = clip_segment_to_ring(a, b, ring);

            for &(t0, t1) in &spans {
                let start = lerp(a, b, t0);
                let continues = t0 < TOLERANCE
                    && current
                        .last()
                        .is_some_and(|last| (last - start).norm() < TOLERANCE);
                if !continues {
                    flush(&mut current, out);
                    current.push(start);
                }
                current.push(lerp(a, b, t1));
            }

            // A fragment only carries on into the next segment from t = 1.
            if !matches!(spans.last(), Some(&(_, t1)) if t1 > 1.0 - TOLERANCE) {
                flush(&mut current, out);
            }
        }
        flush(&mut current, out);
    }
}

fn flush(current: &mut Vec<Point2>, out: &mut Vec<Polyline>) {
    if current.len() >= 2 {
        out.push(Polyline::new(std::mem::take(current)));
    } else {
        current.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square() -> Ring {
        Ring::from_coords(&[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0), (0.0, 0.0)])
    }

    #[test]
    fn line_fully_inside_is_kept_whole() {
        let lines = vec![Polyline::from_coords(&[(1.0, 1.0), (4.0, 5.0), (9.0, 5.0)])];
        let result = ClipLines::new(&square()).execute(&lines);
        assert_eq!(result.fragments().len(), 1);
        assert_eq!(result.fragments()[0].points().len(), 3);
        assert_relative_eq!(result.total_length(), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn line_crossing_ring_is_cut() {
        let lines = vec![Polyline::from_coords(&[(-5.0, 5.0), (15.0, 5.0)])];
        let result = ClipLines::new(&square()).execute(&lines);
        assert_eq!(result.fragments().len(), 1);
        assert_relative_eq!(result.total_length(), 10.0, epsilon = 1e-9);
        let pts = result.fragments()[0].points();
        assert_relative_eq!(pts[0].x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(pts[1].x, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn line_leaving_and_reentering_gives_two_fragments() {
        let lines = vec![Polyline::from_coords(&[
            (2.0, 2.0),
            (2.0, 20.0),
            (8.0, 20.0),
            (8.0, 2.0),
        ])];
        let result = ClipLines::new(&square()).execute(&lines);
        assert_eq!(result.fragments().len(), 2);
        assert_relative_eq!(result.total_length(), 16.0, epsilon = 1e-9);
    }

    #[test]
    fn disjoint_lines_yield_empty_result() {
        let lines = vec![
            Polyline::from_coords(&[(20.0, 20.0), (30.0, 30.0)]),
            Polyline::from_coords(&[(-5.0, 11.0), (15.0, 11.0)]),
            Polyline::new(Vec::new()),
        ];
        let result = ClipLines::new(&square()).execute(&lines);
        assert!(result.is_empty());
        assert!(result.total_length().abs() < 1e-12);
    }

    #[test]
    fn diagonal_through_corner_region() {
        let lines = vec![Polyline::from_coords(&[(-5.0, 5.0), (5.0, 15.0)])];
        let result = ClipLines::new(&square()).execute(&lines);
        // Enters at (0, 10) corner only.
        assert!(result.total_length() < 1e-9);
    }

    #[test]
    fn many_profiles_sum_lengths() {
        let lines: Vec<Polyline> = (1..10)
            .map(|i| {
                let x = f64::from(i);
                Polyline::from_coords(&[(x, -100.0), (x, 100.0)])
            })
            .collect();
        let result = ClipLines::new(&square()).execute(&lines);
        assert_eq!(result.fragments().len(), 9);
        assert_relative_eq!(result.total_length(), 90.0, epsilon = 1e-9);
    }
}
