use super::{Point3, TOLERANCE};

/// Returns the minimum distance from `point` to the segment `a`–`b`.
#[must_use]
pub fn point_to_segment(point: &Point3, a: &Point3, b: &Point3) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq < TOLERANCE * TOLERANCE {
        return (point - a).norm();
    }

    // Project onto the infinite line, clamp to [0, 1].
    let t = ((point - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (point - (a + ab * t)).norm()
}

/// Returns the minimum distance between segments `p0`–`p1` and `q0`–`q1`.
///
/// Degenerate (zero-length) segments are treated as points.
#[must_use]
pub fn segment_to_segment(p0: &Point3, p1: &Point3, q0: &Point3, q1: &Point3) -> f64 {
    let d1 = p1 - p0;
    let d2 = q1 - q0;
    let r = p0 - q0;
    let a = d1.norm_squared();
    let e = d2.norm_squared();
    let f = d2.dot(&r);
    let eps = TOLERANCE * TOLERANCE;

    if a < eps && e < eps {
        return r.norm();
    }
    if a < eps {
        return point_to_segment(p0, q0, q1);
    }
    if e < eps {
        return point_to_segment(q0, p0, p1);
    }

    let c = d1.dot(&r);
    let b = d1.dot(&d2);
    let denom = a * e - b * b;

    // Parallel segments have no unique closest pair; any s works before clamping t.
    let mut s = if denom > eps {
        ((b * f - c * e) / denom).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let mut t = (b * s + f) / e;

    if t < 0.0 {
        t = 0.0;
        s = (-c / a).clamp(0.0, 1.0);
    } else if t > 1.0 {
        t = 1.0;
        s = ((b - c) / a).clamp(0.0, 1.0);
    }

    let closest_p = p0 + d1 * s;
    let closest_q = q0 + d2 * t;
    (closest_p - closest_q).norm()
}

/// Returns the minimum distance between two polylines.
///
/// A single-point polyline is treated as a point. Empty polylines yield
/// `f64::INFINITY`.
#[must_use]
pub fn polyline_to_polyline(a: &[Point3], b: &[Point3]) -> f64 {
    let mut best = f64::INFINITY;
    for sa in segments(a) {
        for sb in segments(b) {
            best = best.min(segment_to_segment(sa.0, sa.1, sb.0, sb.1));
        }
    }
    best
}

/// Returns the minimum distance between the endpoints of two polylines.
#[must_use]
pub fn endpoint_gap(a: &[Point3], b: &[Point3]) -> f64 {
    let ends = |p: &[Point3]| -> Vec<Point3> {
        match (p.first(), p.last()) {
            (Some(first), Some(last)) => vec![*first, *last],
            _ => Vec::new(),
        }
    };
    let mut best = f64::INFINITY;
    for pa in ends(a) {
        for pb in ends(b) {
            best = best.min((pa - pb).norm());
        }
    }
    best
}

/// Iterates the segments of a polyline, yielding a degenerate segment for a
/// single point.
fn segments(points: &[Point3]) -> impl Iterator<Item = (&Point3, &Point3)> + '_ {
    let single = (points.len() == 1).then(|| (&points[0], &points[0]));
    single
        .into_iter()
        .chain(points.windows(2).map(|w| (&w[0], &w[1])))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn point_to_segment_interior_projection() {
        let d = point_to_segment(&p(5.0, 3.0, 0.0), &p(0.0, 0.0, 0.0), &p(10.0, 0.0, 0.0));
        assert_relative_eq!(d, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn point_to_segment_clamps_to_end() {
        let d = point_to_segment(&p(13.0, 4.0, 0.0), &p(0.0, 0.0, 0.0), &p(10.0, 0.0, 0.0));
        assert_relative_eq!(d, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn skew_segments_measure_common_perpendicular() {
        let d = segment_to_segment(
            &p(-1.0, 0.0, 0.0),
            &p(1.0, 0.0, 0.0),
            &p(0.0, -1.0, 2.0),
            &p(0.0, 1.0, 2.0),
        );
        assert_relative_eq!(d, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn parallel_offset_segments() {
        let d = segment_to_segment(
            &p(0.0, 0.0, 0.0),
            &p(1.0, 0.0, 0.0),
            &p(0.0, 0.05, 0.0),
            &p(1.0, 0.05, 0.0),
        );
        assert_relative_eq!(d, 0.05, epsilon = 1e-12);
    }

    #[test]
    fn interior_distance_beats_endpoint_gap() {
        // Crossing segments: endpoints are far apart, but the segments pass 0.01 apart.
        let a = [p(-1.0, 0.0, 0.0), p(1.0, 0.0, 0.0)];
        let b = [p(0.0, -1.0, 0.01), p(0.0, 1.0, 0.01)];
        assert_relative_eq!(polyline_to_polyline(&a, &b), 0.01, epsilon = 1e-12);
        assert!(endpoint_gap(&a, &b) > 1.0);
    }

    #[test]
    fn empty_polyline_is_infinitely_far() {
        assert!(polyline_to_polyline(&[], &[p(0.0, 0.0, 0.0)]).is_infinite());
    }
}
