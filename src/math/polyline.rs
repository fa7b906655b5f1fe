use super::Point3;

/// A chain of input polylines joined end to end.
#[derive(Debug, Clone)]
pub struct JoinedCurve {
    /// The joined points, in traversal order.
    pub points: Vec<Point3>,
    /// Whether the chain returns to its starting point.
    pub closed: bool,
    /// Indices of the input polylines that make up this chain, in join order.
    pub members: Vec<usize>,
}

impl JoinedCurve {
    /// Returns the total length of the joined polyline.
    #[must_use]
    pub fn length(&self) -> f64 {
        polyline_length(&self.points)
    }
}

/// Returns the length of a polyline.
#[must_use]
pub fn polyline_length(points: &[Point3]) -> f64 {
    points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
}

/// Joins polylines whose endpoints coincide within `tolerance`.
///
/// Chains are seeded from the lowest unused input index and grown greedily:
/// first at the tail, then at the head, always taking the lowest-index
/// candidate. A chain stops growing once it closes. The result is
/// deterministic for a given input order.
#[must_use]
pub fn join_polylines(curves: &[Vec<Point3>], tolerance: f64) -> Vec<JoinedCurve> {
    let mut used = vec![false; curves.len()];
    let mut joined = Vec::new();

    for seed in 0..curves.len() {
        if used[seed] || curves[seed].is_empty() {
            continue;
        }
        used[seed] = true;
        let mut points = curves[seed].clone();
        let mut members = vec![seed];

        while !is_closed(&points, tolerance) {
            if let Some(next) = attach(curves, &mut used, &points, tolerance, End::Tail) {
                members.push(next.index);
                points.extend(next.points.into_iter().skip(1));
            } else if let Some(prev) = attach(curves, &mut used, &points, tolerance, End::Head) {
                members.insert(0, prev.index);
                let mut head = prev.points;
                head.pop();
                head.extend(points);
                points = head;
            } else {
                break;
            }
        }

        let closed = is_closed(&points, tolerance);
        if closed {
            if let Some(first) = points.first().copied() {
                if let Some(last) = points.last_mut() {
                    *last = first;
                }
            }
        }
        joined.push(JoinedCurve {
            points,
            closed,
            members,
        });
    }

    joined
}

#[derive(Clone, Copy)]
enum End {
    Head,
    Tail,
}

struct Attachment {
    index: usize,
    points: Vec<Point3>,
}

/// Finds the lowest-index unused curve that continues `chain` at `end`.
///
/// The returned points are oriented so that, for `Tail`, they start at the
/// chain's last point and, for `Head`, they end at the chain's first point.
fn attach(
    curves: &[Vec<Point3>],
    used: &mut [bool],
    chain: &[Point3],
    tolerance: f64,
    end: End,
) -> Option<Attachment> {
    let anchor = match end {
        End::Tail => chain.last()?,
        End::Head => chain.first()?,
    };

    for (index, curve) in curves.iter().enumerate() {
        if used[index] {
            continue;
        }
        let (Some(first), Some(last)) = (curve.first(), curve.last()) else {
            continue;
        };
        let near_first = (first - anchor).norm() <= tolerance;
        let near_last = (last - anchor).norm() <= tolerance;

        let points = match (end, near_first, near_last) {
            (End::Tail, true, _) | (End::Head, _, true) => curve.clone(),
            (End::Tail, false, true) | (End::Head, true, false) => {
                curve.iter().rev().copied().collect()
            }
            _ => continue,
        };
        used[index] = true;
        return Some(Attachment { index, points });
    }
    None
}

/// A polyline is closed when it has at least three points and its ends meet.
fn is_closed(points: &[Point3], tolerance: f64) -> bool {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() > 2 => (first - last).norm() <= tolerance,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64) -> Point3 {
        Point3::new(x, y, 0.0)
    }

    #[test]
    fn square_sides_in_mixed_orientation_close() {
        let sides = vec![
            vec![p(0.0, 0.0), p(1.0, 0.0)],
            vec![p(1.0, 1.0), p(1.0, 0.0)],
            vec![p(0.0, 1.0), p(0.0, 0.0)],
            vec![p(1.0, 1.0), p(0.0, 1.0)],
        ];
        let joined = join_polylines(&sides, 1e-6);
        assert_eq!(joined.len(), 1);
        assert!(joined[0].closed);
        assert_eq!(joined[0].members.len(), 4);
        assert_relative_eq!(joined[0].length(), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn disjoint_segments_stay_separate() {
        let sides = vec![vec![p(0.0, 0.0), p(1.0, 0.0)], vec![p(5.0, 0.0), p(6.0, 0.0)]];
        let joined = join_polylines(&sides, 1e-6);
        assert_eq!(joined.len(), 2);
        assert!(joined.iter().all(|c| !c.closed));
    }

    #[test]
    fn head_extension_prepends() {
        let sides = vec![vec![p(1.0, 0.0), p(2.0, 0.0)], vec![p(0.0, 0.0), p(1.0, 0.0)]];
        let joined = join_polylines(&sides, 1e-6);
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].members, vec![1, 0]);
        assert_eq!(joined[0].points.first().copied(), Some(p(0.0, 0.0)));
    }

    #[test]
    fn gap_wider_than_tolerance_is_not_bridged() {
        let sides = vec![vec![p(0.0, 0.0), p(1.0, 0.0)], vec![p(1.1, 0.0), p(2.0, 0.0)]];
        assert_eq!(join_polylines(&sides, 0.01).len(), 2);
        assert_eq!(join_polylines(&sides, 0.2).len(), 1);
    }
}
