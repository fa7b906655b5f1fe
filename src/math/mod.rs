pub mod aabb;
pub mod distance;
pub mod merge;
pub mod polyline;

pub use aabb::Aabb;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Computes the unit normal of a planar polygon using Newell's method.
///
/// Returns `None` when the polygon is degenerate (collinear or repeated points).
#[must_use]
pub fn newell_normal(points: &[Point3]) -> Option<Vector3> {
    let n = points.len();
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let curr = &points[i];
        let next = &points[(i + 1) % n];
        normal.x += (curr.y - next.y) * (curr.z + next.z);
        normal.y += (curr.z - next.z) * (curr.x + next.x);
        normal.z += (curr.x - next.x) * (curr.y + next.y);
    }
    let len = normal.norm();
    if len < TOLERANCE {
        return None;
    }
    Some(normal / len)
}

/// Returns the angle in radians between two vectors, in `[0, π]`.
///
/// Zero-length inputs yield `0.0`.
#[must_use]
pub fn angle_between(a: &Vector3, b: &Vector3) -> f64 {
    let denom = a.norm() * b.norm();
    if denom < TOLERANCE {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos()
}
