use crate::error::{GeometryError, Result};
use crate::math::{angle_between, Point3, Vector3, TOLERANCE};

/// The geometric surface carrying a face.
#[derive(Debug, Clone)]
pub enum FaceSurface {
    /// An infinite plane through `origin` with unit `normal`.
    Plane { origin: Point3, normal: Vector3 },
    /// An infinite circular cylinder around the axis through `origin`.
    ///
    /// The surface normal points away from the axis.
    Cylinder {
        origin: Point3,
        axis: Vector3,
        radius: f64,
    },
}

impl FaceSurface {
    /// Creates a plane from a point and a normal direction.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ZeroVector`] if the normal is zero-length.
    pub fn plane(origin: Point3, normal: Vector3) -> Result<Self> {
        let len = normal.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(Self::Plane {
            origin,
            normal: normal / len,
        })
    }

    /// Creates a cylinder from a point on its axis, the axis direction and a radius.
    ///
    /// # Errors
    ///
    /// Returns an error if the axis is zero-length or the radius is not positive.
    pub fn cylinder(origin: Point3, axis: Vector3, radius: f64) -> Result<Self> {
        let len = axis.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        if radius < TOLERANCE {
            return Err(
                GeometryError::Degenerate("cylinder radius must be positive".into()).into(),
            );
        }
        Ok(Self::Cylinder {
            origin,
            axis: axis / len,
            radius,
        })
    }

    /// Surface normal at the point of the surface closest to `point`.
    ///
    /// For a cylinder, a point on the axis has no defined normal; the zero
    /// vector is returned.
    #[must_use]
    pub fn normal_near(&self, point: &Point3) -> Vector3 {
        match self {
            Self::Plane { normal, .. } => *normal,
            Self::Cylinder { origin, axis, .. } => {
                let to_point = point - origin;
                let radial = to_point - axis * to_point.dot(axis);
                let len = radial.norm();
                if len < TOLERANCE {
                    Vector3::zeros()
                } else {
                    radial / len
                }
            }
        }
    }

    /// Returns `true` if both surfaces have the same curvature everywhere
    /// they could meet: two planes, or two coaxial cylinders of equal radius.
    #[must_use]
    pub fn curvature_matches(&self, other: &Self, tolerance: f64, angle_tolerance: f64) -> bool {
        match (self, other) {
            (Self::Plane { .. }, Self::Plane { .. }) => true,
            (
                Self::Cylinder {
                    origin: o1,
                    axis: a1,
                    radius: r1,
                },
                Self::Cylinder {
                    origin: o2,
                    axis: a2,
                    radius: r2,
                },
            ) => {
                let parallel = angle_between(a1, a2).min(angle_between(a1, &-a2)) <= angle_tolerance;
                let offset = o2 - o1;
                let off_axis = (offset - a1 * offset.dot(a1)).norm();
                parallel && off_axis <= tolerance && (r1 - r2).abs() <= tolerance
            }
            _ => false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn plane_normal_is_normalized() {
        let plane = FaceSurface::plane(p(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 5.0)).unwrap();
        let n = plane.normal_near(&p(3.0, 4.0, 0.0));
        assert!((n - Vector3::z()).norm() < 1e-12);
    }

    #[test]
    fn cylinder_normal_points_away_from_axis() {
        let cyl = FaceSurface::cylinder(p(0.0, 0.0, 0.0), Vector3::z(), 2.0).unwrap();
        let n = cyl.normal_near(&p(0.0, 2.0, 7.0));
        assert!((n - Vector3::y()).norm() < 1e-12);
    }

    #[test]
    fn zero_radius_cylinder_is_rejected() {
        assert!(FaceSurface::cylinder(p(0.0, 0.0, 0.0), Vector3::z(), 0.0).is_err());
    }

    #[test]
    fn curvature_match_rules() {
        let plane = FaceSurface::plane(p(0.0, 0.0, 0.0), Vector3::z()).unwrap();
        let cyl_a = FaceSurface::cylinder(p(0.0, 0.0, 0.0), Vector3::z(), 1.0).unwrap();
        let cyl_b = FaceSurface::cylinder(p(0.0, 0.0, 5.0), -Vector3::z(), 1.0).unwrap();
        let cyl_c = FaceSurface::cylinder(p(0.0, 0.0, 0.0), Vector3::z(), 2.0).unwrap();
        assert!(plane.curvature_matches(&plane, 1e-6, 1e-3));
        assert!(!plane.curvature_matches(&cyl_a, 1e-6, 1e-3));
        assert!(cyl_a.curvature_matches(&cyl_b, 1e-6, 1e-3));
        assert!(!cyl_a.curvature_matches(&cyl_c, 1e-6, 1e-3));
    }
}
