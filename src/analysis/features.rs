use tracing::debug;

use crate::context::ToleranceContext;
use crate::error::{AnalysisError, Result};
use crate::provider::{ensure_supported, require_valid, AdjacencyProvider, LoopKind};

use super::boundary::BoundaryLoops;

/// Default minimum hole length, as a multiple of the absolute tolerance.
pub const MIN_HOLE_LENGTH_FACTOR: f64 = 10.0;

/// Where a reported loop came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopSource {
    /// A face trim loop.
    Trim(LoopKind),
    /// A chain of naked edges.
    Boundary { closed: bool },
}

/// A trim or boundary loop with its hole classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureLoop {
    /// Position of the loop in the report.
    pub index: usize,
    /// Where the loop came from.
    pub source: LoopSource,
    /// Total loop length.
    pub length: f64,
    /// Whether the loop counts as a hole.
    pub is_hole: bool,
}

/// Euler-characteristic features of a shape.
#[derive(Debug, Clone, PartialEq)]
pub struct TopologicalFeatures {
    /// Number of vertices (V).
    pub vertex_count: usize,
    /// Number of edges (E).
    pub edge_count: usize,
    /// Number of faces (F).
    pub face_count: usize,
    /// `V - E + F`.
    pub euler_characteristic: i64,
    /// 0 unless the shape is a manifold solid.
    pub genus: usize,
    /// Equal to `genus`.
    pub handle_count: usize,
    /// Closed, manifold and orientable.
    pub is_solid: bool,
    /// Trim loops first, then boundary loops.
    pub loops: Vec<FeatureLoop>,
}

/// Genus of a closed orientable surface from its cell counts.
///
/// # Errors
///
/// Returns [`AnalysisError::FeatureExtractionFailed`] if `E - V - F + 2` is
/// negative or odd.
pub fn genus_from_counts(vertices: usize, edges: usize, faces: usize) -> Result<usize> {
    let numerator = count(edges) - count(vertices) - count(faces) + 2;
    if numerator < 0 {
        return Err(AnalysisError::FeatureExtractionFailed {
            numerator,
            reason: "Euler numerator is negative".into(),
        }
        .into());
    }
    if numerator % 2 != 0 {
        return Err(AnalysisError::FeatureExtractionFailed {
            numerator,
            reason: "Euler numerator is odd".into(),
        }
        .into());
    }
    usize::try_from(numerator / 2).map_err(|_| {
        AnalysisError::FeatureExtractionFailed {
            numerator,
            reason: "genus does not fit in usize".into(),
        }
        .into()
    })
}

fn count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Computes genus, handle count and hole loops.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractFeatures {
    min_hole_length: Option<f64>,
}

impl ExtractFeatures {
    /// Creates a new `ExtractFeatures` query with the default hole threshold.
    #[must_use]
    pub fn new() -> Self {
        Self {
            min_hole_length: None,
        }
    }

    /// Sets the length below which a loop is not counted as a hole.
    #[must_use]
    pub fn with_min_hole_length(mut self, min_hole_length: f64) -> Self {
        self.min_hole_length = Some(min_hole_length);
        self
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::DiagnosisPreconditionFailed`] if the shape is
    /// not valid and [`AnalysisError::FeatureExtractionFailed`] if a manifold
    /// solid has an impossible Euler characteristic.
    pub fn execute<P: AdjacencyProvider>(
        &self,
        geometry: &P,
        ctx: &ToleranceContext,
    ) -> Result<TopologicalFeatures> {
        ensure_supported(geometry)?;
        require_valid(geometry, "feature extraction")?;

        let min_hole_length = self
            .min_hole_length
            .unwrap_or(ctx.absolute_tolerance() * MIN_HOLE_LENGTH_FACTOR);

        let mut loops: Vec<FeatureLoop> = geometry
            .trim_loops()
            .iter()
            .map(|trim| FeatureLoop {
                index: 0,
                source: LoopSource::Trim(trim.kind),
                length: trim.length,
                is_hole: trim.kind == LoopKind::Inner && trim.length >= min_hole_length,
            })
            .collect();
        let boundary = BoundaryLoops::new().execute(geometry, ctx)?;
        loops.extend(boundary.loops.iter().map(|l| FeatureLoop {
            index: 0,
            source: LoopSource::Boundary { closed: l.closed },
            length: l.length,
            is_hole: l.closed && l.length >= min_hole_length,
        }));
        for (index, l) in loops.iter_mut().enumerate() {
            l.index = index;
        }

        let (v, e, f) = (
            geometry.vertex_count(),
            geometry.edge_count(),
            geometry.face_count(),
        );
        let is_solid = geometry.is_solid();
        let genus = if is_solid && geometry.is_manifold() {
            genus_from_counts(v, e, f)?
        } else {
            0
        };

        debug!(v, e, f, genus, is_solid, loops = loops.len(), "extracted features");
        Ok(TopologicalFeatures {
            vertex_count: v,
            edge_count: e,
            face_count: f,
            euler_characteristic: count(v) - count(e) + count(f),
            genus,
            handle_count: genus,
            is_solid,
            loops,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::TAU;

    use super::*;
    use crate::brep::{MakeBox, ShellBuilder};
    use crate::error::TopoHealError;
    use crate::math::Point3;
    use crate::mesh::PolyMesh;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    /// A quad-mesh torus with `n` segments around both circles.
    fn torus(n: u32) -> PolyMesh {
        let (major, minor) = (2.0, 0.5);
        let mut vertices = Vec::new();
        for i in 0..n {
            let u = TAU * f64::from(i) / f64::from(n);
            for j in 0..n {
                let v = TAU * f64::from(j) / f64::from(n);
                let r = major + minor * v.cos();
                vertices.push(p(r * u.cos(), r * u.sin(), minor * v.sin()));
            }
        }
        let id = |i: u32, j: u32| (i % n) * n + (j % n);
        let faces = (0..n)
            .flat_map(|i| (0..n).map(move |j| vec![id(i, j), id(i + 1, j), id(i + 1, j + 1), id(i, j + 1)]))
            .collect();
        PolyMesh::new(vertices, faces).unwrap()
    }

    #[test]
    fn cube_has_genus_zero() {
        let shape = MakeBox::new(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0))
            .execute()
            .unwrap();
        let features = ExtractFeatures::new()
            .execute(&shape, &ToleranceContext::default())
            .unwrap();
        assert_eq!((features.vertex_count, features.edge_count, features.face_count), (8, 12, 6));
        assert_eq!(features.euler_characteristic, 2);
        assert_eq!(features.genus, 0);
        assert_eq!(features.handle_count, 0);
        assert!(features.is_solid);
        assert!(features.loops.iter().all(|l| !l.is_hole));
    }

    #[test]
    fn torus_has_one_handle() {
        let features = ExtractFeatures::new()
            .execute(&torus(6), &ToleranceContext::default())
            .unwrap();
        assert!(features.is_solid);
        assert_eq!(features.euler_characteristic, 0);
        assert_eq!(features.genus, 1);
        assert_eq!(features.handle_count, 1);
    }

    #[test]
    fn open_quad_reports_boundary_hole() {
        let mesh = PolyMesh::new(
            vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(0.0, 1.0, 0.0)],
            vec![vec![0, 1, 2, 3]],
        )
        .unwrap();
        let features = ExtractFeatures::new()
            .execute(&mesh, &ToleranceContext::default())
            .unwrap();
        assert!(!features.is_solid);
        assert_eq!(features.genus, 0);
        assert_eq!(features.loops.len(), 1);
        assert!(features.loops[0].is_hole);

        let strict = ExtractFeatures::new()
            .with_min_hole_length(10.0)
            .execute(&mesh, &ToleranceContext::default())
            .unwrap();
        assert!(!strict.loops[0].is_hole);
    }

    #[test]
    fn inner_trim_loop_is_a_hole() {
        let mut b = ShellBuilder::new(1e-9);
        b.add_planar_face_with_holes(
            &[p(0.0, 0.0, 0.0), p(4.0, 0.0, 0.0), p(4.0, 4.0, 0.0), p(0.0, 4.0, 0.0)],
            &[vec![p(1.0, 1.0, 0.0), p(1.0, 2.0, 0.0), p(2.0, 2.0, 0.0), p(2.0, 1.0, 0.0)]],
        )
        .unwrap();
        let shape = b.build().unwrap();
        let features = ExtractFeatures::new()
            .execute(&shape, &ToleranceContext::default())
            .unwrap();
        let trims: Vec<_> = features
            .loops
            .iter()
            .filter(|l| matches!(l.source, LoopSource::Trim(_)))
            .collect();
        assert_eq!(trims.len(), 2);
        assert!(!trims[0].is_hole);
        assert!(trims[1].is_hole);
    }

    #[test]
    fn odd_numerator_is_an_error() {
        let err = genus_from_counts(8, 13, 6).unwrap_err();
        assert!(matches!(
            err,
            TopoHealError::Analysis(AnalysisError::FeatureExtractionFailed { numerator: 1, .. })
        ));
        assert!(genus_from_counts(10, 12, 6).is_err());
        assert_eq!(genus_from_counts(16, 32, 16).unwrap(), 1);
    }

    #[test]
    fn invalid_shape_fails_precondition() {
        let mesh = PolyMesh::new(
            vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0)],
            vec![vec![0, 1, 2]],
        )
        .unwrap();
        let err = ExtractFeatures::new()
            .execute(&mesh, &ToleranceContext::default())
            .unwrap_err();
        assert!(matches!(
            err,
            TopoHealError::Analysis(AnalysisError::DiagnosisPreconditionFailed { .. })
        ));
    }
}
