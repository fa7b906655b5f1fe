use crate::error::{GeometryError, Result};

/// Default absolute tolerance, in model units.
pub const DEFAULT_ABSOLUTE_TOLERANCE: f64 = 0.001;

/// Default angle tolerance: one degree, in radians.
pub const DEFAULT_ANGLE_TOLERANCE: f64 = std::f64::consts::PI / 180.0;

/// Upper bound of the near-miss band, as a multiple of the absolute tolerance.
pub const NEAR_MISS_FACTOR: f64 = 100.0;

/// Naked-edge count at or above which pairwise gap searches are skipped.
pub const MAX_PAIRWISE_NAKED_EDGES: usize = 100;

/// Tolerances supplied by the host application for every operation.
///
/// The context is read-only; operations never modify it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToleranceContext {
    absolute_tolerance: f64,
    angle_tolerance: f64,
}

impl ToleranceContext {
    /// Creates a context from an absolute tolerance and an angle tolerance in radians.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidTolerance`] if either value is not
    /// positive and finite.
    pub fn new(absolute_tolerance: f64, angle_tolerance: f64) -> Result<Self> {
        Ok(Self {
            absolute_tolerance: checked(absolute_tolerance)?,
            angle_tolerance: checked(angle_tolerance)?,
        })
    }

    /// Returns a copy with a different absolute tolerance.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidTolerance`] if the value is not
    /// positive and finite.
    pub fn with_absolute_tolerance(self, absolute_tolerance: f64) -> Result<Self> {
        Self::new(absolute_tolerance, self.angle_tolerance)
    }

    /// Returns a copy with a different angle tolerance (radians).
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidTolerance`] if the value is not
    /// positive and finite.
    pub fn with_angle_tolerance(self, angle_tolerance: f64) -> Result<Self> {
        Self::new(self.absolute_tolerance, angle_tolerance)
    }

    /// The distance below which two points are considered coincident.
    #[must_use]
    pub fn absolute_tolerance(&self) -> f64 {
        self.absolute_tolerance
    }

    /// The angle (radians) below which two directions are considered parallel.
    #[must_use]
    pub fn angle_tolerance(&self) -> f64 {
        self.angle_tolerance
    }

    /// Returns `true` if `distance` lies strictly inside the near-miss band
    /// `(tol, tol × NEAR_MISS_FACTOR)`.
    #[must_use]
    pub fn is_near_miss(&self, distance: f64) -> bool {
        distance > self.absolute_tolerance
            && distance < self.absolute_tolerance * NEAR_MISS_FACTOR
    }
}

impl Default for ToleranceContext {
    fn default() -> Self {
        Self {
            absolute_tolerance: DEFAULT_ABSOLUTE_TOLERANCE,
            angle_tolerance: DEFAULT_ANGLE_TOLERANCE,
        }
    }
}

fn checked(value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(GeometryError::InvalidTolerance(value).into())
    }
}
