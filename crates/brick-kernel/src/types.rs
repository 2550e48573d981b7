use serde::{Deserialize, Serialize};

// Re-export shared types from brick-types
pub use brick_types::{Region, Sketch, SketchShape, TopoKind, TopoSignature, Workplane};

/// Opaque handle to a solid in the geometry kernel.
/// NEVER persisted. Valid only for the current kernel session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KernelSolidHandle(pub(crate) u64);

impl KernelSolidHandle {
    pub(crate) fn id(&self) -> u64 {
        self.0
    }
}

/// Transient kernel-internal entity identifier.
/// Stable within a single kernel session but NOT across rebuilds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KernelId(pub u64);

/// Which side of the original boundary a shell wall is grown on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShellSide {
    /// Keep the outer boundary and hollow towards the interior.
    Inward,
    /// Keep the original boundary as the inner wall and grow outwards.
    Outward,
}

/// Errors from kernel operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum KernelError {
    #[error("invalid profile: {reason}")]
    InvalidProfile { reason: String },

    #[error("boolean operation failed: {reason}")]
    BooleanFailed { reason: String },

    #[error("sweep failed: {reason}")]
    SweepFailed { reason: String },

    #[error("fillet failed: {reason}")]
    FilletFailed { reason: String },

    #[error("chamfer failed: {reason}")]
    ChamferFailed { reason: String },

    #[error("shell failed: {reason}")]
    ShellFailed { reason: String },

    #[error("entity not found: {id:?}")]
    EntityNotFound { id: KernelId },

    #[error("operation not supported: {operation}")]
    NotSupported { operation: String },

    #[error("kernel error: {message}")]
    Other { message: String },
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Aabb {
    /// Smallest box containing every point. `None` for an empty slice.
    pub fn from_points(points: &[[f64; 3]]) -> Option<Self> {
        let first = points.first()?;
        let mut bb = Aabb {
            min: *first,
            max: *first,
        };
        for p in &points[1..] {
            bb.include(*p);
        }
        Some(bb)
    }

    pub fn from_array(a: [f64; 6]) -> Self {
        Aabb {
            min: [a[0], a[1], a[2]],
            max: [a[3], a[4], a[5]],
        }
    }

    pub fn to_array(&self) -> [f64; 6] {
        [
            self.min[0],
            self.min[1],
            self.min[2],
            self.max[0],
            self.max[1],
            self.max[2],
        ]
    }

    pub fn include(&mut self, p: [f64; 3]) {
        for i in 0..3 {
            self.min[i] = self.min[i].min(p[i]);
            self.max[i] = self.max[i].max(p[i]);
        }
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        let mut out = *self;
        out.include(other.min);
        out.include(other.max);
        out
    }

    /// Overlap of two boxes; `None` when they are disjoint by more than `tol`.
    pub fn intersection(&self, other: &Aabb, tol: f64) -> Option<Aabb> {
        let mut out = *self;
        for i in 0..3 {
            out.min[i] = self.min[i].max(other.min[i]);
            out.max[i] = self.max[i].min(other.max[i]);
            if out.min[i] > out.max[i] + tol {
                return None;
            }
        }
        Some(out)
    }

    /// True when the boxes overlap or touch within `tol`.
    pub fn touches(&self, other: &Aabb, tol: f64) -> bool {
        self.intersection(other, tol).is_some()
    }

    pub fn contains_point(&self, p: [f64; 3], tol: f64) -> bool {
        (0..3).all(|i| p[i] >= self.min[i] - tol && p[i] <= self.max[i] + tol)
    }

    pub fn contains(&self, other: &Aabb, tol: f64) -> bool {
        self.contains_point(other.min, tol) && self.contains_point(other.max, tol)
    }

    /// Grow every side by `d`.
    pub fn expanded(&self, d: f64) -> Aabb {
        Aabb {
            min: [self.min[0] - d, self.min[1] - d, self.min[2] - d],
            max: [self.max[0] + d, self.max[1] + d, self.max[2] + d],
        }
    }

    pub fn size(&self) -> [f64; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    pub fn volume(&self) -> f64 {
        let s = self.size();
        s[0] * s[1] * s[2]
    }
}

// Custom Serialize/Deserialize for KernelId so it serializes as a bare integer.
impl Serialize for KernelId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for KernelId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u64::deserialize(deserializer).map(KernelId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_boxes_intersect_within_tolerance() {
        let a = Aabb::from_array([0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        let b = Aabb::from_array([1.0, 0.0, 0.0, 2.0, 1.0, 1.0]);
        let c = Aabb::from_array([1.5, 0.0, 0.0, 2.0, 1.0, 1.0]);
        assert!(a.touches(&b, 1e-9));
        assert!(!a.touches(&c, 1e-9));
        assert_eq!(a.union(&c).to_array(), [0.0, 0.0, 0.0, 2.0, 1.0, 1.0]);
    }

    #[test]
    fn from_points_of_empty_slice_is_none() {
        assert!(Aabb::from_points(&[]).is_none());
        let bb = Aabb::from_points(&[[1.0, 2.0, 3.0], [-1.0, 5.0, 0.0]]).unwrap();
        assert_eq!(bb.to_array(), [-1.0, 2.0, 0.0, 1.0, 5.0, 3.0]);
    }
}
