use serde::{Deserialize, Serialize};

/// The kind of topological entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TopoKind {
    Vertex,
    Edge,
    Face,
    Shell,
    Solid,
}

/// Geometric signature of a topological entity.
/// Used for selector evaluation and for comparing two solids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopoSignature {
    /// Surface or curve type (planar, cylindrical, line, circle, swept, ...).
    pub surface_type: Option<String>,
    /// Surface area (for faces).
    pub area: Option<f64>,
    /// Centroid position [x, y, z].
    pub centroid: Option<[f64; 3]>,
    /// Outward-pointing normal at centroid (for planar faces).
    pub normal: Option<[f64; 3]>,
    /// Unit tangent (for straight edges).
    pub direction: Option<[f64; 3]>,
    /// Axis-aligned bounding box [min_x, min_y, min_z, max_x, max_y, max_z].
    pub bbox: Option<[f64; 6]>,
    /// Edge length (for edges).
    pub length: Option<f64>,
}

impl TopoSignature {
    pub fn empty() -> Self {
        Self {
            surface_type: None,
            area: None,
            centroid: None,
            normal: None,
            direction: None,
            bbox: None,
            length: None,
        }
    }
}

/// World coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn unit(self) -> [f64; 3] {
        let mut v = [0.0; 3];
        v[self.index()] = 1.0;
        v
    }
}

/// Declarative face query, evaluated against a solid's face signatures.
///
/// `Min`/`Max` keep the faces whose centroid is extreme along the axis
/// among all faces of the solid. Combinators are built with `&`, `|`, `!`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "arg")]
pub enum FaceSelector {
    All,
    Min(Axis),
    Max(Axis),
    /// Planar faces whose normal is parallel (either sense) to the axis.
    NormalAlong(Axis),
    SurfaceType(String),
    And(Box<FaceSelector>, Box<FaceSelector>),
    Or(Box<FaceSelector>, Box<FaceSelector>),
    Not(Box<FaceSelector>),
}

/// Declarative edge query, evaluated against a solid's edge signatures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "arg")]
pub enum EdgeSelector {
    All,
    Min(Axis),
    Max(Axis),
    /// Straight edges running along the axis.
    ParallelTo(Axis),
    /// Edges bounding any face matched by the face selector.
    OfFaces(FaceSelector),
    And(Box<EdgeSelector>, Box<EdgeSelector>),
    Or(Box<EdgeSelector>, Box<EdgeSelector>),
    Not(Box<EdgeSelector>),
}

macro_rules! selector_ops {
    ($ty:ident) => {
        impl std::ops::BitAnd for $ty {
            type Output = $ty;
            fn bitand(self, rhs: $ty) -> $ty {
                $ty::And(Box::new(self), Box::new(rhs))
            }
        }

        impl std::ops::BitOr for $ty {
            type Output = $ty;
            fn bitor(self, rhs: $ty) -> $ty {
                $ty::Or(Box::new(self), Box::new(rhs))
            }
        }

        impl std::ops::Not for $ty {
            type Output = $ty;
            fn not(self) -> $ty {
                $ty::Not(Box::new(self))
            }
        }
    };
}

selector_ops!(FaceSelector);
selector_ops!(EdgeSelector);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operators_build_nested_selectors() {
        let sel = EdgeSelector::ParallelTo(Axis::Y)
            & EdgeSelector::Min(Axis::Z)
            & !(EdgeSelector::Min(Axis::X) | EdgeSelector::Max(Axis::X));
        match sel {
            EdgeSelector::And(lhs, rhs) => {
                assert!(matches!(*lhs, EdgeSelector::And(_, _)));
                assert!(matches!(*rhs, EdgeSelector::Not(_)));
            }
            other => panic!("expected And, got {:?}", other),
        }
    }

    #[test]
    fn axis_unit_vectors() {
        assert_eq!(Axis::X.unit(), [1.0, 0.0, 0.0]);
        assert_eq!(Axis::Z.unit(), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn selector_serde_shape() {
        let sel = FaceSelector::Max(Axis::Z);
        let json = serde_json::to_string(&sel).unwrap();
        assert_eq!(json, r#"{"type":"Max","arg":"Z"}"#);
    }
}
