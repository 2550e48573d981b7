//! Selector evaluation against a solid's signatures.
//!
//! Every selector resolves to a subset of one solid's faces or edges.
//! `Min`/`Max` compare centroids over all candidates of the solid, so the
//! result depends only on geometry, never on kernel id order.

use std::collections::BTreeSet;

use brick_kernel::{KernelId, KernelIntrospect, KernelSolidHandle};
use brick_types::{Axis, EdgeSelector, FaceSelector, TopoKind, TopoSignature};

/// Absolute tolerance for extreme-position and direction tests.
const TOL: f64 = 1e-6;

struct Candidates {
    ids: Vec<KernelId>,
    sigs: Vec<TopoSignature>,
}

impl Candidates {
    fn collect(introspect: &dyn KernelIntrospect, solid: &KernelSolidHandle, kind: TopoKind) -> Self {
        let (ids, sigs) = introspect
            .compute_all_signatures(solid, kind)
            .into_iter()
            .unzip();
        Self { ids, sigs }
    }

    fn all(&self) -> BTreeSet<KernelId> {
        self.ids.iter().copied().collect()
    }

    fn matching(&self, pred: impl Fn(&TopoSignature) -> bool) -> BTreeSet<KernelId> {
        self.ids
            .iter()
            .zip(&self.sigs)
            .filter(|(_, sig)| pred(sig))
            .map(|(id, _)| *id)
            .collect()
    }

    fn extreme(&self, axis: Axis, max: bool) -> BTreeSet<KernelId> {
        let i = axis.index();
        let values = self.sigs.iter().filter_map(|s| s.centroid.map(|c| c[i]));
        let target = if max {
            values.fold(f64::NEG_INFINITY, f64::max)
        } else {
            values.fold(f64::INFINITY, f64::min)
        };
        if !target.is_finite() {
            return BTreeSet::new();
        }
        let tol = TOL * (1.0 + target.abs());
        self.matching(|s| s.centroid.is_some_and(|c| (c[i] - target).abs() <= tol))
    }

    /// Ids in kernel listing order.
    fn ordered(&self, set: &BTreeSet<KernelId>) -> Vec<KernelId> {
        self.ids.iter().copied().filter(|id| set.contains(id)).collect()
    }
}

fn aligned(v: Option<[f64; 3]>, axis: Axis) -> bool {
    v.is_some_and(|v| (v[axis.index()].abs() - 1.0).abs() <= TOL)
}

fn eval_faces(faces: &Candidates, sel: &FaceSelector) -> BTreeSet<KernelId> {
    match sel {
        FaceSelector::All => faces.all(),
        FaceSelector::Min(axis) => faces.extreme(*axis, false),
        FaceSelector::Max(axis) => faces.extreme(*axis, true),
        FaceSelector::NormalAlong(axis) => faces.matching(|s| aligned(s.normal, *axis)),
        FaceSelector::SurfaceType(name) => {
            faces.matching(|s| s.surface_type.as_deref() == Some(name.as_str()))
        }
        FaceSelector::And(a, b) => &eval_faces(faces, a) & &eval_faces(faces, b),
        FaceSelector::Or(a, b) => &eval_faces(faces, a) | &eval_faces(faces, b),
        FaceSelector::Not(a) => &faces.all() - &eval_faces(faces, a),
    }
}

fn eval_edges(
    introspect: &dyn KernelIntrospect,
    faces: &Candidates,
    edges: &Candidates,
    sel: &EdgeSelector,
) -> BTreeSet<KernelId> {
    match sel {
        EdgeSelector::All => edges.all(),
        EdgeSelector::Min(axis) => edges.extreme(*axis, false),
        EdgeSelector::Max(axis) => edges.extreme(*axis, true),
        EdgeSelector::ParallelTo(axis) => edges.matching(|s| aligned(s.direction, *axis)),
        EdgeSelector::OfFaces(face_sel) => {
            let own = edges.all();
            eval_faces(faces, face_sel)
                .into_iter()
                .flat_map(|f| introspect.face_edges(f))
                .filter(|e| own.contains(e))
                .collect()
        }
        EdgeSelector::And(a, b) => {
            &eval_edges(introspect, faces, edges, a) & &eval_edges(introspect, faces, edges, b)
        }
        EdgeSelector::Or(a, b) => {
            &eval_edges(introspect, faces, edges, a) | &eval_edges(introspect, faces, edges, b)
        }
        EdgeSelector::Not(a) => &edges.all() - &eval_edges(introspect, faces, edges, a),
    }
}

/// Faces of `solid` matched by `sel`, in kernel listing order.
pub fn select_faces(
    introspect: &dyn KernelIntrospect,
    solid: &KernelSolidHandle,
    sel: &FaceSelector,
) -> Vec<KernelId> {
    let faces = Candidates::collect(introspect, solid, TopoKind::Face);
    let set = eval_faces(&faces, sel);
    faces.ordered(&set)
}

/// Edges of `solid` matched by `sel`, in kernel listing order.
pub fn select_edges(
    introspect: &dyn KernelIntrospect,
    solid: &KernelSolidHandle,
    sel: &EdgeSelector,
) -> Vec<KernelId> {
    let faces = Candidates::collect(introspect, solid, TopoKind::Face);
    let edges = Candidates::collect(introspect, solid, TopoKind::Edge);
    let set = eval_edges(introspect, &faces, &edges, sel);
    edges.ordered(&set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use brick_kernel::{Kernel, MockKernel, Sketch, Workplane};
    use brick_types::SketchMode;

    fn block(kernel: &mut MockKernel) -> KernelSolidHandle {
        let sketch = Sketch::new().rect(4.0, 2.0, SketchMode::Add);
        let face = kernel.make_faces(&sketch, &Workplane::xy()).unwrap()[0];
        kernel.extrude_face(face, [0.0, 0.0, 1.0], 3.0).unwrap()
    }

    #[test]
    fn max_z_face_is_the_top() {
        let mut kernel = MockKernel::new();
        let solid = block(&mut kernel);
        let top = select_faces(&kernel, &solid, &FaceSelector::Max(Axis::Z));
        assert_eq!(top.len(), 1);
        let sig = kernel.compute_signature(top[0], TopoKind::Face);
        assert_eq!(sig.normal, Some([0.0, 0.0, 1.0]));
    }

    #[test]
    fn normal_along_matches_both_senses() {
        let mut kernel = MockKernel::new();
        let solid = block(&mut kernel);
        let caps = select_faces(&kernel, &solid, &FaceSelector::NormalAlong(Axis::Z));
        assert_eq!(caps.len(), 2);
    }

    #[test]
    fn not_is_complement_within_solid() {
        let mut kernel = MockKernel::new();
        let solid = block(&mut kernel);
        let sides = select_faces(&kernel, &solid, &!FaceSelector::NormalAlong(Axis::Z));
        assert_eq!(sides.len(), 4);
    }

    #[test]
    fn vertical_edges_of_a_block() {
        let mut kernel = MockKernel::new();
        let solid = block(&mut kernel);
        let vertical = select_edges(&kernel, &solid, &EdgeSelector::ParallelTo(Axis::Z));
        assert_eq!(vertical.len(), 4);
    }

    #[test]
    fn edges_of_top_face() {
        let mut kernel = MockKernel::new();
        let solid = block(&mut kernel);
        let sel = EdgeSelector::OfFaces(FaceSelector::Max(Axis::Z));
        let edges = select_edges(&kernel, &solid, &sel);
        assert_eq!(edges.len(), 4);
        for e in edges {
            let sig = kernel.compute_signature(e, TopoKind::Edge);
            assert!((sig.centroid.unwrap()[2] - 3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn bottom_edges_along_y_excluding_x_extremes_is_empty_on_a_block() {
        let mut kernel = MockKernel::new();
        let solid = block(&mut kernel);
        let sel = EdgeSelector::ParallelTo(Axis::Y)
            & EdgeSelector::Min(Axis::Z)
            & !(EdgeSelector::Min(Axis::X) | EdgeSelector::Max(Axis::X));
        assert!(select_edges(&kernel, &solid, &sel).is_empty());
    }

    #[test]
    fn missing_solid_selects_nothing() {
        let kernel = MockKernel::new();
        let mut other = MockKernel::new();
        let foreign = block(&mut other);
        assert!(select_faces(&kernel, &foreign, &FaceSelector::All).is_empty());
    }
}
