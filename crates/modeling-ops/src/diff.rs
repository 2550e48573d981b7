use brick_kernel::{KernelId, KernelIntrospect, KernelSolidHandle};
use brick_types::{TopoKind, TopoSignature};

/// Signatures of every face, edge and vertex of a solid.
#[derive(Debug, Clone, Default)]
pub struct TopoSnapshot {
    pub faces: Vec<(KernelId, TopoSignature)>,
    pub edges: Vec<(KernelId, TopoSignature)>,
    pub vertices: Vec<(KernelId, TopoSignature)>,
}

/// Take a topology snapshot of a solid.
pub fn snapshot(introspect: &dyn KernelIntrospect, solid: &KernelSolidHandle) -> TopoSnapshot {
    TopoSnapshot {
        faces: introspect.compute_all_signatures(solid, TopoKind::Face),
        edges: introspect.compute_all_signatures(solid, TopoKind::Edge),
        vertices: introspect.compute_all_signatures(solid, TopoKind::Vertex),
    }
}

/// Whether two snapshots describe the same geometry up to entity ids.
///
/// Each kind must have the same count, and the signatures must pair up
/// one-to-one with matching type and centroids, areas and lengths within
/// `tol`.
pub fn congruent(a: &TopoSnapshot, b: &TopoSnapshot, tol: f64) -> bool {
    same_multiset(&a.faces, &b.faces, tol)
        && same_multiset(&a.edges, &b.edges, tol)
        && same_multiset(&a.vertices, &b.vertices, tol)
}

fn same_multiset(
    a: &[(KernelId, TopoSignature)],
    b: &[(KernelId, TopoSignature)],
    tol: f64,
) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut ka: Vec<SigKey> = a.iter().map(|(_, s)| SigKey::of(s, tol)).collect();
    let mut kb: Vec<SigKey> = b.iter().map(|(_, s)| SigKey::of(s, tol)).collect();
    ka.sort();
    kb.sort();
    ka == kb
}

/// Signature quantized to a grid of size `tol`, for order-free comparison.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct SigKey {
    surface_type: Option<String>,
    centroid: Option<[i64; 3]>,
    area: Option<i64>,
    length: Option<i64>,
}

impl SigKey {
    fn of(sig: &TopoSignature, tol: f64) -> Self {
        let q = |v: f64| (v / tol).round() as i64;
        Self {
            surface_type: sig.surface_type.clone(),
            centroid: sig.centroid.map(|c| [q(c[0]), q(c[1]), q(c[2])]),
            area: sig.area.map(q),
            length: sig.length.map(q),
        }
    }
}
