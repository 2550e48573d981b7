//! KernelIntrospect for TruckKernel, answering queries from truck topology.
//!
//! Entity ids encode the owning handle: `handle * 10000 + offset`, where
//! faces start at 0, edges at 1000, vertices at 2000 and lumps at 3000.

use crate::traits::KernelIntrospect;
use crate::truck_kernel::TruckKernel;
use crate::types::*;
use std::collections::HashSet;

use truck_modeling::geometry::Surface;
use truck_modeling::topology::{Edge, Face, Shell, Solid, Vertex};

const EDGE_BASE: u64 = 1000;
const VERTEX_BASE: u64 = 2000;
const LUMP_BASE: u64 = 3000;

/// Deduplicated topology of a solid across all of its shells.
struct Flat<'a> {
    shells: Vec<&'a Shell>,
    faces: Vec<&'a Face>,
    edges: Vec<Edge>,
    vertices: Vec<Vertex>,
}

impl<'a> Flat<'a> {
    fn of(solid: &'a Solid) -> Self {
        let shells: Vec<&Shell> = solid.boundaries().iter().collect();
        let mut faces = Vec::new();
        let mut edges = Vec::new();
        let mut vertices = Vec::new();
        let mut seen_edges = HashSet::new();
        let mut seen_vertices = HashSet::new();
        for shell in shells.iter().copied() {
            faces.extend(shell.face_iter());
            for e in shell.edge_iter() {
                if seen_edges.insert(e.id()) {
                    edges.push(e);
                }
            }
            for v in shell.vertex_iter() {
                if seen_vertices.insert(v.id()) {
                    vertices.push(v);
                }
            }
        }
        Self {
            shells,
            faces,
            edges,
            vertices,
        }
    }

    fn edge_index(&self, edge: &Edge) -> Option<usize> {
        self.edges.iter().position(|e| e.id() == edge.id())
    }

    fn vertex_index(&self, vertex: &Vertex) -> Option<usize> {
        self.vertices.iter().position(|v| v.id() == vertex.id())
    }
}

fn split(entity: KernelId) -> (KernelSolidHandle, u64) {
    (KernelSolidHandle(entity.0 / 10000), entity.0 % 10000)
}

fn make_id(handle: &KernelSolidHandle, base: u64, idx: usize) -> KernelId {
    KernelId(handle.id() * 10000 + base + idx as u64)
}

impl TruckKernel {
    fn flat(&self, handle: &KernelSolidHandle) -> Option<Flat<'_>> {
        self.get_solid(handle).map(Flat::of)
    }

    fn ids(&self, handle: &KernelSolidHandle, kind: TopoKind) -> Vec<KernelId> {
        let Some(flat) = self.flat(handle) else {
            return Vec::new();
        };
        let (base, count) = match kind {
            TopoKind::Face => (0, flat.faces.len()),
            TopoKind::Edge => (EDGE_BASE, flat.edges.len()),
            TopoKind::Vertex => (VERTEX_BASE, flat.vertices.len()),
            TopoKind::Solid => (LUMP_BASE, flat.shells.len()),
            TopoKind::Shell => return Vec::new(),
        };
        (0..count).map(|i| make_id(handle, base, i)).collect()
    }
}

impl KernelIntrospect for TruckKernel {
    fn list_lumps(&self, solid: &KernelSolidHandle) -> Vec<KernelId> {
        self.ids(solid, TopoKind::Solid)
    }

    fn list_faces(&self, solid: &KernelSolidHandle) -> Vec<KernelId> {
        self.ids(solid, TopoKind::Face)
    }

    fn list_edges(&self, solid: &KernelSolidHandle) -> Vec<KernelId> {
        self.ids(solid, TopoKind::Edge)
    }

    fn list_vertices(&self, solid: &KernelSolidHandle) -> Vec<KernelId> {
        self.ids(solid, TopoKind::Vertex)
    }

    fn face_edges(&self, face: KernelId) -> Vec<KernelId> {
        let (handle, idx) = split(face);
        let Some(flat) = self.flat(&handle) else {
            return Vec::new();
        };
        let Some(target) = flat.faces.get(idx as usize) else {
            return Vec::new();
        };
        target
            .boundaries()
            .iter()
            .flat_map(|w| w.edge_iter())
            .filter_map(|e| flat.edge_index(e))
            .map(|i| make_id(&handle, EDGE_BASE, i))
            .collect()
    }

    fn edge_faces(&self, edge: KernelId) -> Vec<KernelId> {
        let (handle, offset) = split(edge);
        let Some(flat) = self.flat(&handle) else {
            return Vec::new();
        };
        let Some(target) = flat.edges.get(offset.saturating_sub(EDGE_BASE) as usize) else {
            return Vec::new();
        };
        flat.faces
            .iter()
            .enumerate()
            .filter(|(_, f)| {
                f.boundaries()
                    .iter()
                    .flat_map(|w| w.edge_iter())
                    .any(|e| e.id() == target.id())
            })
            .map(|(i, _)| make_id(&handle, 0, i))
            .collect()
    }

    fn edge_vertices(&self, edge: KernelId) -> (KernelId, KernelId) {
        let (handle, offset) = split(edge);
        let none = (KernelId(0), KernelId(0));
        let Some(flat) = self.flat(&handle) else {
            return none;
        };
        let Some(target) = flat.edges.get(offset.saturating_sub(EDGE_BASE) as usize) else {
            return none;
        };
        let id_of = |v: &Vertex| {
            flat.vertex_index(v)
                .map(|i| make_id(&handle, VERTEX_BASE, i))
                .unwrap_or(KernelId(0))
        };
        (id_of(target.front()), id_of(target.back()))
    }

    fn face_neighbors(&self, face: KernelId) -> Vec<KernelId> {
        let mut neighbors = Vec::new();
        let mut seen = HashSet::new();
        for eid in self.face_edges(face) {
            for fid in self.edge_faces(eid) {
                if fid != face && seen.insert(fid) {
                    neighbors.push(fid);
                }
            }
        }
        neighbors
    }

    fn compute_signature(&self, entity: KernelId, kind: TopoKind) -> TopoSignature {
        let (handle, offset) = split(entity);
        let Some(flat) = self.flat(&handle) else {
            return TopoSignature::empty();
        };
        let sig = match kind {
            TopoKind::Face => flat.faces.get(offset as usize).map(|f| face_signature(f)),
            TopoKind::Edge => flat
                .edges
                .get(offset.saturating_sub(EDGE_BASE) as usize)
                .map(edge_signature),
            TopoKind::Vertex => flat
                .vertices
                .get(offset.saturating_sub(VERTEX_BASE) as usize)
                .map(vertex_signature),
            TopoKind::Solid => flat
                .shells
                .get(offset.saturating_sub(LUMP_BASE) as usize)
                .map(|s| shell_signature(s)),
            TopoKind::Shell => None,
        };
        sig.unwrap_or_else(TopoSignature::empty)
    }

    fn compute_all_signatures(
        &self,
        solid: &KernelSolidHandle,
        kind: TopoKind,
    ) -> Vec<(KernelId, TopoSignature)> {
        self.ids(solid, kind)
            .into_iter()
            .map(|id| (id, self.compute_signature(id, kind)))
            .collect()
    }
}

fn to_array(p: truck_modeling::Point3) -> [f64; 3] {
    [p[0], p[1], p[2]]
}

fn bbox_array(points: &[[f64; 3]]) -> Option<[f64; 6]> {
    Aabb::from_points(points).map(|b| b.to_array())
}

fn face_signature(face: &Face) -> TopoSignature {
    let surface = face.oriented_surface();
    let points: Vec<[f64; 3]> = face
        .boundaries()
        .iter()
        .flat_map(|w| w.vertex_iter())
        .map(|v| to_array(v.point()))
        .collect();
    let centroid = average(&points);
    let (surface_type, normal) = match &surface {
        Surface::Plane(plane) => {
            let n = plane.normal();
            ("planar", Some([n[0], n[1], n[2]]))
        }
        Surface::RevolutedCurve(_) => ("revolved", None),
        Surface::BSplineSurface(_) | Surface::NurbsSurface(_) => ("nurbs", None),
    };

    TopoSignature {
        surface_type: Some(surface_type.to_string()),
        centroid: Some(centroid),
        normal,
        bbox: bbox_array(&points),
        ..TopoSignature::empty()
    }
}

fn edge_signature(edge: &Edge) -> TopoSignature {
    let front = to_array(edge.front().point());
    let back = to_array(edge.back().point());
    let d = [back[0] - front[0], back[1] - front[1], back[2] - front[2]];
    let length = (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt();

    // Closed edges are full circles from a revolution; open ones are treated as straight.
    let (curve, direction) = if length < 1e-9 {
        ("circle", None)
    } else {
        ("line", Some([d[0] / length, d[1] / length, d[2] / length]))
    };

    TopoSignature {
        surface_type: Some(curve.to_string()),
        centroid: Some(average(&[front, back])),
        direction,
        bbox: bbox_array(&[front, back]),
        length: Some(length),
        ..TopoSignature::empty()
    }
}

fn vertex_signature(vertex: &Vertex) -> TopoSignature {
    let p = to_array(vertex.point());
    TopoSignature {
        surface_type: Some("point".to_string()),
        centroid: Some(p),
        bbox: Some([p[0], p[1], p[2], p[0], p[1], p[2]]),
        ..TopoSignature::empty()
    }
}

fn shell_signature(shell: &Shell) -> TopoSignature {
    let points: Vec<[f64; 3]> = shell.vertex_iter().map(|v| to_array(v.point())).collect();
    TopoSignature {
        surface_type: Some("solid".to_string()),
        centroid: Some(average(&points)),
        bbox: bbox_array(&points),
        ..TopoSignature::empty()
    }
}

fn average(points: &[[f64; 3]]) -> [f64; 3] {
    if points.is_empty() {
        return [0.0; 3];
    }
    let n = points.len() as f64;
    let s = points.iter().fold([0.0; 3], |s, p| [s[0] + p[0], s[1] + p[1], s[2] + p[2]]);
    [s[0] / n, s[1] / n, s[2] / n]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles;

    #[test]
    fn test_introspect_box_counts() {
        let mut kernel = TruckKernel::new();
        let handle = kernel.store_solid(profiles::make_box(1.0, 1.0, 1.0));

        assert_eq!(kernel.list_faces(&handle).len(), 6, "Box should have 6 faces");
        assert_eq!(kernel.list_edges(&handle).len(), 12, "Box should have 12 edges");
        assert_eq!(kernel.list_vertices(&handle).len(), 8, "Box should have 8 vertices");
        assert_eq!(kernel.list_lumps(&handle).len(), 1);
    }

    #[test]
    fn test_introspect_face_edges_box() {
        let mut kernel = TruckKernel::new();
        let handle = kernel.store_solid(profiles::make_box(1.0, 1.0, 1.0));
        for face in kernel.list_faces(&handle) {
            assert_eq!(kernel.face_edges(face).len(), 4, "Each box face should have 4 edges");
            assert_eq!(kernel.face_neighbors(face).len(), 4);
        }
    }

    #[test]
    fn test_introspect_face_signature() {
        let mut kernel = TruckKernel::new();
        let handle = kernel.store_solid(profiles::make_box(1.0, 1.0, 1.0));
        for face in kernel.list_faces(&handle) {
            let sig = kernel.compute_signature(face, TopoKind::Face);
            assert_eq!(sig.surface_type.as_deref(), Some("planar"));
            assert!(sig.centroid.is_some());
            assert!(sig.normal.is_some());
        }
    }

    #[test]
    fn test_introspect_bounding_box() {
        let mut kernel = TruckKernel::new();
        let handle = kernel.store_solid(profiles::make_box(2.0, 3.0, 4.0));
        let bb = kernel.bounding_box(&handle).unwrap();
        assert_eq!(bb.to_array(), [0.0, 0.0, 0.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_box_edges_are_straight() {
        let mut kernel = TruckKernel::new();
        let handle = kernel.store_solid(profiles::make_box(1.0, 1.0, 1.0));
        let vertical = kernel
            .compute_all_signatures(&handle, TopoKind::Edge)
            .into_iter()
            .filter(|(_, s)| s.direction.map(|d| d[2].abs() > 0.999).unwrap_or(false))
            .count();
        assert_eq!(vertical, 4);
    }
}
