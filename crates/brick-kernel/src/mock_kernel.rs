//! MockKernel: deterministic test double implementing Kernel + KernelIntrospect.
//!
//! Builds synthetic boundary topology from sketch regions with predictable
//! entity counts and signatures. Booleans work on bounding boxes and planar
//! face outlines, which is enough to check part layout without a real kernel.

use crate::traits::{Kernel, KernelIntrospect};
use crate::types::*;
use std::collections::{HashMap, HashSet};
use std::f64::consts::{FRAC_PI_2, PI};

const TOL: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CurveKind {
    Line,
    Circle,
    Arc,
}

impl CurveKind {
    fn name(self) -> &'static str {
        match self {
            CurveKind::Line => "line",
            CurveKind::Circle => "circle",
            CurveKind::Arc => "arc",
        }
    }
}

/// A mock vertex with known position.
#[derive(Debug, Clone)]
struct MockVertex {
    id: KernelId,
    position: [f64; 3],
}

/// A mock edge. Closed curves start and end on the same seam vertex.
#[derive(Debug, Clone)]
struct MockEdge {
    id: KernelId,
    start: KernelId,
    end: KernelId,
    curve: CurveKind,
    centroid: [f64; 3],
    /// Unit tangent for straight edges.
    direction: Option<[f64; 3]>,
    length: f64,
    bbox: Aabb,
}

/// Flat boundary of a planar face, kept for coplanar overlap tests.
#[derive(Debug, Clone)]
struct Outline {
    plane: Workplane,
    region: Region,
}

/// A mock face with known properties.
#[derive(Debug, Clone)]
struct MockFace {
    id: KernelId,
    edges: Vec<KernelId>,
    normal: Option<[f64; 3]>,
    centroid: [f64; 3],
    area: f64,
    surface_type: String,
    bbox: Aabb,
    outline: Option<Outline>,
}

/// A connected piece of material.
#[derive(Debug, Clone)]
struct MockLump {
    id: KernelId,
    bbox: Aabb,
}

/// A synthetic solid with deterministic topology.
#[derive(Debug, Clone, Default)]
struct MockSolid {
    vertices: Vec<MockVertex>,
    edges: Vec<MockEdge>,
    faces: Vec<MockFace>,
    lumps: Vec<MockLump>,
}

/// A face created by `make_faces`, waiting to be extruded or swept.
#[derive(Debug, Clone)]
struct PendingFace {
    plane: Workplane,
    region: Region,
}

/// A boundary loop in sketch coordinates.
enum Loop {
    /// Counter-clockwise polygon.
    Polygon(Vec<[f64; 2]>),
    Circle { center: [f64; 2], radius: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Absorb {
    /// Coplanar faces inside a larger face merge into it.
    Union,
    /// The larger of two coplanar faces is trimmed away.
    Intersect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlendKind {
    Fillet,
    Chamfer,
}

/// Deterministic test double for the geometry kernel.
/// Implements both Kernel and KernelIntrospect.
pub struct MockKernel {
    next_id: u64,
    next_handle: u64,
    solids: HashMap<u64, MockSolid>,
    /// Faces created by make_faces, consumed by extrude or sweep.
    standalone_faces: HashMap<u64, PendingFace>,
    paths: HashMap<u64, Vec<[f64; 3]>>,
}

impl MockKernel {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            next_handle: 1,
            solids: HashMap::new(),
            standalone_faces: HashMap::new(),
            paths: HashMap::new(),
        }
    }

    fn alloc_id(&mut self) -> KernelId {
        let id = KernelId(self.next_id);
        self.next_id += 1;
        id
    }

    fn alloc_handle(&mut self) -> KernelSolidHandle {
        let h = KernelSolidHandle(self.next_handle);
        self.next_handle += 1;
        h
    }

    fn store(&mut self, solid: MockSolid) -> KernelSolidHandle {
        let handle = self.alloc_handle();
        self.solids.insert(handle.id(), solid);
        handle
    }

    fn get(&self, handle: &KernelSolidHandle) -> Result<&MockSolid, KernelError> {
        self.solids
            .get(&handle.id())
            .ok_or(KernelError::EntityNotFound {
                id: KernelId(handle.id()),
            })
    }

    fn push_vertex(&mut self, solid: &mut MockSolid, position: [f64; 3]) -> KernelId {
        let id = self.alloc_id();
        solid.vertices.push(MockVertex { id, position });
        id
    }

    fn push_line(
        &mut self,
        solid: &mut MockSolid,
        start: (KernelId, [f64; 3]),
        end: (KernelId, [f64; 3]),
    ) -> KernelId {
        let id = self.alloc_id();
        let d = sub(end.1, start.1);
        solid.edges.push(MockEdge {
            id,
            start: start.0,
            end: end.0,
            curve: CurveKind::Line,
            centroid: midpoint(start.1, end.1),
            direction: Some(normalize(d)),
            length: norm(d),
            bbox: bbox_of(&[start.1, end.1]),
        });
        id
    }

    fn push_circle(
        &mut self,
        solid: &mut MockSolid,
        seam: KernelId,
        center: [f64; 3],
        points: &[[f64; 3]],
        radius: f64,
    ) -> KernelId {
        let id = self.alloc_id();
        solid.edges.push(MockEdge {
            id,
            start: seam,
            end: seam,
            curve: CurveKind::Circle,
            centroid: center,
            direction: None,
            length: 2.0 * PI * radius,
            bbox: bbox_of(points),
        });
        id
    }

    /// Re-ID every entity of a solid to simulate fresh kernel output.
    fn reid(&mut self, s: &MockSolid) -> (MockSolid, HashMap<KernelId, KernelId>) {
        let mut id_map: HashMap<KernelId, KernelId> = HashMap::new();
        let mut out = MockSolid::default();

        for v in &s.vertices {
            let new_id = self.alloc_id();
            id_map.insert(v.id, new_id);
            out.vertices.push(MockVertex {
                id: new_id,
                position: v.position,
            });
        }
        for e in &s.edges {
            let new_id = self.alloc_id();
            id_map.insert(e.id, new_id);
            out.edges.push(MockEdge {
                id: new_id,
                start: id_map.get(&e.start).copied().unwrap_or(e.start),
                end: id_map.get(&e.end).copied().unwrap_or(e.end),
                ..e.clone()
            });
        }
        for f in &s.faces {
            let new_id = self.alloc_id();
            id_map.insert(f.id, new_id);
            out.faces.push(MockFace {
                id: new_id,
                edges: f
                    .edges
                    .iter()
                    .map(|eid| id_map.get(eid).copied().unwrap_or(*eid))
                    .collect(),
                ..f.clone()
            });
        }
        for l in &s.lumps {
            let new_id = self.alloc_id();
            id_map.insert(l.id, new_id);
            out.lumps.push(MockLump {
                id: new_id,
                bbox: l.bbox,
            });
        }
        (out, id_map)
    }

    /// Combine two solids with fresh IDs. Faces of `a` come first.
    fn merge_solids(&mut self, a: &MockSolid, b: &MockSolid) -> MockSolid {
        let (mut out, _) = self.reid(a);
        let (other, _) = self.reid(b);
        out.vertices.extend(other.vertices);
        out.edges.extend(other.edges);
        out.faces.extend(other.faces);
        out.lumps.extend(other.lumps);
        out
    }

    /// Sweep a region through a sequence of translation stations.
    ///
    /// Every station holds a copy of each boundary loop; consecutive
    /// stations are joined by one lateral face per loop segment.
    fn build_swept(
        &mut self,
        pending: &PendingFace,
        stations: &[[f64; 3]],
    ) -> Result<MockSolid, KernelError> {
        if stations.len() < 2 {
            return Err(KernelError::SweepFailed {
                reason: "at least two stations are required".to_string(),
            });
        }
        for w in stations.windows(2) {
            if norm(sub(w[1], w[0])) < 1e-12 {
                return Err(KernelError::SweepFailed {
                    reason: "zero-length sweep segment".to_string(),
                });
            }
        }

        let plane = pending.plane;
        let region = &pending.region;
        let m = stations.len();
        let mut solid = MockSolid::default();
        let mut first_cap_edges = Vec::new();
        let mut last_cap_edges = Vec::new();
        let mut all_points = Vec::new();

        let loops = std::iter::once(&region.outer).chain(region.holes.iter());
        for (loop_idx, shape) in loops.enumerate() {
            let is_hole = loop_idx > 0;
            match loop_of(shape) {
                Loop::Polygon(pts) => {
                    let k = pts.len();
                    let base: Vec<[f64; 3]> = pts.iter().map(|p| plane.to_world(*p)).collect();
                    let mut rings: Vec<Vec<(KernelId, [f64; 3])>> = Vec::with_capacity(m);
                    for s in stations {
                        let mut ring = Vec::with_capacity(k);
                        for b in &base {
                            let w = add(*b, *s);
                            all_points.push(w);
                            ring.push((self.push_vertex(&mut solid, w), w));
                        }
                        rings.push(ring);
                    }

                    let mut ring_edges: Vec<Vec<KernelId>> = Vec::with_capacity(m);
                    for ring in &rings {
                        let mut edges = Vec::with_capacity(k);
                        for i in 0..k {
                            edges.push(self.push_line(&mut solid, ring[i], ring[(i + 1) % k]));
                        }
                        ring_edges.push(edges);
                    }

                    for si in 0..m - 1 {
                        let long: Vec<KernelId> = (0..k)
                            .map(|i| self.push_line(&mut solid, rings[si][i], rings[si + 1][i]))
                            .collect();
                        let seg = sub(stations[si + 1], stations[si]);
                        for i in 0..k {
                            let j = (i + 1) % k;
                            let d2 = [pts[j][0] - pts[i][0], pts[j][1] - pts[i][1]];
                            let mut n2 = normalize2([d2[1], -d2[0]]);
                            if is_hole {
                                n2 = [-n2[0], -n2[1]];
                            }
                            let in_plane = add(scale(plane.x_dir, n2[0]), scale(plane.y_dir(), n2[1]));
                            let edge_w = sub(base[j], base[i]);
                            let mut n = normalize(cross(edge_w, seg));
                            if dot(n, in_plane) < 0.0 {
                                n = scale(n, -1.0);
                            }
                            let corners = [
                                rings[si][i].1,
                                rings[si][j].1,
                                rings[si + 1][j].1,
                                rings[si + 1][i].1,
                            ];
                            let local_plane = Workplane::new(corners[0], n, edge_w);
                            let local_pts: Vec<[f64; 2]> = corners
                                .iter()
                                .map(|c| to_local(&local_plane, *c))
                                .collect();
                            let id = self.alloc_id();
                            solid.faces.push(MockFace {
                                id,
                                edges: vec![ring_edges[si][i], long[j], ring_edges[si + 1][i], long[i]],
                                normal: Some(n),
                                centroid: average(&corners),
                                area: norm(cross(edge_w, seg)),
                                surface_type: "planar".to_string(),
                                bbox: bbox_of(&corners),
                                outline: Some(Outline {
                                    plane: local_plane,
                                    region: Region {
                                        outer: SketchShape::Polygon { points: local_pts },
                                        holes: Vec::new(),
                                    },
                                }),
                            });
                        }
                    }
                    first_cap_edges.extend(ring_edges[0].iter().copied());
                    last_cap_edges.extend(ring_edges[m - 1].iter().copied());
                }
                Loop::Circle { center, radius } => {
                    let c0 = plane.to_world(center);
                    let seam0 = plane.to_world([center[0] + radius, center[1]]);
                    let ring0 = circle_points(&plane, center, radius);
                    let mut seams = Vec::with_capacity(m);
                    let mut circles = Vec::with_capacity(m);
                    for s in stations {
                        let seam = add(seam0, *s);
                        let pts: Vec<[f64; 3]> = ring0.iter().map(|p| add(*p, *s)).collect();
                        all_points.extend(pts.iter().copied());
                        let v = self.push_vertex(&mut solid, seam);
                        let e = self.push_circle(&mut solid, v, add(c0, *s), &pts, radius);
                        seams.push((v, seam, pts));
                        circles.push(e);
                    }
                    for si in 0..m - 1 {
                        let seam_edge = self.push_line(
                            &mut solid,
                            (seams[si].0, seams[si].1),
                            (seams[si + 1].0, seams[si + 1].1),
                        );
                        let seg = sub(stations[si + 1], stations[si]);
                        let mut pts = seams[si].2.clone();
                        pts.extend(seams[si + 1].2.iter().copied());
                        let id = self.alloc_id();
                        solid.faces.push(MockFace {
                            id,
                            edges: vec![circles[si], seam_edge, circles[si + 1]],
                            normal: None,
                            centroid: add(c0, midpoint(stations[si], stations[si + 1])),
                            area: 2.0 * PI * radius * norm(seg),
                            surface_type: "cylindrical".to_string(),
                            bbox: bbox_of(&pts),
                            outline: None,
                        });
                    }
                    first_cap_edges.push(circles[0]);
                    last_cap_edges.push(circles[m - 1]);
                }
            }
        }

        let centroid = plane.to_world(region.centroid());
        let outer_pts: Vec<[f64; 3]> = region
            .outer
            .sample_points()
            .iter()
            .map(|p| plane.to_world(*p))
            .collect();
        let caps = [
            (0usize, scale(normalize(sub(stations[1], stations[0])), -1.0), first_cap_edges),
            (m - 1, normalize(sub(stations[m - 1], stations[m - 2])), last_cap_edges),
        ];
        for (si, normal, edges) in caps {
            let s = stations[si];
            let pts: Vec<[f64; 3]> = outer_pts.iter().map(|p| add(*p, s)).collect();
            let id = self.alloc_id();
            solid.faces.push(MockFace {
                id,
                edges,
                normal: Some(normal),
                centroid: add(centroid, s),
                area: region.area(),
                surface_type: "planar".to_string(),
                bbox: bbox_of(&pts),
                outline: Some(Outline {
                    plane: Workplane {
                        origin: add(plane.origin, s),
                        ..plane
                    },
                    region: region.clone(),
                }),
            });
        }

        let lump_id = self.alloc_id();
        solid.lumps.push(MockLump {
            id: lump_id,
            bbox: bbox_of(&all_points),
        });
        Ok(solid)
    }

    /// Copy of the faces matching `keep`, with only the edges and vertices they use.
    fn subset<F>(s: &MockSolid, keep: F) -> MockSolid
    where
        F: Fn(&MockFace) -> bool,
    {
        let faces: Vec<MockFace> = s.faces.iter().filter(|f| keep(f)).cloned().collect();
        let mut out = MockSolid {
            faces,
            ..MockSolid::default()
        };
        out.vertices = s.vertices.clone();
        out.edges = s.edges.clone();
        prune(&mut out);
        out
    }

    /// New solid whose faces are shifted copies of `faces`.
    fn offset_layer(&mut self, source: &MockSolid, faces: &[&MockFace], distance: f64, flip: bool) -> MockSolid {
        let mut out = MockSolid::default();
        let mut id_map: HashMap<KernelId, KernelId> = HashMap::new();
        for f in faces {
            let delta = f.normal.map(|n| scale(n, distance)).unwrap_or([0.0; 3]);
            let mut edges = Vec::with_capacity(f.edges.len());
            for eid in &f.edges {
                if let Some(mapped) = id_map.get(eid) {
                    edges.push(*mapped);
                    continue;
                }
                let Some(e) = source.edges.iter().find(|e| e.id == *eid) else {
                    continue;
                };
                let mut ends = [e.start, e.end];
                for end in ends.iter_mut() {
                    if let Some(mapped) = id_map.get(end) {
                        *end = *mapped;
                    } else if let Some(v) = source.vertices.iter().find(|v| v.id == *end) {
                        let new_v = self.push_vertex(&mut out, add(v.position, delta));
                        id_map.insert(v.id, new_v);
                        *end = new_v;
                    }
                }
                let new_id = self.alloc_id();
                id_map.insert(e.id, new_id);
                out.edges.push(MockEdge {
                    id: new_id,
                    start: ends[0],
                    end: ends[1],
                    centroid: add(e.centroid, delta),
                    bbox: translate_bbox(&e.bbox, delta),
                    ..e.clone()
                });
                edges.push(new_id);
            }
            let shrink = if f.area > 0.0 {
                ((f.area.sqrt() - distance.abs()) / f.area.sqrt()).clamp(0.01, 1.0)
            } else {
                1.0
            };
            let id = self.alloc_id();
            out.faces.push(MockFace {
                id,
                edges,
                normal: f.normal.map(|n| if flip { scale(n, -1.0) } else { n }),
                centroid: add(f.centroid, delta),
                area: f.area * shrink * shrink,
                surface_type: f.surface_type.clone(),
                bbox: translate_bbox(&f.bbox, delta),
                outline: f.outline.as_ref().map(|o| Outline {
                    plane: Workplane {
                        origin: add(o.plane.origin, delta),
                        normal: if flip { scale(o.plane.normal, -1.0) } else { o.plane.normal },
                        ..o.plane
                    },
                    region: o.region.clone(),
                }),
            });
        }
        out
    }

    /// Replace each listed edge with a blend face and two trimmed boundary edges.
    fn blend_edges(
        &mut self,
        source: &MockSolid,
        edges: &[KernelId],
        d1: f64,
        d2: f64,
        kind: BlendKind,
    ) -> Result<MockSolid, KernelError> {
        let fail = |reason: String| match kind {
            BlendKind::Fillet => KernelError::FilletFailed { reason },
            BlendKind::Chamfer => KernelError::ChamferFailed { reason },
        };
        if edges.is_empty() {
            return Err(fail("no edges given".to_string()));
        }
        let known: HashSet<KernelId> = source.edges.iter().map(|e| e.id).collect();
        if let Some(missing) = edges.iter().find(|e| !known.contains(e)) {
            return Err(fail(format!("edge {:?} not found in solid", missing)));
        }

        let (mut out, id_map) = self.reid(source);
        let mut seen = HashSet::new();
        for orig in edges {
            if !seen.insert(*orig) {
                continue;
            }
            let eid = id_map
                .get(orig)
                .copied()
                .ok_or_else(|| fail(format!("edge {:?} not found in solid", orig)))?;
            let pos = out
                .edges
                .iter()
                .position(|e| e.id == eid)
                .ok_or_else(|| fail(format!("edge {:?} not found in solid", orig)))?;
            let edge = out.edges.remove(pos);

            let adj: Vec<usize> = out
                .faces
                .iter()
                .enumerate()
                .filter(|(_, f)| f.edges.contains(&eid))
                .map(|(i, _)| i)
                .take(2)
                .collect();
            let n1 = adj.first().and_then(|&i| out.faces[i].normal);
            let n2 = adj.get(1).and_then(|&i| out.faces[i].normal);
            let off1 = n2.map(|n| scale(n, -d1)).unwrap_or([0.0; 3]);
            let off2 = n1.map(|n| scale(n, -d2)).unwrap_or([0.0; 3]);

            let start_pos = vertex_position(&out, edge.start)
                .ok_or_else(|| fail(format!("edge {:?} has no start vertex", orig)))?;
            let end_pos = vertex_position(&out, edge.end).unwrap_or(start_pos);

            let cross_curve = match kind {
                BlendKind::Fillet => CurveKind::Arc,
                BlendKind::Chamfer => CurveKind::Line,
            };
            let cross_len = match kind {
                BlendKind::Fillet => d1.max(d2) * FRAC_PI_2,
                BlendKind::Chamfer => (d1 * d1 + d2 * d2).sqrt(),
            };

            let e1 = self.alloc_id();
            out.edges.push(MockEdge {
                id: e1,
                centroid: add(edge.centroid, off1),
                bbox: translate_bbox(&edge.bbox, off1),
                ..edge.clone()
            });

            let closed = edge.start == edge.end;
            let vs = self.push_vertex(&mut out, add(start_pos, off2));
            let vt = if closed {
                vs
            } else {
                self.push_vertex(&mut out, add(end_pos, off2))
            };
            let e2 = self.alloc_id();
            out.edges.push(MockEdge {
                id: e2,
                start: vs,
                end: vt,
                centroid: add(edge.centroid, off2),
                bbox: translate_bbox(&edge.bbox, off2),
                ..edge.clone()
            });

            let mut blend_face_edges = vec![e1, e2];
            let mut ends = vec![(edge.start, vs, start_pos)];
            if !closed {
                ends.push((edge.end, vt, end_pos));
            }
            for (old_v, new_v, p) in ends {
                let a = add(p, off1);
                let b = add(p, off2);
                let cross_id = self.alloc_id();
                out.edges.push(MockEdge {
                    id: cross_id,
                    start: old_v,
                    end: new_v,
                    curve: cross_curve,
                    centroid: midpoint(a, b),
                    direction: match cross_curve {
                        CurveKind::Line => Some(normalize(sub(b, a))),
                        _ => None,
                    },
                    length: cross_len,
                    bbox: bbox_of(&[a, b]),
                });
                blend_face_edges.push(cross_id);
                if closed {
                    continue;
                }
                let incident: HashSet<KernelId> = out
                    .edges
                    .iter()
                    .filter(|e| e.id != cross_id && (e.start == old_v || e.end == old_v))
                    .map(|e| e.id)
                    .collect();
                for (fi, f) in out.faces.iter_mut().enumerate() {
                    if !adj.contains(&fi) && f.edges.iter().any(|e| incident.contains(e)) {
                        f.edges.push(cross_id);
                    }
                }
            }

            for (slot, &fi) in adj.iter().enumerate() {
                let replacement = if slot == 0 { e1 } else { e2 };
                for e in out.faces[fi].edges.iter_mut() {
                    if *e == eid {
                        *e = replacement;
                    }
                }
            }

            let (surface_type, normal, area) = match (kind, edge.curve) {
                (BlendKind::Fillet, CurveKind::Circle) => ("toroidal", None, edge.length * d1 * FRAC_PI_2),
                (BlendKind::Fillet, _) => ("cylindrical", None, edge.length * d1 * FRAC_PI_2),
                (BlendKind::Chamfer, _) => (
                    "planar",
                    match (n1, n2) {
                        (Some(a), Some(b)) => Some(normalize(add(a, b))),
                        _ => None,
                    },
                    edge.length * cross_len,
                ),
            };
            let e1_box = translate_bbox(&edge.bbox, off1);
            let e2_box = translate_bbox(&edge.bbox, off2);
            let id = self.alloc_id();
            out.faces.push(MockFace {
                id,
                edges: blend_face_edges,
                normal,
                centroid: midpoint(add(edge.centroid, off1), add(edge.centroid, off2)),
                area,
                surface_type: surface_type.to_string(),
                bbox: e1_box.union(&e2_box),
                outline: None,
            });
        }
        Ok(out)
    }
}

impl Default for MockKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel for MockKernel {
    fn make_faces(
        &mut self,
        sketch: &Sketch,
        plane: &Workplane,
    ) -> Result<Vec<KernelId>, KernelError> {
        let mut face_ids = Vec::new();
        for region in sketch.regions() {
            validate_region(&region)?;
            let face_id = self.alloc_id();
            self.standalone_faces.insert(
                face_id.0,
                PendingFace {
                    plane: *plane,
                    region,
                },
            );
            face_ids.push(face_id);
        }
        Ok(face_ids)
    }

    fn make_path(&mut self, points: &[[f64; 3]]) -> Result<KernelId, KernelError> {
        if points.len() < 2 {
            return Err(KernelError::SweepFailed {
                reason: "path needs at least two points".to_string(),
            });
        }
        let id = self.alloc_id();
        self.paths.insert(id.0, points.to_vec());
        Ok(id)
    }

    fn extrude_face(
        &mut self,
        face: KernelId,
        direction: [f64; 3],
        depth: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        let pending = self
            .standalone_faces
            .remove(&face.0)
            .ok_or(KernelError::EntityNotFound { id: face })?;
        if norm(direction) < 1e-12 {
            return Err(KernelError::Other {
                message: "extrude direction has zero length".to_string(),
            });
        }
        let sweep = scale(normalize(direction), depth);
        let solid = self.build_swept(&pending, &[[0.0; 3], sweep])?;
        Ok(self.store(solid))
    }

    fn sweep_face(
        &mut self,
        face: KernelId,
        path: KernelId,
    ) -> Result<KernelSolidHandle, KernelError> {
        let pending = self
            .standalone_faces
            .remove(&face.0)
            .ok_or(KernelError::EntityNotFound { id: face })?;
        let points = self
            .paths
            .get(&path.0)
            .ok_or(KernelError::EntityNotFound { id: path })?
            .clone();
        let stations: Vec<[f64; 3]> = points.iter().map(|p| sub(*p, points[0])).collect();
        let solid = self.build_swept(&pending, &stations)?;
        Ok(self.store(solid))
    }

    fn boolean_union(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError> {
        let solid_a = self.get(a)?.clone();
        let solid_b = self.get(b)?.clone();

        let mut merged = self.merge_solids(&solid_a, &solid_b);
        absorb_coplanar(&mut merged, solid_a.faces.len(), Absorb::Union);
        prune(&mut merged);
        let lumps = std::mem::take(&mut merged.lumps);
        merged.lumps = self.merge_lumps(lumps);
        Ok(self.store(merged))
    }

    fn boolean_subtract(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError> {
        let solid_a = self.get(a)?.clone();
        let solid_b = self.get(b)?.clone();

        let swallowed = solid_a
            .lumps
            .iter()
            .all(|la| solid_b.lumps.iter().any(|lb| lb.bbox.contains(&la.bbox, TOL)));
        if swallowed && !solid_a.lumps.is_empty() {
            return Err(KernelError::BooleanFailed {
                reason: "subtraction removes the whole solid".to_string(),
            });
        }

        // Faces of b buried in a become the walls of the cut, facing inward.
        let inside_a = |f: &MockFace| lumps_contain(&solid_a.lumps, f.centroid, -TOL);
        let mut cut = Self::subset(&solid_b, inside_a);
        for f in cut.faces.iter_mut() {
            f.normal = f.normal.map(|n| scale(n, -1.0));
        }

        let mut result = self.merge_solids(&solid_a, &cut);
        // merge_solids re-IDs lumps of both; only a contributes material.
        result.lumps.truncate(solid_a.lumps.len());
        Ok(self.store(result))
    }

    fn boolean_intersect(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError> {
        let solid_a = self.get(a)?.clone();
        let solid_b = self.get(b)?.clone();

        let mut boxes = Vec::new();
        for la in &solid_a.lumps {
            for lb in &solid_b.lumps {
                if let Some(bb) = la.bbox.intersection(&lb.bbox, 0.0) {
                    if bb.volume() > 1e-12 {
                        boxes.push(bb);
                    }
                }
            }
        }
        if boxes.is_empty() {
            return Err(KernelError::BooleanFailed {
                reason: "solids do not overlap".to_string(),
            });
        }

        let part_a = Self::subset(&solid_a, |f| lumps_contain(&solid_b.lumps, f.centroid, TOL));
        let part_b = Self::subset(&solid_b, |f| lumps_contain(&solid_a.lumps, f.centroid, TOL));
        let mut result = self.merge_solids(&part_a, &part_b);
        absorb_coplanar(&mut result, part_a.faces.len(), Absorb::Intersect);
        prune(&mut result);

        let lumps: Vec<MockLump> = boxes
            .into_iter()
            .map(|bbox| MockLump {
                id: self.alloc_id(),
                bbox,
            })
            .collect();
        result.lumps = self.merge_lumps(lumps);
        Ok(self.store(result))
    }

    fn fillet_edges(
        &mut self,
        solid: &KernelSolidHandle,
        edges: &[KernelId],
        radius: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        if radius <= 0.0 {
            return Err(KernelError::FilletFailed {
                reason: "radius must be positive".to_string(),
            });
        }
        let source = self.get(solid)?.clone();
        let result = self.blend_edges(&source, edges, radius, radius, BlendKind::Fillet)?;
        Ok(self.store(result))
    }

    fn chamfer_edges(
        &mut self,
        solid: &KernelSolidHandle,
        edges: &[KernelId],
        length: f64,
        length2: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        if length <= 0.0 || length2 <= 0.0 {
            return Err(KernelError::ChamferFailed {
                reason: "chamfer lengths must be positive".to_string(),
            });
        }
        let source = self.get(solid)?.clone();
        let result = self.blend_edges(&source, edges, length, length2, BlendKind::Chamfer)?;
        Ok(self.store(result))
    }

    fn shell(
        &mut self,
        solid: &KernelSolidHandle,
        faces_to_remove: &[KernelId],
        thickness: f64,
        side: ShellSide,
    ) -> Result<KernelSolidHandle, KernelError> {
        if thickness <= 0.0 {
            return Err(KernelError::ShellFailed {
                reason: "thickness must be positive".to_string(),
            });
        }
        let source = self.get(solid)?.clone();

        let all_face_ids: HashSet<KernelId> = source.faces.iter().map(|f| f.id).collect();
        for fid in faces_to_remove {
            if !all_face_ids.contains(fid) {
                return Err(KernelError::ShellFailed {
                    reason: format!("face {:?} not found in solid", fid),
                });
            }
        }
        let remove_set: HashSet<KernelId> = faces_to_remove.iter().copied().collect();
        let kept = Self::subset(&source, |f| !remove_set.contains(&f.id));
        let kept_refs: Vec<&MockFace> = kept.faces.iter().collect();

        let (mut base, layer) = match side {
            ShellSide::Inward => {
                let layer = self.offset_layer(&kept, &kept_refs, -thickness, true);
                (kept.clone(), layer)
            }
            ShellSide::Outward => {
                let layer = self.offset_layer(&kept, &kept_refs, thickness, false);
                let mut inner = kept.clone();
                for f in inner.faces.iter_mut() {
                    f.normal = f.normal.map(|n| scale(n, -1.0));
                }
                (inner, layer)
            }
        };
        base.lumps = source
            .lumps
            .iter()
            .map(|l| MockLump {
                id: l.id,
                bbox: match side {
                    ShellSide::Inward => l.bbox,
                    ShellSide::Outward => l.bbox.expanded(thickness),
                },
            })
            .collect();

        let result = self.merge_solids(&base, &layer);
        Ok(self.store(result))
    }
}

impl MockKernel {
    /// Merge lumps whose boxes touch or overlap into single pieces.
    fn merge_lumps(&mut self, lumps: Vec<MockLump>) -> Vec<MockLump> {
        let n = lumps.len();
        let mut parent: Vec<usize> = (0..n).collect();
        fn find(parent: &mut [usize], i: usize) -> usize {
            let mut r = i;
            while parent[r] != r {
                r = parent[r];
            }
            let mut c = i;
            while parent[c] != r {
                let next = parent[c];
                parent[c] = r;
                c = next;
            }
            r
        }
        for i in 0..n {
            for j in i + 1..n {
                if lumps[i].bbox.touches(&lumps[j].bbox, TOL) {
                    let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
                    if ri != rj {
                        parent[rj] = ri;
                    }
                }
            }
        }

        let mut groups: Vec<(usize, Vec<usize>)> = Vec::new();
        for i in 0..n {
            let r = find(&mut parent, i);
            match groups.iter_mut().find(|(root, _)| *root == r) {
                Some((_, members)) => members.push(i),
                None => groups.push((r, vec![i])),
            }
        }

        groups
            .into_iter()
            .map(|(_, members)| {
                if members.len() == 1 {
                    return lumps[members[0]].clone();
                }
                let bbox = members
                    .iter()
                    .map(|&i| lumps[i].bbox)
                    .reduce(|a, b| a.union(&b))
                    .unwrap_or(lumps[members[0]].bbox);
                MockLump {
                    id: self.alloc_id(),
                    bbox,
                }
            })
            .collect()
    }
}

/// Remove one of every pair of coplanar faces where one outline covers the other.
///
/// Faces `0..split` came from the first operand and the rest from the second.
fn absorb_coplanar(solid: &mut MockSolid, split: usize, mode: Absorb) {
    let mut remove: HashSet<usize> = HashSet::new();
    for i in 0..split.min(solid.faces.len()) {
        for j in split..solid.faces.len() {
            let (fa, fb) = (&solid.faces[i], &solid.faces[j]);
            let (Some(na), Some(nb)) = (fa.normal, fb.normal) else {
                continue;
            };
            let (Some(oa), Some(ob)) = (&fa.outline, &fb.outline) else {
                continue;
            };
            let d = dot(na, nb);
            if d.abs() < 1.0 - 1e-9 || dot(na, sub(fb.centroid, fa.centroid)).abs() > TOL {
                continue;
            }
            let a_in_b = outline_within(oa, ob);
            let b_in_a = outline_within(ob, oa);
            match (mode, d > 0.0) {
                (Absorb::Union, true) => {
                    if b_in_a {
                        remove.insert(j);
                    } else if a_in_b {
                        remove.insert(i);
                    }
                }
                (Absorb::Union, false) => {
                    // Touching faces of opposite sense vanish inside the merged material.
                    if a_in_b {
                        remove.insert(i);
                    }
                    if b_in_a {
                        remove.insert(j);
                    }
                }
                (Absorb::Intersect, true) => {
                    if b_in_a {
                        remove.insert(i);
                    } else if a_in_b {
                        remove.insert(j);
                    }
                }
                (Absorb::Intersect, false) => {}
            }
        }
    }
    let mut idx = 0;
    solid.faces.retain(|_| {
        let keep = !remove.contains(&idx);
        idx += 1;
        keep
    });
}

/// Drop edges no face uses and vertices no edge uses.
fn prune(solid: &mut MockSolid) {
    let used_edges: HashSet<KernelId> = solid
        .faces
        .iter()
        .flat_map(|f| f.edges.iter().copied())
        .collect();
    solid.edges.retain(|e| used_edges.contains(&e.id));
    let used_vertices: HashSet<KernelId> = solid
        .edges
        .iter()
        .flat_map(|e| [e.start, e.end])
        .collect();
    solid.vertices.retain(|v| used_vertices.contains(&v.id));
}

/// Whether the planar outline `inner` lies on the material of `outer`.
fn outline_within(inner: &Outline, outer: &Outline) -> bool {
    let mut samples: Vec<[f64; 3]> = inner
        .region
        .outer
        .sample_points()
        .iter()
        .map(|p| inner.plane.to_world(*p))
        .collect();
    samples.push(inner.plane.to_world(inner.region.centroid()));
    samples.iter().all(|p| {
        let local = to_local(&outer.plane, *p);
        outer.region.outer.contains_point(local)
            && !outer
                .region
                .holes
                .iter()
                .any(|h| strictly_inside(h, local))
    })
}

fn lumps_contain(lumps: &[MockLump], p: [f64; 3], tol: f64) -> bool {
    lumps.iter().any(|l| l.bbox.contains_point(p, tol))
}

fn strictly_inside(shape: &SketchShape, p: [f64; 2]) -> bool {
    match shape {
        SketchShape::Circle { center, radius } => {
            ((p[0] - center[0]).powi(2) + (p[1] - center[1]).powi(2)).sqrt() < radius - TOL
        }
        SketchShape::Rect { .. } => {
            let b = shape.bounds();
            p[0] > b[0] + TOL && p[0] < b[2] - TOL && p[1] > b[1] + TOL && p[1] < b[3] - TOL
        }
        SketchShape::Polygon { .. } => {
            shape.contains_point(p)
                && [[TOL, 0.0], [-TOL, 0.0], [0.0, TOL], [0.0, -TOL]]
                    .iter()
                    .all(|d| shape.contains_point([p[0] + d[0] * 2.0, p[1] + d[1] * 2.0]))
        }
    }
}

fn validate_region(region: &Region) -> Result<(), KernelError> {
    for shape in std::iter::once(&region.outer).chain(region.holes.iter()) {
        let ok = match shape {
            SketchShape::Rect { width, height, .. } => *width > 0.0 && *height > 0.0,
            SketchShape::Circle { radius, .. } => *radius > 0.0,
            SketchShape::Polygon { points } => points.len() >= 3 && shape.area() > 1e-12,
        };
        if !ok {
            return Err(KernelError::InvalidProfile {
                reason: format!("degenerate shape {:?}", shape),
            });
        }
    }
    Ok(())
}

fn loop_of(shape: &SketchShape) -> Loop {
    match shape {
        SketchShape::Rect { .. } => {
            let b = shape.bounds();
            Loop::Polygon(vec![[b[0], b[1]], [b[2], b[1]], [b[2], b[3]], [b[0], b[3]]])
        }
        SketchShape::Circle { center, radius } => Loop::Circle {
            center: *center,
            radius: *radius,
        },
        SketchShape::Polygon { points } => {
            let mut pts = points.clone();
            if brick_types::shoelace_area(&pts) < 0.0 {
                pts.reverse();
            }
            Loop::Polygon(pts)
        }
    }
}

fn circle_points(plane: &Workplane, center: [f64; 2], radius: f64) -> Vec<[f64; 3]> {
    [[radius, 0.0], [0.0, radius], [-radius, 0.0], [0.0, -radius]]
        .iter()
        .map(|d| plane.to_world([center[0] + d[0], center[1] + d[1]]))
        .collect()
}

fn vertex_position(solid: &MockSolid, id: KernelId) -> Option<[f64; 3]> {
    solid.vertices.iter().find(|v| v.id == id).map(|v| v.position)
}

fn to_local(plane: &Workplane, p: [f64; 3]) -> [f64; 2] {
    let d = sub(p, plane.origin);
    [dot(d, plane.x_dir), dot(d, plane.y_dir())]
}

fn bbox_of(points: &[[f64; 3]]) -> Aabb {
    Aabb::from_points(points).unwrap_or(Aabb {
        min: [0.0; 3],
        max: [0.0; 3],
    })
}

fn translate_bbox(b: &Aabb, d: [f64; 3]) -> Aabb {
    Aabb {
        min: add(b.min, d),
        max: add(b.max, d),
    }
}

fn add(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn scale(a: [f64; 3], s: f64) -> [f64; 3] {
    [a[0] * s, a[1] * s, a[2] * s]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

fn normalize(a: [f64; 3]) -> [f64; 3] {
    let n = norm(a);
    if n < 1e-12 {
        a
    } else {
        scale(a, 1.0 / n)
    }
}

fn normalize2(a: [f64; 2]) -> [f64; 2] {
    let n = (a[0] * a[0] + a[1] * a[1]).sqrt();
    if n < 1e-12 {
        a
    } else {
        [a[0] / n, a[1] / n]
    }
}

fn midpoint(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    scale(add(a, b), 0.5)
}

fn average(points: &[[f64; 3]]) -> [f64; 3] {
    let sum = points.iter().fold([0.0; 3], |s, p| add(s, *p));
    scale(sum, 1.0 / points.len().max(1) as f64)
}

impl KernelIntrospect for MockKernel {
    fn list_lumps(&self, solid: &KernelSolidHandle) -> Vec<KernelId> {
        self.solids
            .get(&solid.id())
            .map(|s| s.lumps.iter().map(|l| l.id).collect())
            .unwrap_or_default()
    }

    fn list_faces(&self, solid: &KernelSolidHandle) -> Vec<KernelId> {
        self.solids
            .get(&solid.id())
            .map(|s| s.faces.iter().map(|f| f.id).collect())
            .unwrap_or_default()
    }

    fn list_edges(&self, solid: &KernelSolidHandle) -> Vec<KernelId> {
        self.solids
            .get(&solid.id())
            .map(|s| s.edges.iter().map(|e| e.id).collect())
            .unwrap_or_default()
    }

    fn list_vertices(&self, solid: &KernelSolidHandle) -> Vec<KernelId> {
        self.solids
            .get(&solid.id())
            .map(|s| s.vertices.iter().map(|v| v.id).collect())
            .unwrap_or_default()
    }

    fn face_edges(&self, face: KernelId) -> Vec<KernelId> {
        self.solids
            .values()
            .flat_map(|s| s.faces.iter())
            .find(|f| f.id == face)
            .map(|f| f.edges.clone())
            .unwrap_or_default()
    }

    fn edge_faces(&self, edge: KernelId) -> Vec<KernelId> {
        self.solids
            .values()
            .flat_map(|s| s.faces.iter())
            .filter(|f| f.edges.contains(&edge))
            .map(|f| f.id)
            .collect()
    }

    fn edge_vertices(&self, edge: KernelId) -> (KernelId, KernelId) {
        self.solids
            .values()
            .flat_map(|s| s.edges.iter())
            .find(|e| e.id == edge)
            .map(|e| (e.start, e.end))
            .unwrap_or((KernelId(0), KernelId(0)))
    }

    fn face_neighbors(&self, face: KernelId) -> Vec<KernelId> {
        // Faces sharing an edge with the given face
        let face_edge_ids = self.face_edges(face);
        let mut neighbors = Vec::new();
        for solid in self.solids.values() {
            for f in &solid.faces {
                if f.id != face && f.edges.iter().any(|e| face_edge_ids.contains(e)) {
                    neighbors.push(f.id);
                }
            }
        }
        neighbors
    }

    fn compute_signature(&self, entity: KernelId, kind: TopoKind) -> TopoSignature {
        self.solids
            .values()
            .find_map(|s| signature_in(s, entity, kind))
            .unwrap_or_else(TopoSignature::empty)
    }

    fn compute_all_signatures(
        &self,
        solid: &KernelSolidHandle,
        kind: TopoKind,
    ) -> Vec<(KernelId, TopoSignature)> {
        let Some(s) = self.solids.get(&solid.id()) else {
            return Vec::new();
        };
        let ids: Vec<KernelId> = match kind {
            TopoKind::Solid => s.lumps.iter().map(|l| l.id).collect(),
            TopoKind::Face => s.faces.iter().map(|f| f.id).collect(),
            TopoKind::Edge => s.edges.iter().map(|e| e.id).collect(),
            TopoKind::Vertex => s.vertices.iter().map(|v| v.id).collect(),
            TopoKind::Shell => Vec::new(),
        };
        ids.into_iter()
            .filter_map(|id| signature_in(s, id, kind).map(|sig| (id, sig)))
            .collect()
    }
}

fn signature_in(solid: &MockSolid, entity: KernelId, kind: TopoKind) -> Option<TopoSignature> {
    match kind {
        TopoKind::Solid => solid.lumps.iter().find(|l| l.id == entity).map(|l| {
            let bb = l.bbox;
            TopoSignature {
                surface_type: Some("solid".to_string()),
                centroid: Some(midpoint(bb.min, bb.max)),
                bbox: Some(bb.to_array()),
                ..TopoSignature::empty()
            }
        }),
        TopoKind::Face => solid.faces.iter().find(|f| f.id == entity).map(|f| TopoSignature {
            surface_type: Some(f.surface_type.clone()),
            area: Some(f.area),
            centroid: Some(f.centroid),
            normal: f.normal,
            bbox: Some(f.bbox.to_array()),
            ..TopoSignature::empty()
        }),
        TopoKind::Edge => solid.edges.iter().find(|e| e.id == entity).map(|e| TopoSignature {
            surface_type: Some(e.curve.name().to_string()),
            centroid: Some(e.centroid),
            direction: e.direction,
            bbox: Some(e.bbox.to_array()),
            length: Some(e.length),
            ..TopoSignature::empty()
        }),
        TopoKind::Vertex => solid
            .vertices
            .iter()
            .find(|v| v.id == entity)
            .map(|v| TopoSignature {
                surface_type: Some("point".to_string()),
                centroid: Some(v.position),
                bbox: Some([
                    v.position[0],
                    v.position[1],
                    v.position[2],
                    v.position[0],
                    v.position[1],
                    v.position[2],
                ]),
                ..TopoSignature::empty()
            }),
        TopoKind::Shell => None,
    }
}
