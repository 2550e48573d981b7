use crate::types::*;

/// Core geometry kernel trait. Provides all shape construction and modification operations.
/// Implemented by TruckKernel (wraps real truck) and MockKernel (deterministic test double).
pub trait Kernel {
    /// Create one planar face per connected region of a sketch placed on a workplane.
    fn make_faces(
        &mut self,
        sketch: &Sketch,
        plane: &Workplane,
    ) -> Result<Vec<KernelId>, KernelError>;

    /// Register a polyline path for a later sweep.
    fn make_path(&mut self, points: &[[f64; 3]]) -> Result<KernelId, KernelError>;

    /// Extrude a planar face along a direction vector.
    fn extrude_face(
        &mut self,
        face: KernelId,
        direction: [f64; 3],
        depth: f64,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Sweep a planar face along a path created by [`Kernel::make_path`].
    fn sweep_face(
        &mut self,
        face: KernelId,
        path: KernelId,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Boolean union of two solids.
    fn boolean_union(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Boolean subtraction: a minus b.
    fn boolean_subtract(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Boolean intersection of two solids.
    fn boolean_intersect(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Fillet (round) the specified edges with the given radius.
    fn fillet_edges(
        &mut self,
        solid: &KernelSolidHandle,
        edges: &[KernelId],
        radius: f64,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Chamfer the specified edges. `length` is measured on the first
    /// adjacent face and `length2` on the second.
    fn chamfer_edges(
        &mut self,
        solid: &KernelSolidHandle,
        edges: &[KernelId],
        length: f64,
        length2: f64,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Hollow a solid, removing `faces_to_remove` and leaving walls of `thickness`.
    fn shell(
        &mut self,
        solid: &KernelSolidHandle,
        faces_to_remove: &[KernelId],
        thickness: f64,
        side: ShellSide,
    ) -> Result<KernelSolidHandle, KernelError>;
}

/// Topology introspection trait. Provides read-only queries on kernel geometry.
pub trait KernelIntrospect {
    /// List the connected solid pieces of a solid.
    fn list_lumps(&self, solid: &KernelSolidHandle) -> Vec<KernelId>;

    /// List all faces of a solid.
    fn list_faces(&self, solid: &KernelSolidHandle) -> Vec<KernelId>;

    /// List all edges of a solid.
    fn list_edges(&self, solid: &KernelSolidHandle) -> Vec<KernelId>;

    /// List all vertices of a solid.
    fn list_vertices(&self, solid: &KernelSolidHandle) -> Vec<KernelId>;

    /// Get the edges bounding a face.
    fn face_edges(&self, face: KernelId) -> Vec<KernelId>;

    /// Get the faces adjacent to an edge.
    fn edge_faces(&self, edge: KernelId) -> Vec<KernelId>;

    /// Get the vertices at the ends of an edge.
    fn edge_vertices(&self, edge: KernelId) -> (KernelId, KernelId);

    /// Get the faces sharing an edge with the given face.
    fn face_neighbors(&self, face: KernelId) -> Vec<KernelId>;

    /// Compute the geometric signature of a single entity.
    fn compute_signature(&self, entity: KernelId, kind: TopoKind) -> TopoSignature;

    /// Compute signatures for all entities of a given kind in a solid.
    fn compute_all_signatures(
        &self,
        solid: &KernelSolidHandle,
        kind: TopoKind,
    ) -> Vec<(KernelId, TopoSignature)>;

    /// Bounding box of the whole solid, from its lump signatures.
    fn bounding_box(&self, solid: &KernelSolidHandle) -> Option<Aabb> {
        self.compute_all_signatures(solid, TopoKind::Solid)
            .into_iter()
            .filter_map(|(_, sig)| sig.bbox.map(Aabb::from_array))
            .reduce(|a, b| a.union(&b))
    }
}
