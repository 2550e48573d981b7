//! TruckKernel: real geometry kernel wrapping truck's API.

use crate::profiles;
use crate::traits::Kernel;
use crate::types::*;
use std::collections::HashMap;

// Import truck types selectively to avoid shadowing std::result::Result
use truck_modeling::builder;
use truck_modeling::topology::{Face, Solid};
use truck_modeling::{InnerSpace, Vector3};

/// Boolean tolerance handed to truck-shapeops.
const BOOLEAN_TOL: f64 = 0.05;

/// Real geometry kernel backed by the truck BREP library.
///
/// Extrusion and booleans are native. truck has no blend, offset or
/// path-sweep operations, so those report `NotSupported`.
pub struct TruckKernel {
    next_handle: u64,
    next_id: u64,
    solids: HashMap<u64, Solid>,
    /// Standalone faces created by make_faces, awaiting extrude.
    standalone_faces: HashMap<u64, Face>,
    paths: HashMap<u64, Vec<[f64; 3]>>,
}

impl TruckKernel {
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            next_id: 1,
            solids: HashMap::new(),
            standalone_faces: HashMap::new(),
            paths: HashMap::new(),
        }
    }

    fn alloc_handle(&mut self) -> KernelSolidHandle {
        let h = KernelSolidHandle(self.next_handle);
        self.next_handle += 1;
        h
    }

    fn alloc_id(&mut self) -> KernelId {
        let id = KernelId(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn store_solid(&mut self, solid: Solid) -> KernelSolidHandle {
        let handle = self.alloc_handle();
        self.solids.insert(handle.id(), solid);
        handle
    }

    pub(crate) fn get_solid(&self, handle: &KernelSolidHandle) -> Option<&Solid> {
        self.solids.get(&handle.id())
    }

    fn solid(&self, handle: &KernelSolidHandle) -> Result<Solid, KernelError> {
        self.get_solid(handle)
            .cloned()
            .ok_or(KernelError::EntityNotFound {
                id: KernelId(handle.id()),
            })
    }
}

impl Default for TruckKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel for TruckKernel {
    fn make_faces(
        &mut self,
        sketch: &Sketch,
        plane: &Workplane,
    ) -> Result<Vec<KernelId>, KernelError> {
        let mut face_ids = Vec::new();
        for region in sketch.regions() {
            let face = profiles::region_face(&region, plane)?;
            let face_id = self.alloc_id();
            self.standalone_faces.insert(face_id.0, face);
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
        let truck_face = self
            .standalone_faces
            .remove(&face.0)
            .ok_or(KernelError::EntityNotFound { id: face })?;

        let dir = Vector3::new(direction[0], direction[1], direction[2]);
        if dir.magnitude() < 1e-12 {
            return Err(KernelError::Other {
                message: "extrude direction has zero length".to_string(),
            });
        }
        let sweep_vec = dir.normalize() * depth;

        let solid = builder::tsweep(&truck_face, sweep_vec);
        Ok(self.store_solid(solid))
    }

    fn sweep_face(
        &mut self,
        face: KernelId,
        path: KernelId,
    ) -> Result<KernelSolidHandle, KernelError> {
        if !self.standalone_faces.contains_key(&face.0) {
            return Err(KernelError::EntityNotFound { id: face });
        }
        if !self.paths.contains_key(&path.0) {
            return Err(KernelError::EntityNotFound { id: path });
        }
        Err(KernelError::NotSupported {
            operation: "sweep_face".to_string(),
        })
    }

    fn boolean_union(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError> {
        let solid_a = self.solid(a)?;
        let solid_b = self.solid(b)?;

        let result = truck_shapeops::or(&solid_a, &solid_b, BOOLEAN_TOL).ok_or_else(|| {
            KernelError::BooleanFailed {
                reason: "truck or() returned None".to_string(),
            }
        })?;
        Ok(self.store_solid(result))
    }

    fn boolean_subtract(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError> {
        let solid_a = self.solid(a)?;
        let mut solid_b = self.solid(b)?;

        // Subtraction = A ∩ ¬B. not() mutates in place.
        solid_b.not();
        let result = truck_shapeops::and(&solid_a, &solid_b, BOOLEAN_TOL).ok_or_else(|| {
            KernelError::BooleanFailed {
                reason: "truck and() returned None for subtraction".to_string(),
            }
        })?;
        Ok(self.store_solid(result))
    }

    fn boolean_intersect(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError> {
        let solid_a = self.solid(a)?;
        let solid_b = self.solid(b)?;

        let result = truck_shapeops::and(&solid_a, &solid_b, BOOLEAN_TOL).ok_or_else(|| {
            KernelError::BooleanFailed {
                reason: "truck and() returned None".to_string(),
            }
        })?;
        Ok(self.store_solid(result))
    }

    fn fillet_edges(
        &mut self,
        _solid: &KernelSolidHandle,
        _edges: &[KernelId],
        _radius: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        Err(KernelError::NotSupported {
            operation: "fillet_edges".to_string(),
        })
    }

    fn chamfer_edges(
        &mut self,
        _solid: &KernelSolidHandle,
        _edges: &[KernelId],
        _length: f64,
        _length2: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        Err(KernelError::NotSupported {
            operation: "chamfer_edges".to_string(),
        })
    }

    fn shell(
        &mut self,
        _solid: &KernelSolidHandle,
        _faces_to_remove: &[KernelId],
        _thickness: f64,
        _side: ShellSide,
    ) -> Result<KernelSolidHandle, KernelError> {
        Err(KernelError::NotSupported {
            operation: "shell".to_string(),
        })
    }
}
