use brick_kernel::{KernelSolidHandle, Sketch, Workplane};
use tracing::{debug, instrument};

use crate::boolean::execute_union_all;
use crate::types::{OpError, OpResult};
use crate::KernelBundle;

/// Extrude every region of a sketch along the workplane normal and fuse
/// the pieces into one solid.
#[instrument(skip(kb, sketch, plane), fields(items = sketch.items.len()))]
pub fn execute_extrude(
    kb: &mut dyn KernelBundle,
    sketch: &Sketch,
    plane: &Workplane,
    depth: f64,
) -> Result<OpResult, OpError> {
    if !depth.is_finite() || depth <= 0.0 {
        return Err(OpError::InvalidParameter {
            reason: format!("extrude depth must be positive, got {}", depth),
        });
    }

    let face_ids = kb.make_faces(sketch, plane)?;
    if face_ids.is_empty() {
        return Err(OpError::NoFaces);
    }
    debug!(regions = face_ids.len(), "extruding sketch regions");

    let mut pieces: Vec<KernelSolidHandle> = Vec::with_capacity(face_ids.len());
    for face in face_ids {
        pieces.push(kb.extrude_face(face, plane.normal, depth)?);
    }
    execute_union_all(kb, &pieces)
}

/// Extrude `half_depth` to both sides of the workplane.
///
/// The sketch is placed on the plane shifted back by `half_depth` and
/// extruded through by twice that distance.
pub fn execute_symmetric_extrude(
    kb: &mut dyn KernelBundle,
    sketch: &Sketch,
    plane: &Workplane,
    half_depth: f64,
) -> Result<OpResult, OpError> {
    if !half_depth.is_finite() || half_depth <= 0.0 {
        return Err(OpError::InvalidParameter {
            reason: format!("symmetric extrude needs a positive half depth, got {}", half_depth),
        });
    }
    execute_extrude(kb, sketch, &plane.offset(-half_depth), 2.0 * half_depth)
}
