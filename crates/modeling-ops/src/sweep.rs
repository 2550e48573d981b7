use brick_kernel::{KernelSolidHandle, Sketch, Workplane};
use tracing::{debug, instrument};

use crate::boolean::execute_union_all;
use crate::types::{OpError, OpResult};
use crate::KernelBundle;

/// Sweep every region of a sketch along a polyline path.
///
/// The sketch plane should sit on `path[0]` with its normal along the
/// first segment; the kernel carries the profile rigidly from there.
#[instrument(skip(kb, sketch, plane, path), fields(stations = path.len()))]
pub fn execute_sweep(
    kb: &mut dyn KernelBundle,
    sketch: &Sketch,
    plane: &Workplane,
    path: &[[f64; 3]],
) -> Result<OpResult, OpError> {
    if path.len() < 2 {
        return Err(OpError::InvalidParameter {
            reason: format!("sweep path needs at least 2 points, got {}", path.len()),
        });
    }

    let face_ids = kb.make_faces(sketch, plane)?;
    if face_ids.is_empty() {
        return Err(OpError::NoFaces);
    }
    let path_id = kb.make_path(path)?;
    debug!(regions = face_ids.len(), "sweeping sketch regions");

    let mut pieces: Vec<KernelSolidHandle> = Vec::with_capacity(face_ids.len());
    for face in face_ids {
        pieces.push(kb.sweep_face(face, path_id)?);
    }
    execute_union_all(kb, &pieces)
}
