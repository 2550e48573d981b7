use brick_kernel::{KernelId, KernelSolidHandle};
use tracing::{debug, instrument};

use crate::types::{OpError, OpResult};
use crate::KernelBundle;

/// Round the given edges of a solid.
#[instrument(skip(kb, solid, edges), fields(edges = edges.len()))]
pub fn execute_fillet(
    kb: &mut dyn KernelBundle,
    solid: &KernelSolidHandle,
    edges: &[KernelId],
    radius: f64,
) -> Result<OpResult, OpError> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(OpError::InvalidParameter {
            reason: "fillet radius must be positive".to_string(),
        });
    }
    if edges.is_empty() {
        return Err(OpError::EmptySelection {
            what: "fillet edges".to_string(),
        });
    }

    let faces_before = kb.list_faces(solid).len();
    let handle = kb.fillet_edges(solid, edges, radius)?;
    let faces_after = kb.list_faces(&handle).len();
    debug!(faces_before, faces_after, "fillet done");

    Ok(OpResult::new(handle, faces_before, faces_after))
}
