use brick_kernel::{KernelId, KernelSolidHandle};
use tracing::{debug, instrument};

use crate::types::{OpError, OpResult};
use crate::KernelBundle;

/// Bevel the given edges of a solid.
///
/// `length` is cut back along the first face adjacent to each edge and
/// `length2` along the second; equal values give a symmetric chamfer.
#[instrument(skip(kb, solid, edges), fields(edges = edges.len()))]
pub fn execute_chamfer(
    kb: &mut dyn KernelBundle,
    solid: &KernelSolidHandle,
    edges: &[KernelId],
    length: f64,
    length2: f64,
) -> Result<OpResult, OpError> {
    for (name, value) in [("length", length), ("length2", length2)] {
        if !value.is_finite() || value <= 0.0 {
            return Err(OpError::InvalidParameter {
                reason: format!("chamfer {} must be positive, got {}", name, value),
            });
        }
    }
    if edges.is_empty() {
        return Err(OpError::EmptySelection {
            what: "chamfer edges".to_string(),
        });
    }

    let faces_before = kb.list_faces(solid).len();
    let handle = kb.chamfer_edges(solid, edges, length, length2)?;
    let faces_after = kb.list_faces(&handle).len();
    debug!(bevels = faces_after.saturating_sub(faces_before), "chamfer done");

    Ok(OpResult::new(handle, faces_before, faces_after))
}
