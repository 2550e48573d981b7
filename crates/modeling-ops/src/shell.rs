use brick_kernel::{KernelId, KernelSolidHandle, ShellSide};
use tracing::{debug, instrument};

use crate::types::{OpError, OpResult};
use crate::KernelBundle;

/// Hollow a solid: remove `faces_to_remove` and offset the remaining
/// faces by `thickness` to the given side.
#[instrument(skip(kb, solid, faces_to_remove), fields(removed = faces_to_remove.len()))]
pub fn execute_shell(
    kb: &mut dyn KernelBundle,
    solid: &KernelSolidHandle,
    faces_to_remove: &[KernelId],
    thickness: f64,
    side: ShellSide,
) -> Result<OpResult, OpError> {
    if !thickness.is_finite() || thickness <= 0.0 {
        return Err(OpError::InvalidParameter {
            reason: "shell thickness must be positive".to_string(),
        });
    }

    let faces_before = kb.list_faces(solid).len();
    let handle = kb.shell(solid, faces_to_remove, thickness, side)?;
    let faces_after = kb.list_faces(&handle).len();
    debug!(faces_before, faces_after, "shell done");

    Ok(OpResult::new(handle, faces_before, faces_after))
}
