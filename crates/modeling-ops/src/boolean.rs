use brick_kernel::{KernelIntrospect, KernelSolidHandle};
use tracing::{debug, instrument};

use crate::types::{OpError, OpResult};
use crate::KernelBundle;

/// Boolean operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanKind {
    Union,
    Subtract,
    Intersect,
}

/// Execute a boolean operation between two solids.
#[instrument(skip(kb, body_a, body_b))]
pub fn execute_boolean(
    kb: &mut dyn KernelBundle,
    body_a: &KernelSolidHandle,
    body_b: &KernelSolidHandle,
    kind: BooleanKind,
) -> Result<OpResult, OpError> {
    let faces_before = kb.list_faces(body_a).len() + kb.list_faces(body_b).len();

    let handle = match kind {
        BooleanKind::Union => kb.boolean_union(body_a, body_b)?,
        BooleanKind::Subtract => kb.boolean_subtract(body_a, body_b)?,
        BooleanKind::Intersect => kb.boolean_intersect(body_a, body_b)?,
    };

    let faces_after = kb.list_faces(&handle).len();
    let lumps = kb.list_lumps(&handle).len();
    debug!(faces_before, faces_after, lumps, "boolean done");

    let mut result = OpResult::new(handle, faces_before, faces_after);
    if kind == BooleanKind::Union && lumps > 1 {
        result
            .diagnostics
            .warnings
            .push(format!("union left {} disjoint lumps", lumps));
    }
    Ok(result)
}

/// Fuse a list of solids left to right.
///
/// A single body is returned as-is; an empty list is rejected.
pub fn execute_union_all(
    kb: &mut dyn KernelBundle,
    bodies: &[KernelSolidHandle],
) -> Result<OpResult, OpError> {
    let (first, rest) = bodies.split_first().ok_or(OpError::InvalidParameter {
        reason: "union of zero solids".to_string(),
    })?;

    let mut faces_before = kb.list_faces(first).len();
    let mut handle = first.clone();
    let mut warnings = Vec::new();
    for body in rest {
        faces_before += kb.list_faces(body).len();
        let step = execute_boolean(kb, &handle, body, BooleanKind::Union)?;
        handle = step.handle;
        warnings = step.diagnostics.warnings;
    }

    let faces_after = kb.list_faces(&handle).len();
    let mut result = OpResult::new(handle, faces_before, faces_after);
    result.diagnostics.warnings = warnings;
    Ok(result)
}

/// Reject a solid that is not one connected piece.
pub fn require_single_lump(
    introspect: &dyn KernelIntrospect,
    solid: &KernelSolidHandle,
) -> Result<(), OpError> {
    match introspect.list_lumps(solid).len() {
        1 => Ok(()),
        lumps => Err(OpError::Disjoint { lumps }),
    }
}
