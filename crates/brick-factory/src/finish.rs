use brick_kernel::KernelSolidHandle;
use brick_types::{Axis, EdgeSelector, FaceSelector};
use modeling_ops::{execute_fillet, select_edges, KernelBundle};
use tracing::{debug, instrument};

use crate::dimensions::DimensionTable;
use crate::pipeline::BuildTrace;
use crate::types::BrickError;

/// Vertical edges on the four outer side faces.
pub fn side_edges() -> EdgeSelector {
    let sides = FaceSelector::Min(Axis::X)
        | FaceSelector::Max(Axis::X)
        | FaceSelector::Min(Axis::Y)
        | FaceSelector::Max(Axis::Y);
    EdgeSelector::ParallelTo(Axis::Z) & EdgeSelector::OfFaces(sides)
}

/// Every edge of the topmost faces.
pub fn top_edges() -> EdgeSelector {
    EdgeSelector::OfFaces(FaceSelector::Max(Axis::Z))
}

/// Round the outer vertical corners, then the top-face edges.
///
/// A selector that matches nothing is noted in the trace and skipped;
/// kernel failures propagate.
#[instrument(skip_all, fields(build_id = %trace.build_id))]
pub fn finish(
    kb: &mut dyn KernelBundle,
    table: &DimensionTable,
    solid: &KernelSolidHandle,
    trace: &mut BuildTrace,
) -> Result<KernelSolidHandle, BrickError> {
    let mut current = solid.clone();
    for (name, selector, radius) in [
        ("side", side_edges(), table.side_fillet),
        ("top", top_edges(), table.top_fillet),
    ] {
        let edges = select_edges(kb.as_introspect(), &current, &selector);
        debug!(pass = name, edges = edges.len(), radius, "fillet selection");
        if edges.is_empty() {
            trace.warn(format!("{} fillet matched no edges", name));
            continue;
        }
        current = execute_fillet(kb, &current, &edges, radius)?.handle;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use brick_kernel::{KernelIntrospect, MockKernel, Sketch, Workplane};
    use brick_types::{SketchMode, TopoKind};
    use modeling_ops::execute_extrude;

    fn faces_of_type(kernel: &MockKernel, solid: &KernelSolidHandle, ty: &str) -> usize {
        kernel
            .compute_all_signatures(solid, TopoKind::Face)
            .iter()
            .filter(|(_, s)| s.surface_type.as_deref() == Some(ty))
            .count()
    }

    #[test]
    fn block_rounds_corners_then_top_outline() {
        let mut kernel = MockKernel::new();
        let sketch = Sketch::new().rect(15.6, 15.6, SketchMode::Add);
        let block = execute_extrude(&mut kernel, &sketch, &Workplane::xy(), 9.4)
            .unwrap()
            .handle;
        let mut trace = BuildTrace::new();
        let done = finish(&mut kernel, &DimensionTable::default(), &block, &mut trace).unwrap();

        assert_eq!(select_edges(&kernel, &block, &side_edges()).len(), 4);
        assert_eq!(select_edges(&kernel, &block, &top_edges()).len(), 4);
        // Four corners, then the top outline: four lines and four corner arcs.
        assert_eq!(faces_of_type(&kernel, &done, "cylindrical"), 4 + 8);
        assert!(trace.warnings.is_empty());
    }

    #[test]
    fn truck_backend_cannot_fillet() {
        let mut kernel = brick_kernel::TruckKernel::new();
        let sketch = Sketch::new().rect(15.6, 15.6, SketchMode::Add);
        let block = execute_extrude(&mut kernel, &sketch, &Workplane::xy(), 9.4)
            .unwrap()
            .handle;
        let mut trace = BuildTrace::new();
        let err = finish(&mut kernel, &DimensionTable::default(), &block, &mut trace).unwrap_err();
        assert!(matches!(err, BrickError::GeometryFailure(_)));
    }
}
