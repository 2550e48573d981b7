//! Retention fins along the inside of the four outer walls.

use brick_kernel::{KernelSolidHandle, Sketch, Workplane};
use brick_types::{Axis, EdgeSelector, GridSpec, SketchMode};
use modeling_ops::{
    execute_boolean, execute_chamfer, execute_extrude, select_edges, BooleanKind, KernelBundle,
};
use tracing::{debug, instrument};

use crate::dimensions::{DimensionTable, Dimensions};
use crate::types::BrickError;

/// Inner bottom edges of a fin family running along `along`.
///
/// The fins' short side is parallel to `across`; edges at the family's
/// extreme positions along `along` sit against the outer wall and are left
/// alone.
fn inner_bottom_edges(along: Axis, across: Axis) -> EdgeSelector {
    EdgeSelector::ParallelTo(across)
        & EdgeSelector::Min(Axis::Z)
        & !(EdgeSelector::Min(along) | EdgeSelector::Max(along))
}

fn fin_family(
    kb: &mut dyn KernelBundle,
    table: &DimensionTable,
    dims: &Dimensions,
    sketch: Sketch,
    along: Axis,
    across: Axis,
) -> Result<KernelSolidHandle, BrickError> {
    let fins = execute_extrude(kb, &sketch, &Workplane::xy(), dims.solid_thickness)?;
    let edges = select_edges(kb.as_introspect(), &fins.handle, &inner_bottom_edges(along, across));
    debug!(?along, fins = sketch.items.len(), chamfered = edges.len(), "ledge family");
    let [length, length2] = table.ledge_chamfer;
    Ok(execute_chamfer(kb, &fins.handle, &edges, length, length2)?.handle)
}

/// Both fin families, chamfered and fused.
///
/// The X family stands against the two walls normal to X, one fin per
/// column; the Y family against the walls normal to Y, one fin per row.
#[instrument(skip(kb, table))]
pub fn build_ledges(
    kb: &mut dyn KernelBundle,
    table: &DimensionTable,
    dims: &Dimensions,
    grid: &GridSpec,
) -> Result<KernelSolidHandle, BrickError> {
    let x_family = Sketch::new()
        .rarray(
            dims.outer_height - table.ledge_length,
            table.stud_spacing,
            2,
            grid.width,
        )
        .rect(table.ledge_length, table.ledge_thickness, SketchMode::Add);
    let y_family = Sketch::new()
        .rarray(
            table.stud_spacing,
            dims.outer_width - table.ledge_length,
            grid.height,
            2,
        )
        .rect(table.ledge_thickness, table.ledge_length, SketchMode::Add);

    let x = fin_family(kb, table, dims, x_family, Axis::X, Axis::Y)?;
    let y = fin_family(kb, table, dims, y_family, Axis::Y, Axis::X)?;
    Ok(execute_boolean(kb, &x, &y, BooleanKind::Union)?.handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use brick_kernel::{KernelIntrospect, MockKernel};
    use brick_types::TopoKind;

    fn ledges_for(kernel: &mut MockKernel, grid: GridSpec) -> KernelSolidHandle {
        let table = DimensionTable::default();
        let dims = Dimensions::derive(&table, &grid).unwrap();
        build_ledges(kernel, &table, &dims, &grid).unwrap()
    }

    fn chamfer_faces(kernel: &MockKernel, solid: &KernelSolidHandle) -> usize {
        kernel
            .compute_all_signatures(solid, TopoKind::Face)
            .iter()
            .filter(|(_, s)| {
                s.surface_type.as_deref() == Some("planar")
                    && s.normal.is_some_and(|n| n[2].abs() > 1e-6 && n[2].abs() < 1.0 - 1e-6)
            })
            .count()
    }

    #[test]
    fn four_positions_per_side_on_two_by_four() {
        let mut kernel = MockKernel::new();
        let ledges = ledges_for(&mut kernel, GridSpec::new(2, 4, 4));
        // 2 × 4 fins in the X family, 2 × 2 in the Y family.
        assert_eq!(kernel.list_lumps(&ledges).len(), 12);
        assert_eq!(chamfer_faces(&kernel, &ledges), 12);
    }

    #[test]
    fn single_cell_still_gets_fins() {
        let mut kernel = MockKernel::new();
        let ledges = ledges_for(&mut kernel, GridSpec::new(1, 1, 1));
        assert_eq!(kernel.list_lumps(&ledges).len(), 4);
    }

    #[test]
    fn fins_stay_inside_the_footprint() {
        let mut kernel = MockKernel::new();
        let ledges = ledges_for(&mut kernel, GridSpec::new(2, 4, 1));
        let bb = kernel.bounding_box(&ledges).unwrap();
        assert!(bb.max[0] <= 15.8 + 1e-9);
        assert!(bb.max[1] <= 31.8 + 1e-9);
        assert!((bb.max[2] - 9.4).abs() < 1e-9);
    }
}
