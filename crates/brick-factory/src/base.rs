//! Hollow base slab: outer wall, top plate and interior support tubes.

use brick_kernel::{KernelSolidHandle, Sketch, Workplane};
use brick_types::{GridSpec, SketchMode};
use modeling_ops::{execute_boolean, execute_extrude, BooleanKind, KernelBundle};
use tracing::{debug, instrument};

use crate::dimensions::{DimensionTable, Dimensions};
use crate::types::BrickError;

/// Interior grid intersections, i.e. tube centers, in the XY plane.
pub fn tube_positions(table: &DimensionTable, grid: &GridSpec) -> Vec<[f64; 2]> {
    brick_types::rarray_locations(
        table.stud_spacing,
        table.stud_spacing,
        grid.height.saturating_sub(1),
        grid.width.saturating_sub(1),
    )
}

/// Build the open-bottomed base of a part.
///
/// The wall ring and the tubes rise the full solid thickness; a plate of
/// wall thickness closes the top. Multi-layer parts also get connecting
/// fins on each tube above the first layer.
#[instrument(skip(kb, table))]
pub fn build_base(
    kb: &mut dyn KernelBundle,
    table: &DimensionTable,
    dims: &Dimensions,
    grid: &GridSpec,
) -> Result<KernelSolidHandle, BrickError> {
    let tube_bore = table.inner_cylinder_radius - table.inner_cylinder_thickness;
    let sketch = Sketch::new()
        .rect(dims.outer_height, dims.outer_width, SketchMode::Add)
        .rect(dims.inner_height, dims.inner_width, SketchMode::Subtract)
        .rarray(
            table.stud_spacing,
            table.stud_spacing,
            grid.height.saturating_sub(1),
            grid.width.saturating_sub(1),
        )
        .circle(table.inner_cylinder_radius, SketchMode::Add)
        .circle(tube_bore, SketchMode::Subtract);
    let walls = execute_extrude(kb, &sketch, &Workplane::xy(), dims.solid_thickness)?;

    let plate_sketch =
        Sketch::new().rect(dims.outer_height, dims.outer_width, SketchMode::Add);
    let plate = execute_extrude(
        kb,
        &plate_sketch,
        &Workplane::xy_at(dims.solid_thickness - table.wall),
        table.wall,
    )?;
    let mut base = execute_boolean(kb, &walls.handle, &plate.handle, BooleanKind::Union)?.handle;

    let tubes = tube_positions(table, grid);
    debug!(tubes = tubes.len(), "base walls and tubes extruded");

    if grid.thickness > 1 && grid.height > 1 && !tubes.is_empty() {
        let fins = build_tube_fins(kb, table, dims, grid)?;
        base = execute_boolean(kb, &base, &fins, BooleanKind::Union)?.handle;
    }
    Ok(base)
}

/// Two fins per tube along ±X, from the first layer boundary to the top.
fn build_tube_fins(
    kb: &mut dyn KernelBundle,
    table: &DimensionTable,
    dims: &Dimensions,
    grid: &GridSpec,
) -> Result<KernelSolidHandle, BrickError> {
    // Fins start inside the tube wall so they fuse with it.
    let reach = table.inner_cylinder_radius - table.inner_cylinder_thickness / 2.0;
    let half_len = table.ledge_length / 2.0;
    let half_thk = table.ledge_thickness / 2.0;
    let fin = |cx: f64| {
        [
            [cx - half_len, -half_thk],
            [cx + half_len, -half_thk],
            [cx + half_len, half_thk],
            [cx - half_len, half_thk],
        ]
    };
    let offset = reach + half_len;
    let sketch = Sketch::new()
        .rarray(
            table.stud_spacing,
            table.stud_spacing,
            grid.height - 1,
            grid.width - 1,
        )
        .polygon(&fin(offset), SketchMode::Add)
        .polygon(&fin(-offset), SketchMode::Add);
    let rise = dims.solid_thickness - table.unit_thickness;
    debug!(fins = sketch.items.len(), rise, "tube fins");
    let fins = execute_extrude(kb, &sketch, &Workplane::xy_at(table.unit_thickness), rise)?;
    Ok(fins.handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use brick_kernel::{KernelIntrospect, MockKernel};
    use brick_types::TopoKind;

    fn base_for(kernel: &mut MockKernel, grid: GridSpec) -> KernelSolidHandle {
        let table = DimensionTable::default();
        let dims = Dimensions::derive(&table, &grid).unwrap();
        build_base(kernel, &table, &dims, &grid).unwrap()
    }

    fn cylinders(kernel: &MockKernel, solid: &KernelSolidHandle) -> usize {
        kernel
            .compute_all_signatures(solid, TopoKind::Face)
            .iter()
            .filter(|(_, s)| s.surface_type.as_deref() == Some("cylindrical"))
            .count()
    }

    #[test]
    fn tube_positions_cover_interior_intersections() {
        let table = DimensionTable::default();
        let pos = tube_positions(&table, &GridSpec::new(2, 4, 1));
        assert_eq!(pos, vec![[0.0, -16.0], [0.0, 0.0], [0.0, 16.0]]);
        assert!(tube_positions(&table, &GridSpec::new(1, 4, 1)).is_empty());
    }

    #[test]
    fn base_bounding_box_matches_footprint() {
        let mut kernel = MockKernel::new();
        let base = base_for(&mut kernel, GridSpec::new(2, 4, 1));
        let bb = kernel.bounding_box(&base).unwrap();
        assert!((bb.max[0] - 15.8).abs() < 1e-9);
        assert!((bb.max[1] - 31.8).abs() < 1e-9);
        assert!((bb.max[2] - 9.4).abs() < 1e-9);
        assert_eq!(bb.min[2], 0.0);
        assert_eq!(kernel.list_lumps(&base).len(), 1);
    }

    #[test]
    fn single_cell_base_has_no_tubes() {
        let mut kernel = MockKernel::new();
        let base = base_for(&mut kernel, GridSpec::new(1, 1, 1));
        assert_eq!(cylinders(&kernel, &base), 0);
    }

    #[test]
    fn tubes_contribute_two_cylinders_each() {
        let mut kernel = MockKernel::new();
        let base = base_for(&mut kernel, GridSpec::new(3, 3, 1));
        assert_eq!(cylinders(&kernel, &base), 2 * 4);
    }

    /// Centroids of downward-facing planar faces lying at height `z`.
    fn floors_at(kernel: &MockKernel, solid: &KernelSolidHandle, z: f64) -> Vec<[f64; 3]> {
        kernel
            .compute_all_signatures(solid, TopoKind::Face)
            .iter()
            .filter(|(_, s)| s.normal.is_some_and(|n| n[2] < -0.5))
            .filter_map(|(_, s)| s.centroid)
            .filter(|c| (c[2] - z).abs() < 1e-9)
            .collect()
    }

    #[test]
    fn tube_fins_rise_from_first_layer_to_top() {
        let mut kernel = MockKernel::new();
        let table = DimensionTable::default();
        let grid = GridSpec::new(2, 3, 2);
        let dims = Dimensions::derive(&table, &grid).unwrap();
        let fins = build_tube_fins(&mut kernel, &table, &dims, &grid).unwrap();

        let bb = kernel.bounding_box(&fins).unwrap();
        assert!((bb.min[2] - table.unit_thickness).abs() < 1e-9);
        assert!((bb.max[2] - dims.solid_thickness).abs() < 1e-9);
        assert_eq!(kernel.list_lumps(&fins).len(), 4);
    }

    #[test]
    fn tube_fins_flank_each_tube_along_x() {
        let mut kernel = MockKernel::new();
        let table = DimensionTable::default();
        let grid = GridSpec::new(2, 3, 2);
        let base = base_for(&mut kernel, grid);

        let offset = table.inner_cylinder_radius - table.inner_cylinder_thickness / 2.0
            + table.ledge_length / 2.0;
        let floors = floors_at(&kernel, &base, table.unit_thickness);
        assert_eq!(floors.len(), 2 * 2);
        for [tx, ty] in tube_positions(&table, &grid) {
            for side in [-1.0, 1.0] {
                let x = tx + side * offset;
                assert!(
                    floors
                        .iter()
                        .any(|c| (c[0] - x).abs() < 1e-9 && (c[1] - ty).abs() < 1e-9),
                    "no fin at ({}, {}) in {:?}",
                    x,
                    ty,
                    floors
                );
            }
        }
    }

    #[test]
    fn single_layer_base_has_no_fins() {
        let mut kernel = MockKernel::new();
        let table = DimensionTable::default();
        let base = base_for(&mut kernel, GridSpec::new(2, 2, 1));
        assert!(floors_at(&kernel, &base, table.unit_thickness).is_empty());
    }

    #[test]
    fn single_row_or_column_gets_no_fins() {
        let table = DimensionTable::default();
        for (h, w) in [(1, 3), (3, 1)] {
            let mut kernel = MockKernel::new();
            let thin = base_for(&mut kernel, GridSpec::new(h, w, 1));
            let thick = base_for(&mut kernel, GridSpec::new(h, w, 2));
            assert!(floors_at(&kernel, &thick, table.unit_thickness).is_empty());
            // Only the layer height differs.
            assert_eq!(kernel.list_faces(&thick).len(), kernel.list_faces(&thin).len());
            assert_eq!(kernel.list_edges(&thick).len(), kernel.list_edges(&thin).len());
        }
    }
}
