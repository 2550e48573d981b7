use brick_kernel::{KernelSolidHandle, Sketch, Workplane};
use brick_types::{GridSpec, SketchMode};
use modeling_ops::{execute_extrude, KernelBundle};
use tracing::{debug, instrument};

use crate::dimensions::{DimensionTable, Dimensions};
use crate::types::BrickError;

/// Stud centers in the XY plane, one per grid cell.
pub fn stud_positions(table: &DimensionTable, grid: &GridSpec) -> Vec<[f64; 2]> {
    brick_types::rarray_locations(table.stud_spacing, table.stud_spacing, grid.height, grid.width)
}

/// Hollow posts standing on the top face of the base.
#[instrument(skip(kb, table))]
pub fn build_studs(
    kb: &mut dyn KernelBundle,
    table: &DimensionTable,
    dims: &Dimensions,
    grid: &GridSpec,
) -> Result<KernelSolidHandle, BrickError> {
    let sketch = Sketch::new()
        .rarray(table.stud_spacing, table.stud_spacing, grid.height, grid.width)
        .circle(table.stud_radius, SketchMode::Add)
        .circle(table.stud_radius - table.stud_thickness, SketchMode::Subtract);
    debug!(studs = sketch.locations().len(), "stud array");
    let studs = execute_extrude(
        kb,
        &sketch,
        &Workplane::xy_at(dims.solid_thickness),
        table.stud_height,
    )?;
    Ok(studs.handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use brick_kernel::{KernelIntrospect, MockKernel};

    #[test]
    fn one_post_per_cell() {
        let table = DimensionTable::default();
        let grid = GridSpec::new(2, 3, 1);
        let dims = Dimensions::derive(&table, &grid).unwrap();
        let mut kernel = MockKernel::new();
        let studs = build_studs(&mut kernel, &table, &dims, &grid).unwrap();

        assert_eq!(kernel.list_lumps(&studs).len(), 6);
        let bb = kernel.bounding_box(&studs).unwrap();
        assert!((bb.min[2] - 9.4).abs() < 1e-9);
        assert!((bb.max[2] - 13.15).abs() < 1e-9);
    }

    #[test]
    fn positions_sit_on_the_pitch() {
        let table = DimensionTable::default();
        let pos = stud_positions(&table, &GridSpec::new(2, 2, 1));
        assert_eq!(
            pos,
            vec![[-8.0, -8.0], [-8.0, 8.0], [8.0, -8.0], [8.0, 8.0]]
        );
    }
}
