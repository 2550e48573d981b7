//! Sloped skin with a swept connector groove.

use brick_kernel::{KernelSolidHandle, ShellSide, Sketch, Workplane};
use brick_types::{Axis, FaceSelector, SketchMode};
use modeling_ops::{
    execute_boolean, execute_shell, execute_sweep, execute_symmetric_extrude, execute_union_all,
    select_faces, BooleanKind, KernelBundle,
};
use tracing::{debug, instrument};

use crate::dimensions::{DimensionTable, Dimensions};
use crate::profile::SlopeProfile;
use crate::types::BrickError;

/// Clip `base` to the slope envelope and cut the groove along its top.
///
/// `base` must already carry its ledges and be built at the larger of the
/// two end thicknesses, so that walls and tubes reach the skin everywhere.
#[instrument(skip(kb, table, profile, base), fields(easing = %profile.easing))]
pub fn assemble_slope(
    kb: &mut dyn KernelBundle,
    table: &DimensionTable,
    dims: &Dimensions,
    profile: &SlopeProfile,
    base: &KernelSolidHandle,
) -> Result<KernelSolidHandle, BrickError> {
    let half_length = dims.outer_height / 2.0;

    let outline = Sketch::new().polygon(&profile.outline(), SketchMode::Add);
    let envelope =
        execute_symmetric_extrude(kb, &outline, &Workplane::yz(), half_length)?.handle;

    let groove = sweep_groove(kb, table, profile)?;

    let caps = FaceSelector::Min(Axis::Y) | FaceSelector::Max(Axis::Y);
    let groove_caps = select_faces(kb.as_introspect(), &groove, &caps);
    let groove_tube =
        execute_shell(kb, &groove, &groove_caps, table.wall, ShellSide::Outward)?.handle;
    let groove_wall =
        execute_boolean(kb, &groove_tube, &envelope, BooleanKind::Intersect)?.handle;

    let bottom = select_faces(kb.as_introspect(), &envelope, &FaceSelector::Min(Axis::Z));
    let skin = execute_shell(kb, &envelope, &bottom, table.wall, ShellSide::Inward)?.handle;
    debug!(
        groove_caps = groove_caps.len(),
        bottom = bottom.len(),
        "slope skin and groove wall shelled"
    );

    let fused = execute_union_all(kb, &[base.clone(), skin, groove_wall])?.handle;
    let clipped = execute_boolean(kb, &fused, &envelope, BooleanKind::Intersect)?.handle;
    Ok(execute_boolean(kb, &clipped, &groove, BooleanKind::Subtract)?.handle)
}

/// Circle of groove radius swept along the profile samples.
fn sweep_groove(
    kb: &mut dyn KernelBundle,
    table: &DimensionTable,
    profile: &SlopeProfile,
) -> Result<KernelSolidHandle, BrickError> {
    let path = profile.path();
    let (start, next) = match path.as_slice() {
        [start, next, ..] => (*start, *next),
        _ => {
            return Err(BrickError::InvalidDimension {
                reason: "slope profile has fewer than two samples".to_string(),
            })
        }
    };
    let tangent = [next[0] - start[0], next[1] - start[1], next[2] - start[2]];
    let plane = Workplane::new(start, tangent, Axis::X.unit());
    let sketch = Sketch::new().circle(table.groove_radius, SketchMode::Add);
    Ok(execute_sweep(kb, &sketch, &plane, &path)?.handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::build_base;
    use crate::ledge::build_ledges;
    use brick_kernel::{KernelIntrospect, MockKernel};
    use brick_types::{Easing, GridSpec, TopoKind};

    fn slope(kernel: &mut MockKernel, easing: Easing) -> KernelSolidHandle {
        let table = DimensionTable::default();
        let grid = GridSpec::new(2, 4, 4);
        let dims = Dimensions::derive(&table, &grid).unwrap();
        let walls = build_base(kernel, &table, &dims, &grid).unwrap();
        let ledges = build_ledges(kernel, &table, &dims, &grid).unwrap();
        let base = execute_boolean(kernel, &walls, &ledges, BooleanKind::Union)
            .unwrap()
            .handle;
        let profile = SlopeProfile::generate(
            dims.outer_width,
            table.layer_thickness(2),
            table.layer_thickness(4),
            easing,
            table.profile_resolution,
        );
        assemble_slope(kernel, &table, &dims, &profile, &base).unwrap()
    }

    #[test]
    fn slope_is_one_lump_inside_envelope() {
        let mut kernel = MockKernel::new();
        let solid = slope(&mut kernel, Easing::Sine);
        assert_eq!(kernel.list_lumps(&solid).len(), 1);

        let bb = kernel.bounding_box(&solid).unwrap();
        assert!((bb.max[0] - 15.8).abs() < 1e-6);
        assert!((bb.max[1] - 31.8).abs() < 1e-6);
        assert!(bb.max[2] <= 37.9 + 1e-6);
        assert!(bb.min[2].abs() < 1e-6);
    }

    #[test]
    fn groove_faces_survive_the_cut() {
        let mut kernel = MockKernel::new();
        let solid = slope(&mut kernel, Easing::Line);
        let cylinders = kernel
            .compute_all_signatures(&solid, TopoKind::Face)
            .iter()
            .filter(|(_, s)| s.surface_type.as_deref() == Some("cylindrical"))
            .count();
        assert!(cylinders > 0);
    }
}
