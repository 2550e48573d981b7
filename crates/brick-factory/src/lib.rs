pub mod base;
pub mod dimensions;
pub mod finish;
pub mod ledge;
pub mod pipeline;
pub mod profile;
pub mod slope;
pub mod studs;
pub mod types;

pub use base::tube_positions;
pub use dimensions::{DimensionTable, Dimensions};
pub use pipeline::{BuildStage, BuildTrace, StageRecord};
pub use profile::{ease, resolve_easing, SlopeProfile};
pub use studs::stud_positions;
pub use types::{Brick, BrickError, ConfigError};

use brick_kernel::KernelSolidHandle;
use brick_types::{BrickRequest, GridSpec};
use modeling_ops::{
    execute_boolean, execute_union_all, require_single_lump, BooleanKind, KernelBundle,
};
use tracing::{info, instrument};

/// Builds interlocking parts from grid parameters.
///
/// Holds one validated [`DimensionTable`] for its lifetime. Every call
/// builds a fresh solid in the given kernel and returns it with its
/// [`BuildTrace`]; any failing stage aborts the call.
#[derive(Debug, Clone)]
pub struct BrickFactory {
    table: DimensionTable,
    strict_easing: bool,
}

impl BrickFactory {
    /// A factory with the reference dimension table.
    pub fn new() -> Self {
        Self {
            table: DimensionTable::default(),
            strict_easing: false,
        }
    }

    /// A factory over a custom table, rejected if the table is inconsistent.
    pub fn with_table(table: DimensionTable) -> Result<Self, BrickError> {
        table.validate()?;
        Ok(Self {
            table,
            strict_easing: false,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, BrickError> {
        Ok(Self {
            table: DimensionTable::from_json(json)?,
            strict_easing: false,
        })
    }

    /// Fail on unknown easing names instead of falling back to `line`.
    pub fn strict(mut self) -> Self {
        self.strict_easing = true;
        self
    }

    pub fn table(&self) -> &DimensionTable {
        &self.table
    }

    /// Base slab with ledges, no studs.
    #[instrument(skip(self, kb))]
    pub fn base(
        &self,
        kb: &mut dyn KernelBundle,
        height: u32,
        width: u32,
        thickness: u32,
    ) -> Result<Brick, BrickError> {
        let grid = GridSpec::new(height, width, thickness);
        let dims = Dimensions::derive(&self.table, &grid)?;
        let mut trace = BuildTrace::new();
        let handle = self.base_with_ledges(kb, &dims, &grid, &mut trace)?;
        require_single_lump(kb.as_introspect(), &handle)?;
        trace.advance(BuildStage::Combined, kb.list_faces(&handle).len())?;
        Ok(Brick {
            handle,
            grid,
            dims,
            trace,
        })
    }

    /// Rectangular brick: base, ledges and studs, filleted.
    #[instrument(skip(self, kb))]
    pub fn make_rectangle(
        &self,
        kb: &mut dyn KernelBundle,
        height: u32,
        width: u32,
        thickness: u32,
    ) -> Result<Brick, BrickError> {
        let grid = GridSpec::new(height, width, thickness);
        let dims = Dimensions::derive(&self.table, &grid)?;
        let mut trace = BuildTrace::new();

        let walls = base::build_base(kb, &self.table, &dims, &grid)?;
        trace.advance(BuildStage::BaseBuilt, kb.list_faces(&walls).len())?;
        let studs = studs::build_studs(kb, &self.table, &dims, &grid)?;
        trace.advance(BuildStage::Studs, kb.list_faces(&studs).len())?;
        let ledges = ledge::build_ledges(kb, &self.table, &dims, &grid)?;
        trace.advance(BuildStage::Ledges, kb.list_faces(&ledges).len())?;

        let combined = trace.absorb(execute_union_all(kb, &[walls, ledges, studs])?);
        trace.advance(BuildStage::Combined, kb.list_faces(&combined).len())?;

        self.finish(kb, grid, dims, combined, trace)
    }

    /// Sloped brick whose top rises from `thickness_begin` to
    /// `thickness_end` layers across the width, with a groove along it.
    #[instrument(skip(self, kb))]
    pub fn make_slope(
        &self,
        kb: &mut dyn KernelBundle,
        height: u32,
        width: u32,
        thickness_begin: u32,
        thickness_end: u32,
        slope: &str,
    ) -> Result<Brick, BrickError> {
        if height < 2 {
            return Err(BrickError::InvalidDimension {
                reason: "Height must be greater than 1".to_string(),
            });
        }
        if thickness_begin < 1 || thickness_end < 1 {
            return Err(BrickError::InvalidDimension {
                reason: format!(
                    "slope thickness must be at least 1 unit, got {} to {}",
                    thickness_begin, thickness_end
                ),
            });
        }
        // An empty name picks the table's default law.
        let easing = if slope.is_empty() {
            self.table.default_easing
        } else {
            resolve_easing(slope, self.strict_easing)?
        };

        let grid = GridSpec::new(height, width, thickness_begin.max(thickness_end));
        let dims = Dimensions::derive(&self.table, &grid)?;
        let mut trace = BuildTrace::new();
        if !slope.is_empty() && easing.name() != slope {
            trace.warn(format!("easing '{}' replaced by '{}'", slope, easing));
        }

        let base = self.base_with_ledges(kb, &dims, &grid, &mut trace)?;
        let profile = SlopeProfile::generate(
            dims.outer_width,
            self.table.layer_thickness(thickness_begin),
            self.table.layer_thickness(thickness_end),
            easing,
            self.table.profile_resolution,
        );
        let sloped = slope::assemble_slope(kb, &self.table, &dims, &profile, &base)?;
        let faces = kb.list_faces(&sloped).len();
        trace.advance(BuildStage::SlopeGroove, faces)?;
        trace.advance(BuildStage::Combined, faces)?;

        self.finish(kb, grid, dims, sloped, trace)
    }

    /// Build whatever a request describes.
    pub fn build(
        &self,
        kb: &mut dyn KernelBundle,
        request: &BrickRequest,
    ) -> Result<Brick, BrickError> {
        match request {
            BrickRequest::Rectangle {
                height,
                width,
                thickness,
            } => self.make_rectangle(kb, *height, *width, *thickness),
            BrickRequest::Slope {
                height,
                width,
                thickness_begin,
                thickness_end,
                slope,
            } => self.make_slope(kb, *height, *width, *thickness_begin, *thickness_end, slope),
        }
    }

    fn base_with_ledges(
        &self,
        kb: &mut dyn KernelBundle,
        dims: &Dimensions,
        grid: &GridSpec,
        trace: &mut BuildTrace,
    ) -> Result<KernelSolidHandle, BrickError> {
        let walls = base::build_base(kb, &self.table, dims, grid)?;
        trace.advance(BuildStage::BaseBuilt, kb.list_faces(&walls).len())?;
        let ledges = ledge::build_ledges(kb, &self.table, dims, grid)?;
        let handle = trace.absorb(execute_boolean(kb, &walls, &ledges, BooleanKind::Union)?);
        trace.advance(BuildStage::Ledges, kb.list_faces(&handle).len())?;
        Ok(handle)
    }

    fn finish(
        &self,
        kb: &mut dyn KernelBundle,
        grid: GridSpec,
        dims: Dimensions,
        combined: KernelSolidHandle,
        mut trace: BuildTrace,
    ) -> Result<Brick, BrickError> {
        // A part must leave the pipeline as one piece.
        require_single_lump(kb.as_introspect(), &combined)?;
        let handle = finish::finish(kb, &self.table, &combined, &mut trace)?;
        trace.advance(BuildStage::Finished, kb.list_faces(&handle).len())?;
        info!(build_id = %trace.build_id, ?grid, "brick finished");
        Ok(Brick {
            handle,
            grid,
            dims,
            trace,
        })
    }
}

impl Default for BrickFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brick_kernel::{KernelIntrospect, MockKernel, Sketch, Workplane};
    use brick_types::SketchMode;
    use modeling_ops::{execute_extrude, OpError};

    #[test]
    fn disjoint_combination_fails_before_finishing() {
        let mut kernel = MockKernel::new();
        let factory = BrickFactory::new();
        let grid = GridSpec::new(1, 1, 1);
        let dims = Dimensions::derive(factory.table(), &grid).unwrap();

        let cube = Sketch::new().rect(4.0, 4.0, SketchMode::Add);
        let low = execute_extrude(&mut kernel, &cube, &Workplane::xy(), 4.0)
            .unwrap()
            .handle;
        let high = execute_extrude(&mut kernel, &cube, &Workplane::xy_at(20.0), 4.0)
            .unwrap()
            .handle;

        let mut trace = BuildTrace::new();
        trace.advance(BuildStage::BaseBuilt, 6).unwrap();
        trace.advance(BuildStage::Ledges, 6).unwrap();
        let combined = trace.absorb(execute_union_all(&mut kernel, &[low, high]).unwrap());
        trace.advance(BuildStage::Combined, 12).unwrap();
        assert_eq!(kernel.list_lumps(&combined).len(), 2);
        assert!(trace.warnings.iter().any(|w| w.contains("disjoint lumps")));

        let err = factory
            .finish(&mut kernel, grid, dims, combined, trace)
            .unwrap_err();
        assert!(matches!(
            err,
            BrickError::GeometryFailure(OpError::Disjoint { lumps: 2 })
        ));
    }
}
