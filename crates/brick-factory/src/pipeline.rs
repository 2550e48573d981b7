use brick_kernel::KernelSolidHandle;
use modeling_ops::OpResult;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::types::BrickError;

/// Construction stages of one part, in the order they may occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildStage {
    Dimensions,
    BaseBuilt,
    Studs,
    Ledges,
    SlopeGroove,
    Combined,
    Finished,
}

impl BuildStage {
    /// Whether `next` may directly follow `self`.
    ///
    /// Studs and ledges are independent additions to the base and may come
    /// in either order; the slope groove needs the ledges in place.
    pub fn can_advance_to(self, next: BuildStage) -> bool {
        use BuildStage::*;
        matches!(
            (self, next),
            (Dimensions, BaseBuilt)
                | (BaseBuilt, Studs)
                | (BaseBuilt, Ledges)
                | (Studs, Ledges)
                | (Ledges, Studs)
                | (Studs, Combined)
                | (Ledges, Combined)
                | (Ledges, SlopeGroove)
                | (SlopeGroove, Combined)
                | (Combined, Finished)
        )
    }
}

/// One completed stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageRecord {
    pub stage: BuildStage,
    /// Faces on the stage's output solid.
    pub faces: usize,
}

/// Record of a single construction call.
///
/// Each call gets a fresh build id. Stages are appended as they complete
/// and every append is checked against [`BuildStage::can_advance_to`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildTrace {
    pub build_id: Uuid,
    pub stages: Vec<StageRecord>,
    /// Non-fatal notes, such as an easing fallback or a skipped fillet.
    pub warnings: Vec<String>,
}

impl BuildTrace {
    /// A trace whose dimensions have just been derived.
    pub fn new() -> Self {
        Self {
            build_id: Uuid::new_v4(),
            stages: vec![StageRecord {
                stage: BuildStage::Dimensions,
                faces: 0,
            }],
            warnings: Vec::new(),
        }
    }

    /// The most recently completed stage.
    pub fn current(&self) -> BuildStage {
        self.stages
            .last()
            .map(|r| r.stage)
            .unwrap_or(BuildStage::Dimensions)
    }

    /// Record completion of `stage`, rejecting out-of-order or repeated stages.
    pub fn advance(&mut self, stage: BuildStage, faces: usize) -> Result<(), BrickError> {
        let from = self.current();
        let repeated = self.stages.iter().any(|r| r.stage == stage);
        if repeated || !from.can_advance_to(stage) {
            return Err(BrickError::StageOrder { from, to: stage });
        }
        info!(build_id = %self.build_id, ?stage, faces, "stage complete");
        self.stages.push(StageRecord { stage, faces });
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.current() == BuildStage::Finished
    }

    pub fn stage_names(&self) -> Vec<BuildStage> {
        self.stages.iter().map(|r| r.stage).collect()
    }

    pub fn warn(&mut self, message: String) {
        self.warnings.push(message);
    }

    /// Keep an operation's warnings and return its solid.
    pub fn absorb(&mut self, result: OpResult) -> KernelSolidHandle {
        for message in result.diagnostics.warnings {
            warn!(build_id = %self.build_id, %message, "operation warning");
            self.warn(message);
        }
        result.handle
    }
}

impl Default for BuildTrace {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangle_order_is_accepted() {
        let mut trace = BuildTrace::new();
        for stage in [
            BuildStage::BaseBuilt,
            BuildStage::Studs,
            BuildStage::Ledges,
            BuildStage::Combined,
            BuildStage::Finished,
        ] {
            trace.advance(stage, 1).unwrap();
        }
        assert!(trace.is_finished());
    }

    #[test]
    fn slope_order_is_accepted() {
        let mut trace = BuildTrace::new();
        for stage in [
            BuildStage::BaseBuilt,
            BuildStage::Ledges,
            BuildStage::SlopeGroove,
            BuildStage::Combined,
            BuildStage::Finished,
        ] {
            trace.advance(stage, 1).unwrap();
        }
        assert_eq!(trace.stages.len(), 6);
    }

    #[test]
    fn skipping_the_base_is_rejected() {
        let mut trace = BuildTrace::new();
        let err = trace.advance(BuildStage::Studs, 0).unwrap_err();
        assert!(matches!(
            err,
            BrickError::StageOrder {
                from: BuildStage::Dimensions,
                to: BuildStage::Studs
            }
        ));
    }

    #[test]
    fn repeating_a_stage_is_rejected() {
        let mut trace = BuildTrace::new();
        trace.advance(BuildStage::BaseBuilt, 0).unwrap();
        trace.advance(BuildStage::Studs, 0).unwrap();
        trace.advance(BuildStage::Ledges, 0).unwrap();
        assert!(trace.advance(BuildStage::Studs, 0).is_err());
    }

    #[test]
    fn finishing_twice_is_rejected() {
        let mut trace = BuildTrace::new();
        for stage in [
            BuildStage::BaseBuilt,
            BuildStage::Ledges,
            BuildStage::Combined,
            BuildStage::Finished,
        ] {
            trace.advance(stage, 0).unwrap();
        }
        assert!(trace.advance(BuildStage::Finished, 0).is_err());
    }

    #[test]
    fn each_trace_gets_its_own_id() {
        assert_ne!(BuildTrace::new().build_id, BuildTrace::new().build_id);
    }
}
