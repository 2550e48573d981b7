use brick_kernel::KernelSolidHandle;
use brick_types::GridSpec;
use modeling_ops::OpError;

use crate::dimensions::Dimensions;
use crate::pipeline::{BuildStage, BuildTrace};

/// One finished part: the kernel solid plus how it was built.
#[derive(Debug, Clone)]
pub struct Brick {
    /// Handle to the solid in the kernel that built it.
    pub handle: KernelSolidHandle,
    pub grid: GridSpec,
    pub dims: Dimensions,
    pub trace: BuildTrace,
}

/// Errors from the brick pipeline.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BrickError {
    #[error("invalid dimension: {reason}")]
    InvalidDimension { reason: String },

    #[error("unknown easing law '{name}' (expected line, sine, quad or cubic)")]
    InvalidEasing { name: String },

    #[error("geometry failure: {0}")]
    GeometryFailure(#[from] OpError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("stage {to:?} cannot follow {from:?}")]
    StageOrder { from: BuildStage, to: BuildStage },
}

/// Errors from loading or checking a dimension table.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse dimension table: {0}")]
    Parse(String),

    #[error("dimension table violates constraint: {reason}")]
    Constraint { reason: String },
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}
