use brick_kernel::KernelSolidHandle;

/// Result of a modeling operation: the new solid plus diagnostics.
#[derive(Debug, Clone)]
pub struct OpResult {
    /// Handle to the solid in the kernel. Runtime-only, not persisted.
    pub handle: KernelSolidHandle,
    pub diagnostics: Diagnostics,
}

/// Non-fatal diagnostics from an operation.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    /// Warning messages.
    pub warnings: Vec<String>,
    /// Faces on the input solid(s).
    pub faces_before: usize,
    /// Faces on the output solid.
    pub faces_after: usize,
}

impl OpResult {
    pub(crate) fn new(handle: KernelSolidHandle, faces_before: usize, faces_after: usize) -> Self {
        Self {
            handle,
            diagnostics: Diagnostics {
                warnings: Vec::new(),
                faces_before,
                faces_after,
            },
        }
    }
}

/// Errors from modeling operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OpError {
    #[error("kernel error: {0}")]
    Kernel(#[from] brick_kernel::KernelError),

    #[error("sketch produced no faces")]
    NoFaces,

    #[error("selector matched nothing: {what}")]
    EmptySelection { what: String },

    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    #[error("solid has {lumps} disjoint lumps, expected one")]
    Disjoint { lumps: usize },
}
