pub mod boolean;
pub mod chamfer;
pub mod diff;
pub mod extrude;
pub mod fillet;
pub mod select;
pub mod shell;
pub mod sweep;
pub mod types;

pub use boolean::{execute_boolean, execute_union_all, require_single_lump, BooleanKind};
pub use chamfer::execute_chamfer;
pub use diff::{congruent, snapshot, TopoSnapshot};
pub use extrude::{execute_extrude, execute_symmetric_extrude};
pub use fillet::execute_fillet;
pub use select::{select_edges, select_faces};
pub use shell::execute_shell;
pub use sweep::execute_sweep;
pub use types::*;

use brick_kernel::{Kernel, KernelIntrospect};

/// A kernel that can both build and answer topology queries.
///
/// Operations take `&mut dyn KernelBundle` and read back through
/// [`KernelBundle::as_introspect`] between mutating calls.
pub trait KernelBundle: Kernel + KernelIntrospect {
    fn as_introspect(&self) -> &dyn KernelIntrospect;
}

impl<T: Kernel + KernelIntrospect> KernelBundle for T {
    fn as_introspect(&self) -> &dyn KernelIntrospect {
        self
    }
}
