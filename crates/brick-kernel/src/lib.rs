pub mod mock_kernel;
pub mod profiles;
pub mod traits;
pub mod truck_introspect;
pub mod truck_kernel;
pub mod types;

pub use mock_kernel::MockKernel;
pub use traits::*;
pub use truck_kernel::TruckKernel;
pub use types::*;
