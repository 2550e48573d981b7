pub mod easing;
pub mod grid;
pub mod sketch;
pub mod topo;

pub use easing::*;
pub use grid::*;
pub use sketch::*;
pub use topo::*;
