pub mod bounds;
pub mod grid;
pub mod precision;

// Foundation crate: small, well-tested primitives only.
pub use bounds::*;
pub use grid::*;
pub use precision::*;
