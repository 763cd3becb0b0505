pub mod spatial;
pub mod statistics;

pub use spatial::*;
pub use statistics::*;
