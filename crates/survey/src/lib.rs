pub mod error;
pub mod geometry;
pub mod picks;
pub mod section;
pub mod slice;
pub mod synthetic;
pub mod volume;

pub use error::*;
pub use geometry::*;
pub use picks::*;
pub use section::*;
pub use slice::*;
pub use synthetic::SyntheticSurvey;
pub use volume::*;
