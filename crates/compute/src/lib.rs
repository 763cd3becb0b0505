pub mod analysis;
pub mod attributes;
pub mod autopick;
pub mod contour;
pub mod interpolate;
pub mod map;
pub mod params;

pub use attributes::*;
pub use interpolate::*;
pub use map::*;
pub use params::*;
