pub mod segy;

pub use segy::*;
