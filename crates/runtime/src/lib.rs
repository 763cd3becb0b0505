pub mod request;
pub mod session;

pub use request::*;
pub use session::*;
