pub mod resolve_error;
pub use resolve_error::*;

pub mod registry;
pub use registry::*;
