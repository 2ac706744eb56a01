pub mod table_metadata;
pub use table_metadata::*;

pub mod storage;
pub use storage::*;
