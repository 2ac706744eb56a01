pub mod types;
pub use types::DataType;

pub mod catalog;
pub use catalog::{SecondaryIndex, Storage, TableMetadata};

pub mod tree;
pub use tree::{LiteralValue, Node, QueryTree, TableId};

pub mod functions;
pub use functions::{FunctionKind, FunctionRegistry};

pub mod pass;
pub use pass::{PassContext, QualifiedColumnIdentity, RewriteError, Settings, run};
