pub mod literal;
pub use literal::*;

pub mod node;
pub use node::*;

pub mod query_tree;
pub use query_tree::*;
