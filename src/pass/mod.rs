pub mod qualified_column;
pub use qualified_column::*;

pub mod rewrite_error;
pub use rewrite_error::*;

pub mod classifier;
pub use classifier::*;

pub mod rules;
pub use rules::*;

pub mod collector;
pub use collector::*;

pub mod eligibility;
pub use eligibility::*;

pub mod rewriter;
pub use rewriter::*;

pub mod runner;
pub use runner::*;
