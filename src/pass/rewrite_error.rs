use crate::functions::ResolveError;

/// Failures surfaced by the rewrite stage. The pass itself never fails: both
/// variants are collaborator-contract violations, propagated instead of
/// recovered so the enclosing optimization step aborts before the tree can
/// end up partially mutated.
#[derive(Debug, Clone, PartialEq)]
pub enum RewriteError {
    Resolve(ResolveError),
    TuplePositionOutOfRange { column: String, position: u64, field_count: usize },
}

impl From<ResolveError> for RewriteError {
    fn from(err: ResolveError) -> Self {
        RewriteError::Resolve(err)
    }
}
