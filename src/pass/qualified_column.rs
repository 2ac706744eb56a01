use std::fmt::{self, Display};

/// (table full name, column name) pair: the unit of eligibility tracking.
/// Every syntactic reference to the same physical column in the same table
/// shares one identity, wherever in the query it occurs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedColumnIdentity {
    pub table: String,
    pub column: String,
}

impl QualifiedColumnIdentity {
    pub fn new(table: &str, column: &str) -> Self {
        Self { table: table.to_string(), column: column.to_string() }
    }
}

impl Display for QualifiedColumnIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}
