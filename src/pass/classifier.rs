use crate::pass::QualifiedColumnIdentity;
use crate::tree::{ColumnNode, FunctionNode, Node, TableNode};

/// Internal pseudo-column injected by grouping-set expansion; never a real
/// storage column.
pub const GROUPING_SET_COLUMN: &str = "__grouping_set";

/// A function call structurally eligible for subcolumn rewriting, before the
/// eligibility-set membership check. Borrowed from the tree: valid for the
/// current traversal step only.
pub struct Candidate<'a> {
    pub function: &'a FunctionNode,
    pub column: &'a ColumnNode,
    pub table: &'a TableNode,
}

impl Candidate<'_> {
    pub fn identity(&self) -> QualifiedColumnIdentity {
        QualifiedColumnIdentity::new(&self.table.storage.full_name, &self.column.name)
    }
}

/// Decide whether `node` is a candidate. Total and side-effect-free: any
/// failed condition means "not a candidate", never an error.
///
/// Conditions: a function call with 1 or 2 arguments whose first argument is
/// a plain column (not the grouping-set pseudo-column) sourced from a table
/// whose storage supports subcolumn addressing, where the column is not
/// virtual and the type carried at this occurrence still equals the table's
/// declared type. The last check rejects stale or re-typed references,
/// e.g. a column wrapped by an implicit cast upstream.
pub fn match_candidate<'a>(node: &'a Node, tables: &'a [TableNode]) -> Option<Candidate<'a>> {
    let Node::Function(function) = node else {
        return None;
    };
    if function.args.is_empty() || function.args.len() > 2 {
        return None;
    }

    let Node::Column(column) = &function.args[0] else {
        return None;
    };
    if column.name == GROUPING_SET_COLUMN {
        return None;
    }

    let table = tables.get(column.source?.0)?;
    let storage = &table.storage;
    if !storage.supports_subcolumn_rewrite || storage.is_virtual_column(&column.name) {
        return None;
    }

    let declared = storage.column_type(&column.name)?;
    if *declared != column.data_type {
        return None;
    }

    Some(Candidate { function, column, table })
}
