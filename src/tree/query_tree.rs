use std::sync::Arc;

use crate::catalog::Storage;
use crate::tree::{Node, QueryNode};

/// Index of a table node in the tree's arena. Column nodes keep one of these
/// instead of a reference, so trees clone and move freely without dangling
/// back-references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableId(pub usize);

/// A table expression as it appears in the query: the storage handle plus
/// the per-occurrence modifiers. `final_modifier` requests row-merge
/// semantics at read time and disqualifies the whole tree from subcolumn
/// rewriting.
#[derive(Debug, Clone, PartialEq)]
pub struct TableNode {
    pub storage: Arc<Storage>,
    pub final_modifier: bool,
}

/// The query tree: a root node plus the arena owning every table node.
/// Several column nodes (and, on self-joins, several `Node::Table` slots)
/// may point at the same arena entry.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryTree {
    pub root: Node,
    pub tables: Vec<TableNode>,
}

impl QueryTree {
    pub fn new() -> Self {
        Self {
            root: Node::Query(Box::new(QueryNode::default())),
            tables: Vec::new(),
        }
    }

    pub fn add_table(&mut self, storage: Arc<Storage>) -> TableId {
        self.add_table_with_final(storage, false)
    }

    pub fn add_table_with_final(&mut self, storage: Arc<Storage>, final_modifier: bool) -> TableId {
        let id = TableId(self.tables.len());
        self.tables.push(TableNode { storage, final_modifier });
        id
    }

    pub fn table(&self, id: TableId) -> &TableNode {
        &self.tables[id.0]
    }
}

impl Default for QueryTree {
    fn default() -> Self {
        Self::new()
    }
}
