use std::fmt::{self, Display};

use crate::functions::FunctionKind;
use crate::tree::{LiteralValue, TableId};
use crate::types::DataType;

/// One node of the query tree. The set of variants is closed on purpose:
/// the pass dispatches on it exhaustively, so "no rule matched" stays a
/// compile-checked question rather than a runtime surprise.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Function(FunctionNode),
    Column(ColumnNode),
    Constant(LiteralValue),
    /// Reference to a table node in the owning tree's arena.
    Table(TableId),
    Query(Box<QueryNode>),
}

/// A resolved function call. `result_type` is what upstream resolution
/// computed for this call and must be recomputed whenever the function
/// identity or the argument shape changes.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionNode {
    pub name: String,
    pub kind: FunctionKind,
    pub args: Vec<Node>,
    pub result_type: DataType,
}

/// A column reference. `source` is a non-owning index into the tree's table
/// arena; `None` means the column comes from a derived table or subquery and
/// is outside this pass's reach. `data_type` is the type carried at this
/// occurrence, which upstream stages may have altered (e.g. an implicit
/// cast) relative to the table's declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnNode {
    pub name: String,
    pub data_type: DataType,
    pub source: Option<TableId>,
}

/// Expression slots of one query body, enough to shape realistic trees:
/// every slot is traversed by `walk`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryNode {
    pub projection: Vec<Node>,
    pub from: Vec<Node>,
    pub filter: Option<Node>,
    pub group_by: Vec<Node>,
    pub having: Option<Node>,
    pub order_by: Vec<Node>,
}

impl Node {
    pub fn column(name: &str, data_type: DataType, source: TableId) -> Node {
        Node::Column(ColumnNode {
            name: name.to_string(),
            data_type,
            source: Some(source),
        })
    }

    /// Column without a table source (derived table / subquery output).
    pub fn unsourced_column(name: &str, data_type: DataType) -> Node {
        Node::Column(ColumnNode {
            name: name.to_string(),
            data_type,
            source: None,
        })
    }

    /// Type this node evaluates to, when it is an expression at all.
    pub fn result_type(&self) -> Option<DataType> {
        match self {
            Node::Function(function) => Some(function.result_type.clone()),
            Node::Column(column) => Some(column.data_type.clone()),
            Node::Constant(value) => Some(value.data_type()),
            Node::Table(_) | Node::Query(_) => None,
        }
    }

    /// Pre-order walk. The visitor returns `false` to stop the whole walk;
    /// the return value reports whether the walk ran to completion.
    pub fn walk<F: FnMut(&Node) -> bool>(&self, f: &mut F) -> bool {
        if !f(self) {
            return false;
        }
        match self {
            Node::Function(function) => {
                for arg in &function.args {
                    if !arg.walk(f) {
                        return false;
                    }
                }
            }
            Node::Query(query) => {
                for child in query.children() {
                    if !child.walk(f) {
                        return false;
                    }
                }
            }
            Node::Column(_) | Node::Constant(_) | Node::Table(_) => {}
        }
        true
    }
}

impl QueryNode {
    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.projection
            .iter()
            .chain(self.from.iter())
            .chain(self.filter.iter())
            .chain(self.group_by.iter())
            .chain(self.having.iter())
            .chain(self.order_by.iter())
    }

    pub fn children_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.projection
            .iter_mut()
            .chain(self.from.iter_mut())
            .chain(self.filter.iter_mut())
            .chain(self.group_by.iter_mut())
            .chain(self.having.iter_mut())
            .chain(self.order_by.iter_mut())
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Function(function) => {
                write!(f, "{}(", function.name)?;
                for (i, arg) in function.args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Node::Column(column) => write!(f, "{}", column.name),
            Node::Constant(value) => write!(f, "{}", value),
            Node::Table(id) => write!(f, "table#{}", id.0),
            Node::Query(_) => write!(f, "query"),
        }
    }
}
