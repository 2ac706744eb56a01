use indexmap::IndexSet;
use tracing::trace;

use crate::functions::{FunctionKind, FunctionRegistry};
use crate::pass::{
    Candidate, QualifiedColumnIdentity, RewriteError, Rule, match_candidate, match_rule,
};
use crate::tree::{ColumnNode, LiteralValue, Node, TableNode};
use crate::types::DataType;

/// Outcome of matching one candidate against the rule table. Computed in
/// full (subcolumn names resolved, new calls re-resolved) before any
/// mutation, then applied in one step: a rule that fails one of its
/// preconditions leaves the node completely untouched.
#[derive(Debug)]
pub enum RewriteAction {
    ReplaceNode(Node),
    /// Swap the first argument and rename the call, keeping the node and the
    /// remaining arguments in place.
    ReplaceFirstArgument {
        argument: Node,
        function_name: String,
        result_type: DataType,
    },
}

impl RewriteAction {
    fn apply(self, node: &mut Node) {
        match self {
            RewriteAction::ReplaceNode(new_node) => *node = new_node,
            RewriteAction::ReplaceFirstArgument { argument, function_name, result_type } => {
                if let Node::Function(function) = node {
                    function.args[0] = argument;
                    function.name = function_name;
                    function.result_type = result_type;
                }
            }
        }
    }
}

/// Second pass: top-down mutating traversal over the tree, applying the rule
/// table to candidates whose qualified identity made it into the eligible
/// set.
pub struct Rewriter<'a> {
    pub tables: &'a [TableNode],
    pub eligible: &'a IndexSet<QualifiedColumnIdentity>,
    pub registry: &'a FunctionRegistry,
}

impl Rewriter<'_> {
    pub fn rewrite(&self, node: &mut Node) -> Result<(), RewriteError> {
        if let Some(action) = self.plan(node)? {
            trace!(node = %node, "rewriting to subcolumn access");
            action.apply(node);
        }

        // Descend into whatever now stands at this position. Freshly made
        // subcolumn references are not candidates (their names are not
        // declared columns), so this cannot loop.
        match node {
            Node::Function(function) => {
                for arg in &mut function.args {
                    self.rewrite(arg)?;
                }
            }
            Node::Query(query) => {
                for child in query.children_mut() {
                    self.rewrite(child)?;
                }
            }
            Node::Column(_) | Node::Constant(_) | Node::Table(_) => {}
        }
        Ok(())
    }

    fn plan(&self, node: &Node) -> Result<Option<RewriteAction>, RewriteError> {
        let Some(candidate) = match_candidate(node, self.tables) else {
            return Ok(None);
        };
        if !self.eligible.contains(&candidate.identity()) {
            return Ok(None);
        }
        let Some(rule) = match_rule(candidate.function, &candidate.column.data_type) else {
            return Ok(None);
        };
        self.plan_rule(rule, &candidate)
    }

    fn plan_rule(
        &self,
        rule: Rule,
        candidate: &Candidate<'_>,
    ) -> Result<Option<RewriteAction>, RewriteError> {
        let column = candidate.column;
        let function = candidate.function;

        match rule {
            // length(arr) / length(m) -> col.size0
            Rule::ArrayLength | Rule::MapLength => Ok(Some(RewriteAction::ReplaceNode(
                subcolumn(column, "size0", DataType::UInt64),
            ))),

            // empty(arr) -> equals(arr.size0, 0)
            Rule::ArrayEmpty => self.size_comparison("equals", column),

            // notEmpty(arr) -> notEquals(arr.size0, 0)
            Rule::ArrayNotEmpty => self.size_comparison("notEquals", column),

            // count(n) -> sum(not(n.null))
            Rule::NullableCount => {
                let flag = subcolumn(column, "null", DataType::UInt8);
                let negated = self.registry.build_ordinary("not", vec![flag])?;
                let sum = self.registry.build_aggregate("sum", vec![Node::Function(negated)])?;
                Ok(Some(RewriteAction::ReplaceNode(Node::Function(sum))))
            }

            // isNull(n) -> n.null
            Rule::NullableIsNull => Ok(Some(RewriteAction::ReplaceNode(subcolumn(
                column,
                "null",
                DataType::UInt8,
            )))),

            // isNotNull(n) -> not(n.null)
            Rule::NullableIsNotNull => {
                let flag = subcolumn(column, "null", DataType::UInt8);
                let negated = self.registry.build_ordinary("not", vec![flag])?;
                Ok(Some(RewriteAction::ReplaceNode(Node::Function(negated))))
            }

            // mapKeys(m) -> m.keys, mapValues(m) -> m.values, both keeping
            // the call's resolved result type.
            Rule::MapKeys => Ok(Some(RewriteAction::ReplaceNode(subcolumn(
                column,
                "keys",
                function.result_type.clone(),
            )))),
            Rule::MapValues => Ok(Some(RewriteAction::ReplaceNode(subcolumn(
                column,
                "values",
                function.result_type.clone(),
            )))),

            // tupleElement(t, 'a') / tupleElement(t, 1) -> t.a
            Rule::TupleElement => {
                let field_name = match &function.args[1] {
                    Node::Constant(LiteralValue::String(name)) => name.clone(),
                    Node::Constant(LiteralValue::UInt64(position)) => {
                        match column.data_type.tuple_field_name(*position) {
                            Some(name) => name.to_string(),
                            None => {
                                return Err(RewriteError::TuplePositionOutOfRange {
                                    column: column.name.clone(),
                                    position: *position,
                                    field_count: tuple_width(&column.data_type),
                                });
                            }
                        }
                    }
                    _ => return Ok(None),
                };
                Ok(Some(RewriteAction::ReplaceNode(subcolumn(
                    column,
                    &field_name,
                    function.result_type.clone(),
                ))))
            }

            // variantElement(v, 'Tag') -> v.Tag
            Rule::VariantElement => {
                let Node::Constant(LiteralValue::String(tag)) = &function.args[1] else {
                    return Ok(None);
                };
                Ok(Some(RewriteAction::ReplaceNode(subcolumn(
                    column,
                    tag,
                    function.result_type.clone(),
                ))))
            }

            // mapContains(m, k) -> has(m.keys, k), second argument untouched
            Rule::MapContains => {
                let Some(key_type) = column.data_type.map_key_type() else {
                    return Ok(None);
                };
                let keys = subcolumn(column, "keys", DataType::array(key_type.clone()));
                let result_type = self.registry.resolve(
                    "has",
                    FunctionKind::Ordinary,
                    &[keys.clone(), function.args[1].clone()],
                )?;
                Ok(Some(RewriteAction::ReplaceFirstArgument {
                    argument: keys,
                    function_name: "has".to_string(),
                    result_type,
                }))
            }
        }
    }

    fn size_comparison(
        &self,
        name: &str,
        column: &ColumnNode,
    ) -> Result<Option<RewriteAction>, RewriteError> {
        let size = subcolumn(column, "size0", DataType::UInt64);
        let zero = Node::Constant(LiteralValue::UInt64(0));
        let comparison = self.registry.build_ordinary(name, vec![size, zero])?;
        Ok(Some(RewriteAction::ReplaceNode(Node::Function(comparison))))
    }
}

fn subcolumn(column: &ColumnNode, suffix: &str, data_type: DataType) -> Node {
    Node::Column(ColumnNode {
        name: format!("{}.{}", column.name, suffix),
        data_type,
        source: column.source,
    })
}

fn tuple_width(data_type: &DataType) -> usize {
    match data_type {
        DataType::Tuple { fields } => fields.len(),
        _ => 0,
    }
}
