use tracing::debug;

use crate::functions::{DEFAULT_REGISTRY, FunctionRegistry};
use crate::pass::{Collector, Rewriter, RewriteError, eligible_identifiers};
use crate::tree::QueryTree;

/// Analyzer settings relevant to this pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Master switch; when off the pass returns without touching the tree.
    pub rewrite_functions_to_subcolumns: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self { rewrite_functions_to_subcolumns: true }
    }
}

/// Everything the pass needs from the surrounding optimizer stage.
pub struct PassContext<'a> {
    pub settings: Settings,
    pub registry: &'a FunctionRegistry,
}

impl<'a> PassContext<'a> {
    pub fn new(registry: &'a FunctionRegistry) -> Self {
        Self { settings: Settings::default(), registry }
    }
}

impl Default for PassContext<'static> {
    fn default() -> Self {
        Self { settings: Settings::default(), registry: &DEFAULT_REGISTRY }
    }
}

/// Run the pass over one tree: collect statistics, filter to the eligible
/// identifier set, then rewrite. Idempotent: rewritten subcolumn references
/// are not candidates, so a second run finds nothing to do.
pub fn run(tree: &mut QueryTree, context: &PassContext<'_>) -> Result<(), RewriteError> {
    if !context.settings.rewrite_functions_to_subcolumns {
        return Ok(());
    }

    let stats = Collector::collect(tree);
    if stats.has_final {
        debug!("final-merge modifier present, subcolumn rewrite skipped");
        return Ok(());
    }

    let eligible = eligible_identifiers(&stats);
    if eligible.is_empty() {
        return Ok(());
    }
    debug!(columns = eligible.len(), "rewriting functions to subcolumns");

    let rewriter = Rewriter {
        tables: &tree.tables,
        eligible: &eligible,
        registry: context.registry,
    };
    rewriter.rewrite(&mut tree.root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::catalog::Storage;
    use crate::functions::FunctionKind;
    use crate::pass::QualifiedColumnIdentity;
    use crate::tree::{FunctionNode, LiteralValue, Node, QueryNode, TableId};
    use crate::types::DataType;

    fn nullable_u64() -> DataType {
        DataType::nullable(DataType::UInt64)
    }

    fn ordinary(name: &str, args: Vec<Node>, result_type: DataType) -> Node {
        Node::Function(FunctionNode {
            name: name.to_string(),
            kind: FunctionKind::Ordinary,
            args,
            result_type,
        })
    }

    fn query(projection: Vec<Node>, from: Vec<Node>) -> Node {
        Node::Query(Box::new(QueryNode { projection, from, ..QueryNode::default() }))
    }

    fn run_default(tree: &mut QueryTree) {
        run(tree, &PassContext::default()).expect("pass should not fail");
    }

    fn projection(tree: &QueryTree) -> &[Node] {
        match &tree.root {
            Node::Query(q) => &q.projection,
            other => panic!("expected query root, got {other:?}"),
        }
    }

    fn expect_column(node: &Node, name: &str) {
        match node {
            Node::Column(column) => assert_eq!(column.name, name),
            other => panic!("expected column {name}, got {other:?}"),
        }
    }

    // SELECT isNull(n) FROM db.t
    fn simple_is_null_tree(final_modifier: bool) -> (QueryTree, TableId) {
        let mut tree = QueryTree::new();
        let t = tree.add_table_with_final(
            Arc::new(Storage::new("db.t").with_column("n", nullable_u64())),
            final_modifier,
        );
        tree.root = query(
            vec![ordinary("isNull", vec![Node::column("n", nullable_u64(), t)], DataType::UInt8)],
            vec![Node::Table(t)],
        );
        (tree, t)
    }

    #[test]
    fn fully_covered_column_is_rewritten() {
        let (mut tree, _t) = simple_is_null_tree(false);
        run_default(&mut tree);
        expect_column(&projection(&tree)[0], "n.null");
    }

    #[test]
    fn pass_is_idempotent() {
        let (mut tree, _t) = simple_is_null_tree(false);
        run_default(&mut tree);
        let after_first = tree.clone();

        run_default(&mut tree);
        assert_eq!(tree, after_first);
    }

    #[test]
    fn final_modifier_disables_the_whole_pass() {
        let (mut tree, _t) = simple_is_null_tree(true);
        let before = tree.clone();
        run_default(&mut tree);
        assert_eq!(tree, before);
    }

    #[test]
    fn final_modifier_on_second_table_also_disables() {
        // The disqualifier is global, wherever the table appears.
        let mut tree = QueryTree::new();
        let a = tree.add_table(Arc::new(Storage::new("db.a").with_column("n", nullable_u64())));
        let b = tree.add_table_with_final(Arc::new(Storage::new("db.b").with_column("x", DataType::UInt64)), true);
        tree.root = query(
            vec![ordinary("isNull", vec![Node::column("n", nullable_u64(), a)], DataType::UInt8)],
            vec![Node::Table(a), Node::Table(b)],
        );
        let before = tree.clone();

        run_default(&mut tree);
        assert_eq!(tree, before);
    }

    #[test]
    fn settings_switch_disables_the_pass() {
        let (mut tree, _t) = simple_is_null_tree(false);
        let before = tree.clone();

        let mut context = PassContext::default();
        context.settings.rewrite_functions_to_subcolumns = false;
        run(&mut tree, &context).expect("pass should not fail");
        assert_eq!(tree, before);
    }

    #[test]
    fn one_bare_occurrence_blocks_every_occurrence() {
        // SELECT isNull(n) FROM db.t GROUP BY n: rewriting the projection
        // would split the grouping key into two identifiers.
        let mut tree = QueryTree::new();
        let t = tree.add_table(Arc::new(Storage::new("db.t").with_column("n", nullable_u64())));
        tree.root = Node::Query(Box::new(QueryNode {
            projection: vec![ordinary(
                "isNull",
                vec![Node::column("n", nullable_u64(), t)],
                DataType::UInt8,
            )],
            from: vec![Node::Table(t)],
            group_by: vec![Node::column("n", nullable_u64(), t)],
            ..QueryNode::default()
        }));
        let before = tree.clone();

        run_default(&mut tree);
        assert_eq!(tree, before);
    }

    #[test]
    fn key_columns_are_protected() {
        let mut tree = QueryTree::new();
        let t = tree.add_table(Arc::new(
            Storage::new("db.t")
                .with_column("n", nullable_u64())
                .with_primary_key(vec!["n"]),
        ));
        tree.root = query(
            vec![ordinary("isNull", vec![Node::column("n", nullable_u64(), t)], DataType::UInt8)],
            vec![Node::Table(t)],
        );
        let before = tree.clone();

        run_default(&mut tree);
        assert_eq!(tree, before);
    }

    #[test]
    fn identities_are_tracked_per_table() {
        // db.a.n is fully covered, db.b.n also appears bare: only the first
        // may be rewritten.
        let mut tree = QueryTree::new();
        let a = tree.add_table(Arc::new(Storage::new("db.a").with_column("n", nullable_u64())));
        let b = tree.add_table(Arc::new(Storage::new("db.b").with_column("n", nullable_u64())));
        tree.root = query(
            vec![
                ordinary("isNull", vec![Node::column("n", nullable_u64(), a)], DataType::UInt8),
                ordinary("isNull", vec![Node::column("n", nullable_u64(), b)], DataType::UInt8),
                Node::column("n", nullable_u64(), b),
            ],
            vec![Node::Table(a), Node::Table(b)],
        );

        run_default(&mut tree);

        let projection = projection(&tree);
        expect_column(&projection[0], "n.null");
        match &projection[1] {
            Node::Function(function) => assert_eq!(function.name, "isNull"),
            other => panic!("expected untouched isNull, got {other:?}"),
        }
        expect_column(&projection[2], "n");
    }

    #[test]
    fn non_string_variant_tag_is_left_alone() {
        // variantElement(v, 1) is not counted by the collector, so the
        // column never becomes eligible and the call survives as-is.
        let variant = DataType::variant(vec![("Int64", DataType::Int64)]);
        let mut tree = QueryTree::new();
        let t = tree.add_table(Arc::new(Storage::new("db.t").with_column("v", variant.clone())));
        tree.root = query(
            vec![ordinary(
                "variantElement",
                vec![Node::column("v", variant, t), Node::Constant(LiteralValue::UInt64(1))],
                DataType::nullable(DataType::Int64),
            )],
            vec![Node::Table(t)],
        );
        let before = tree.clone();

        run_default(&mut tree);
        assert_eq!(tree, before);
    }

    #[test]
    fn nested_first_argument_is_never_rewritten() {
        let arr = DataType::array(DataType::String);
        let mut tree = QueryTree::new();
        let t = tree.add_table(Arc::new(Storage::new("db.t").with_column("arr", arr.clone())));
        let nested = ordinary(
            "arrayConcat",
            vec![Node::column("arr", arr.clone(), t), Node::column("arr", arr.clone(), t)],
            arr.clone(),
        );
        tree.root = query(
            vec![ordinary("length", vec![nested], DataType::UInt64)],
            vec![Node::Table(t)],
        );
        let before = tree.clone();

        run_default(&mut tree);
        assert_eq!(tree, before);
    }

    #[test]
    fn subquery_sourced_columns_are_skipped() {
        let mut tree = QueryTree::new();
        tree.root = query(
            vec![ordinary(
                "isNull",
                vec![Node::unsourced_column("n", nullable_u64())],
                DataType::UInt8,
            )],
            vec![],
        );
        let before = tree.clone();

        run_default(&mut tree);
        assert_eq!(tree, before);
    }

    #[test]
    fn mixed_query_rewrites_each_eligible_position() {
        // SELECT length(arr), count(n) FROM db.t WHERE mapContains(m, 'k')
        let arr = DataType::array(DataType::String);
        let map = DataType::map(DataType::String, DataType::UInt64);
        let mut tree = QueryTree::new();
        let t = tree.add_table(Arc::new(
            Storage::new("db.t")
                .with_column("arr", arr.clone())
                .with_column("n", nullable_u64())
                .with_column("m", map.clone()),
        ));
        tree.root = Node::Query(Box::new(QueryNode {
            projection: vec![
                ordinary("length", vec![Node::column("arr", arr, t)], DataType::UInt64),
                Node::Function(FunctionNode {
                    name: "count".to_string(),
                    kind: FunctionKind::Aggregate,
                    args: vec![Node::column("n", nullable_u64(), t)],
                    result_type: DataType::UInt64,
                }),
            ],
            from: vec![Node::Table(t)],
            filter: Some(ordinary(
                "mapContains",
                vec![
                    Node::column("m", map, t),
                    Node::Constant(LiteralValue::String("k".to_string())),
                ],
                DataType::UInt8,
            )),
            ..QueryNode::default()
        }));

        run_default(&mut tree);

        let root = match &tree.root {
            Node::Query(q) => q,
            other => panic!("expected query root, got {other:?}"),
        };
        expect_column(&root.projection[0], "arr.size0");
        match &root.projection[1] {
            Node::Function(sum) => assert_eq!(sum.name, "sum"),
            other => panic!("expected sum call, got {other:?}"),
        }
        match root.filter.as_ref().unwrap() {
            Node::Function(has) => {
                assert_eq!(has.name, "has");
                expect_column(&has.args[0], "m.keys");
                assert_eq!(
                    has.args[1],
                    Node::Constant(LiteralValue::String("k".to_string()))
                );
            }
            other => panic!("expected has call, got {other:?}"),
        }
    }

    #[test]
    fn coverage_counts_see_through_rewritten_shapes() {
        // Both occurrences rewritable: empty(arr) and length(arr).
        let arr = DataType::array(DataType::String);
        let mut tree = QueryTree::new();
        let t = tree.add_table(Arc::new(Storage::new("db.t").with_column("arr", arr.clone())));
        tree.root = query(
            vec![
                ordinary("empty", vec![Node::column("arr", arr.clone(), t)], DataType::UInt8),
                ordinary("length", vec![Node::column("arr", arr, t)], DataType::UInt64),
            ],
            vec![Node::Table(t)],
        );

        run_default(&mut tree);

        let projection = projection(&tree);
        match &projection[0] {
            Node::Function(equals) => {
                assert_eq!(equals.name, "equals");
                expect_column(&equals.args[0], "arr.size0");
            }
            other => panic!("expected equals call, got {other:?}"),
        }
        expect_column(&projection[1], "arr.size0");
    }

    #[test]
    fn eligible_set_matches_coverage_law() {
        // Direct check of the law: rewritten somewhere iff not a key column,
        // counts equal, and no disqualifier.
        let (tree, _t) = simple_is_null_tree(false);
        let stats = crate::pass::Collector::collect(&tree);
        let eligible = crate::pass::eligible_identifiers(&stats);

        let identity = QualifiedColumnIdentity::new("db.t", "n");
        assert!(eligible.contains(&identity));
        assert_eq!(stats.reference_count[&identity], stats.rewritable_count[&identity]);
    }
}
