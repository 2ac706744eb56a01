use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};

use crate::pass::{GROUPING_SET_COLUMN, QualifiedColumnIdentity, match_candidate, match_rule};
use crate::tree::{ColumnNode, Node, QueryTree, TableNode};

/// Output of the first traversal: everything the eligibility filter needs to
/// decide which qualified columns are safe to rewrite. Built fresh per pass
/// invocation and discarded afterwards.
///
/// Invariant: `rewritable_count[id] <= reference_count[id]`, because every
/// rewritable occurrence is also a plain column occurrence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectedStats {
    /// A final-merge table modifier was seen somewhere; the whole pass must
    /// become a no-op because merge-at-read semantics need complete rows.
    pub has_final: bool,
    /// Columns required by a primary key, partition key or secondary index
    /// of any table in the query.
    pub key_columns: IndexSet<QualifiedColumnIdentity>,
    /// Every syntactic occurrence of a table-sourced column.
    pub reference_count: IndexMap<QualifiedColumnIdentity, u64>,
    /// Occurrences that are the first argument of a call matching a rule.
    pub rewritable_count: IndexMap<QualifiedColumnIdentity, u64>,
}

/// First pass: read-only traversal gathering `CollectedStats`. Stops dead as
/// soon as a final-merge modifier shows up; whatever was collected up to that
/// point is abandoned by the filter stage.
pub struct Collector<'a> {
    tables: &'a [TableNode],
    stats: CollectedStats,
    processed_tables: HashSet<String>,
}

impl<'a> Collector<'a> {
    pub fn collect(tree: &QueryTree) -> CollectedStats {
        let mut collector = Collector {
            tables: &tree.tables,
            stats: CollectedStats::default(),
            processed_tables: HashSet::new(),
        };
        tree.root.walk(&mut |node| collector.enter(node));
        collector.stats
    }

    fn enter(&mut self, node: &Node) -> bool {
        if self.stats.has_final {
            return false;
        }
        let tables = self.tables;

        match node {
            Node::Table(id) => {
                if let Some(table) = tables.get(id.0) {
                    self.enter_table(table);
                }
            }
            Node::Column(column) => self.enter_column(column),
            Node::Function(_) => {
                if let Some(candidate) = match_candidate(node, tables) {
                    if match_rule(candidate.function, &candidate.column.data_type).is_some() {
                        let identity = candidate.identity();
                        *self.stats.rewritable_count.entry(identity).or_insert(0) += 1;
                    }
                }
            }
            Node::Constant(_) | Node::Query(_) => {}
        }

        !self.stats.has_final
    }

    fn enter_table(&mut self, table: &TableNode) {
        if table.final_modifier {
            self.stats.has_final = true;
            return;
        }

        // Self-joins reference the same table several times; its key columns
        // are collected once, keyed by full table name.
        let table_name = table.storage.full_name.clone();
        if !self.processed_tables.insert(table_name.clone()) {
            return;
        }

        let metadata = &table.storage.metadata;
        for column_name in &metadata.primary_key_columns {
            self.add_key_column(&table_name, column_name);
        }
        for column_name in &metadata.partition_key_columns {
            self.add_key_column(&table_name, column_name);
        }
        for index in &metadata.secondary_indices {
            for column_name in &index.required_columns {
                self.add_key_column(&table_name, column_name);
            }
        }
    }

    fn add_key_column(&mut self, table_name: &str, column_name: &str) {
        self.stats
            .key_columns
            .insert(QualifiedColumnIdentity::new(table_name, column_name));
    }

    fn enter_column(&mut self, column: &ColumnNode) {
        if column.name == GROUPING_SET_COLUMN {
            return;
        }
        let Some(source) = column.source else {
            return;
        };
        let Some(table) = self.tables.get(source.0) else {
            return;
        };

        let identity = QualifiedColumnIdentity::new(&table.storage.full_name, &column.name);
        *self.stats.reference_count.entry(identity).or_insert(0) += 1;
    }
}
