use indexmap::IndexSet;

use crate::pass::{CollectedStats, QualifiedColumnIdentity};

/// Final set of qualified columns safe to rewrite. Pure function of the
/// collected statistics.
///
/// A column qualifies only when *every* occurrence in the query is a
/// recognized derived-property access. One bare occurrence elsewhere (say,
/// in a GROUP BY key) would split what is semantically one identifier into
/// two, and key-identity reasoning downstream would silently go wrong.
/// Key columns are excluded outright because index and partition analysis
/// is not subcolumn-aware.
pub fn eligible_identifiers(stats: &CollectedStats) -> IndexSet<QualifiedColumnIdentity> {
    if stats.has_final {
        return IndexSet::new();
    }

    stats
        .rewritable_count
        .iter()
        .filter(|(identity, count)| {
            !stats.key_columns.contains(*identity)
                && stats.reference_count.get(*identity) == Some(*count)
        })
        .map(|(identity, _)| identity.clone())
        .collect()
}
