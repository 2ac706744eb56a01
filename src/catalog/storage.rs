use std::collections::HashSet;

use crate::catalog::{SecondaryIndex, TableMetadata};
use crate::types::DataType;

/// Handle to one table's storage: identity, capability flags and the
/// metadata snapshot the analyzer sees. The builder-style `with_*` methods
/// exist because storages are assembled by hand in tests and by the catalog
/// layer in production.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Storage {
    /// Fully qualified table name, e.g. `db.events`.
    pub full_name: String,
    /// Whether the storage can address `column.suffix` subcolumns directly.
    pub supports_subcolumn_rewrite: bool,
    /// Columns that exist only at read time (`_part` and friends).
    pub virtual_columns: HashSet<String>,
    pub metadata: TableMetadata,
}

impl Storage {
    pub fn new(full_name: &str) -> Self {
        Self {
            full_name: full_name.to_string(),
            supports_subcolumn_rewrite: true,
            virtual_columns: HashSet::new(),
            metadata: TableMetadata::default(),
        }
    }

    pub fn with_column(mut self, name: &str, data_type: DataType) -> Self {
        self.metadata.columns.insert(name.to_string(), data_type);
        self
    }

    pub fn with_primary_key(mut self, columns: Vec<&str>) -> Self {
        self.metadata.primary_key_columns = columns.into_iter().map(str::to_string).collect();
        self
    }

    pub fn with_partition_key(mut self, columns: Vec<&str>) -> Self {
        self.metadata.partition_key_columns = columns.into_iter().map(str::to_string).collect();
        self
    }

    pub fn with_secondary_index(mut self, index: SecondaryIndex) -> Self {
        self.metadata.secondary_indices.push(index);
        self
    }

    pub fn with_virtual_column(mut self, name: &str) -> Self {
        self.virtual_columns.insert(name.to_string());
        self
    }

    pub fn without_subcolumn_rewrite(mut self) -> Self {
        self.supports_subcolumn_rewrite = false;
        self
    }

    pub fn is_virtual_column(&self, name: &str) -> bool {
        self.virtual_columns.contains(name)
    }

    pub fn column_type(&self, name: &str) -> Option<&DataType> {
        self.metadata.column_type(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_assembles_metadata() {
        let storage = Storage::new("db.events")
            .with_column("id", DataType::UInt64)
            .with_column("tags", DataType::array(DataType::String))
            .with_primary_key(vec!["id"])
            .with_partition_key(vec!["id"])
            .with_secondary_index(SecondaryIndex::new("by_tags", vec!["tags"]))
            .with_virtual_column("_part");

        assert_eq!(storage.full_name, "db.events");
        assert!(storage.supports_subcolumn_rewrite);
        assert_eq!(storage.column_type("tags"), Some(&DataType::array(DataType::String)));
        assert_eq!(storage.metadata.primary_key_columns, vec!["id"]);
        assert_eq!(storage.metadata.secondary_indices.len(), 1);
        assert!(storage.is_virtual_column("_part"));
        assert!(!storage.is_virtual_column("id"));
    }

    #[test]
    fn capability_flag_can_be_disabled() {
        let storage = Storage::new("db.plain").without_subcolumn_rewrite();
        assert!(!storage.supports_subcolumn_rewrite);
    }
}
