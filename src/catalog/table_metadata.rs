use indexmap::IndexMap;

use crate::types::DataType;

/// A secondary index definition, reduced to what key-column analysis needs:
/// the columns its expression reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecondaryIndex {
    pub name: String,
    pub required_columns: Vec<String>,
}

impl SecondaryIndex {
    pub fn new(name: &str, required_columns: Vec<&str>) -> Self {
        Self {
            name: name.to_string(),
            required_columns: required_columns.into_iter().map(str::to_string).collect(),
        }
    }
}

/// Metadata snapshot of one table: declared columns in declaration order and
/// the column sets its key structures require.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableMetadata {
    /// Map of column name -> declared type
    pub columns: IndexMap<String, DataType>,
    pub primary_key_columns: Vec<String>,
    pub partition_key_columns: Vec<String>,
    pub secondary_indices: Vec<SecondaryIndex>,
}

impl TableMetadata {
    /// Declared type of a column if present in the snapshot.
    pub fn column_type(&self, name: &str) -> Option<&DataType> {
        self.columns.get(name)
    }
}
