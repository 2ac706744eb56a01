use std::fmt::{self, Display};

/// Structural description of a column's declared type.
///
/// Composite kinds (`Array`, `Nullable`, `Map`, `Tuple`, `Variant`) are the
/// ones the storage layer decomposes into addressable subcolumns. Equality is
/// structural, so two independently built descriptions of the same type
/// compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    Nothing,
    UInt8,
    UInt64,
    Int64,
    Float64,
    String,
    Array(Box<DataType>),
    Nullable(Box<DataType>),
    Map { key: Box<DataType>, value: Box<DataType> },
    Tuple { fields: Vec<(String, DataType)> },
    Variant { alternatives: Vec<(String, DataType)> },
}

impl DataType {
    pub fn array(element: DataType) -> DataType {
        DataType::Array(Box::new(element))
    }

    pub fn nullable(inner: DataType) -> DataType {
        DataType::Nullable(Box::new(inner))
    }

    pub fn map(key: DataType, value: DataType) -> DataType {
        DataType::Map { key: Box::new(key), value: Box::new(value) }
    }

    pub fn tuple(fields: Vec<(&str, DataType)>) -> DataType {
        DataType::Tuple {
            fields: fields.into_iter().map(|(name, ty)| (name.to_string(), ty)).collect(),
        }
    }

    pub fn variant(alternatives: Vec<(&str, DataType)>) -> DataType {
        DataType::Variant {
            alternatives: alternatives.into_iter().map(|(name, ty)| (name.to_string(), ty)).collect(),
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, DataType::Array(_))
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, DataType::Nullable(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, DataType::Map { .. })
    }

    pub fn is_tuple(&self) -> bool {
        matches!(self, DataType::Tuple { .. })
    }

    pub fn is_variant(&self) -> bool {
        matches!(self, DataType::Variant { .. })
    }

    pub fn map_key_type(&self) -> Option<&DataType> {
        match self {
            DataType::Map { key, .. } => Some(key),
            _ => None,
        }
    }

    pub fn map_value_type(&self) -> Option<&DataType> {
        match self {
            DataType::Map { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Field name of a tuple by 1-based position.
    pub fn tuple_field_name(&self, position: u64) -> Option<&str> {
        match self {
            DataType::Tuple { fields } => {
                if position == 0 {
                    return None;
                }
                fields.get(position as usize - 1).map(|(name, _)| name.as_str())
            }
            _ => None,
        }
    }

    pub fn tuple_field_type(&self, field_name: &str) -> Option<&DataType> {
        match self {
            DataType::Tuple { fields } => fields
                .iter()
                .find(|(name, _)| name == field_name)
                .map(|(_, ty)| ty),
            _ => None,
        }
    }

    pub fn variant_alternative_type(&self, tag: &str) -> Option<&DataType> {
        match self {
            DataType::Variant { alternatives } => alternatives
                .iter()
                .find(|(name, _)| name == tag)
                .map(|(_, ty)| ty),
            _ => None,
        }
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Nothing => write!(f, "Nothing"),
            DataType::UInt8 => write!(f, "UInt8"),
            DataType::UInt64 => write!(f, "UInt64"),
            DataType::Int64 => write!(f, "Int64"),
            DataType::Float64 => write!(f, "Float64"),
            DataType::String => write!(f, "String"),
            DataType::Array(element) => write!(f, "Array({})", element),
            DataType::Nullable(inner) => write!(f, "Nullable({})", inner),
            DataType::Map { key, value } => write!(f, "Map({}, {})", key, value),
            DataType::Tuple { fields } => {
                write!(f, "Tuple(")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} {}", name, ty)?;
                }
                write!(f, ")")
            }
            DataType::Variant { alternatives } => {
                write!(f, "Variant(")?;
                for (i, (name, ty)) in alternatives.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} {}", name, ty)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_equality_of_composite_types() {
        let a = DataType::map(DataType::String, DataType::array(DataType::UInt64));
        let b = DataType::map(DataType::String, DataType::array(DataType::UInt64));
        assert_eq!(a, b);

        let c = DataType::map(DataType::String, DataType::array(DataType::Int64));
        assert_ne!(a, c);
    }

    #[test]
    fn classification_predicates() {
        assert!(DataType::array(DataType::UInt64).is_array());
        assert!(DataType::nullable(DataType::String).is_nullable());
        assert!(DataType::map(DataType::String, DataType::UInt64).is_map());
        assert!(DataType::tuple(vec![("a", DataType::UInt64)]).is_tuple());
        assert!(DataType::variant(vec![("Int64", DataType::Int64)]).is_variant());

        assert!(!DataType::UInt64.is_array());
        assert!(!DataType::array(DataType::UInt64).is_map());
    }

    #[test]
    fn tuple_field_name_is_one_based() {
        let ty = DataType::tuple(vec![("a", DataType::UInt64), ("b", DataType::String)]);

        assert_eq!(ty.tuple_field_name(1), Some("a"));
        assert_eq!(ty.tuple_field_name(2), Some("b"));
        assert_eq!(ty.tuple_field_name(0), None);
        assert_eq!(ty.tuple_field_name(3), None);
    }

    #[test]
    fn tuple_field_type_by_name() {
        let ty = DataType::tuple(vec![("a", DataType::UInt64), ("b", DataType::String)]);

        assert_eq!(ty.tuple_field_type("b"), Some(&DataType::String));
        assert_eq!(ty.tuple_field_type("missing"), None);
    }

    #[test]
    fn map_accessors() {
        let ty = DataType::map(DataType::String, DataType::UInt64);

        assert_eq!(ty.map_key_type(), Some(&DataType::String));
        assert_eq!(ty.map_value_type(), Some(&DataType::UInt64));
        assert_eq!(DataType::UInt64.map_key_type(), None);
    }

    #[test]
    fn variant_alternative_lookup() {
        let ty = DataType::variant(vec![("Int64", DataType::Int64), ("String", DataType::String)]);

        assert_eq!(ty.variant_alternative_type("Int64"), Some(&DataType::Int64));
        assert_eq!(ty.variant_alternative_type("Float64"), None);
    }

    #[test]
    fn display_is_readable() {
        let ty = DataType::tuple(vec![("a", DataType::UInt64), ("b", DataType::String)]);
        assert_eq!(ty.to_string(), "Tuple(a UInt64, b String)");

        let ty = DataType::map(DataType::String, DataType::array(DataType::UInt8));
        assert_eq!(ty.to_string(), "Map(String, Array(UInt8))");
    }
}
