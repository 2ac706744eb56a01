use ordered_float::NotNan;
use std::fmt::{self, Display};

use crate::types::DataType;

/// Value carried by a constant node. `NotNan` keeps the whole enum `Eq` and
/// `Hash` so constants can participate in structural comparisons.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    String(String),
    UInt64(u64),
    Int64(i64),
    Float64(NotNan<f64>),
    Bool(bool),
    Null,
}

/// Value-kind tag used by rules that only fire for specific constant kinds
/// (`tupleElement` second argument, `variantElement` tag).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    String,
    UInt64,
    Other,
}

impl LiteralValue {
    pub fn kind(&self) -> LiteralKind {
        match self {
            LiteralValue::String(_) => LiteralKind::String,
            LiteralValue::UInt64(_) => LiteralKind::UInt64,
            _ => LiteralKind::Other,
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            LiteralValue::String(_) => DataType::String,
            LiteralValue::UInt64(_) => DataType::UInt64,
            LiteralValue::Int64(_) => DataType::Int64,
            LiteralValue::Float64(_) => DataType::Float64,
            LiteralValue::Bool(_) => DataType::UInt8,
            LiteralValue::Null => DataType::Nothing,
        }
    }
}

impl Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::String(s) => write!(f, "'{}'", s),
            LiteralValue::UInt64(u) => write!(f, "{}", u),
            LiteralValue::Int64(i) => write!(f, "{}", i),
            LiteralValue::Float64(n) => write!(f, "{}", n.into_inner()),
            LiteralValue::Bool(b) => write!(f, "{}", b),
            LiteralValue::Null => write!(f, "NULL"),
        }
    }
}

impl fmt::Debug for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::String(_) => write!(f, "String({})", self),
            LiteralValue::UInt64(_) => write!(f, "UInt64({})", self),
            LiteralValue::Int64(_) => write!(f, "Int64({})", self),
            LiteralValue::Float64(_) => write!(f, "Float64({})", self),
            LiteralValue::Bool(_) => write!(f, "Bool({})", self),
            LiteralValue::Null => write!(f, "Null"),
        }
    }
}
