use crate::functions::FunctionKind;
use crate::types::DataType;

#[derive(Debug, Clone, PartialEq)]
pub enum ResolveError {
    UnknownFunction(String),
    KindMismatch { name: String, expected: FunctionKind },
    ArgumentMismatch { name: String, expected: String, got: Vec<DataType> },
}
