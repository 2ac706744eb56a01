use crate::tree::{FunctionNode, LiteralKind, Node};
use crate::types::DataType;

/// Storage-decomposed container kinds a rewrite rule can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Array,
    Nullable,
    Map,
    Tuple,
    Variant,
}

impl ContainerKind {
    pub fn of(data_type: &DataType) -> Option<ContainerKind> {
        match data_type {
            DataType::Array(_) => Some(ContainerKind::Array),
            DataType::Nullable(_) => Some(ContainerKind::Nullable),
            DataType::Map { .. } => Some(ContainerKind::Map),
            DataType::Tuple { .. } => Some(ContainerKind::Tuple),
            DataType::Variant { .. } => Some(ContainerKind::Variant),
            _ => None,
        }
    }
}

/// One row of the rewrite rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    ArrayLength,
    ArrayEmpty,
    ArrayNotEmpty,
    NullableCount,
    NullableIsNull,
    NullableIsNotNull,
    MapLength,
    MapKeys,
    MapValues,
    TupleElement,
    VariantElement,
    MapContains,
}

/// Match a candidate call against the rule table, keyed by argument count,
/// container kind, function name and (where relevant) the constant kind of
/// the second argument.
///
/// Used verbatim by both the collector and the rewriter: any divergence
/// between counting and rewriting would let a column pass the coverage check
/// and then not be rewritten everywhere, so there is exactly one matcher.
pub fn match_rule(function: &FunctionNode, column_type: &DataType) -> Option<Rule> {
    let kind = ContainerKind::of(column_type)?;

    match function.args.len() {
        1 => match (kind, function.name.as_str()) {
            (ContainerKind::Array, "length") => Some(Rule::ArrayLength),
            (ContainerKind::Array, "empty") => Some(Rule::ArrayEmpty),
            (ContainerKind::Array, "notEmpty") => Some(Rule::ArrayNotEmpty),
            (ContainerKind::Nullable, "count") => Some(Rule::NullableCount),
            (ContainerKind::Nullable, "isNull") => Some(Rule::NullableIsNull),
            (ContainerKind::Nullable, "isNotNull") => Some(Rule::NullableIsNotNull),
            (ContainerKind::Map, "length") => Some(Rule::MapLength),
            (ContainerKind::Map, "mapKeys") => Some(Rule::MapKeys),
            (ContainerKind::Map, "mapValues") => Some(Rule::MapValues),
            _ => None,
        },
        2 => {
            let second_kind = constant_kind(&function.args[1]);
            match (kind, function.name.as_str()) {
                (ContainerKind::Tuple, "tupleElement") => match second_kind? {
                    LiteralKind::String | LiteralKind::UInt64 => Some(Rule::TupleElement),
                    LiteralKind::Other => None,
                },
                (ContainerKind::Variant, "variantElement") => match second_kind? {
                    LiteralKind::String => Some(Rule::VariantElement),
                    _ => None,
                },
                (ContainerKind::Map, "mapContains") => Some(Rule::MapContains),
                _ => None,
            }
        }
        _ => None,
    }
}

fn constant_kind(node: &Node) -> Option<LiteralKind> {
    match node {
        Node::Constant(value) => Some(value.kind()),
        _ => None,
    }
}
