use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::functions::ResolveError;
use crate::tree::{FunctionNode, LiteralValue, Node};
use crate::types::DataType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Ordinary,
    Aggregate,
}

/// One registered function: resolution namespace plus the typing rule.
/// Typing works over argument nodes (not just types) because a few functions
/// need the constant value of an argument to compute their result type.
pub struct FunctionSpec {
    pub name: &'static str,
    pub kind: FunctionKind,
    /// Human-readable expectation, used in `ArgumentMismatch` errors.
    pub signature: &'static str,
    typing: fn(&[Node]) -> Option<DataType>,
}

/// Registry of the functions this analyzer resolves. Mirrors the split
/// between ordinary and aggregate namespaces: a name resolves only within
/// the namespace it was registered under.
#[derive(Default)]
pub struct FunctionRegistry {
    by_name: HashMap<&'static str, FunctionSpec>,
}

/// Shared default registry, built once.
pub static DEFAULT_REGISTRY: Lazy<FunctionRegistry> = Lazy::new(FunctionRegistry::default_registry);

impl FunctionRegistry {
    pub fn new() -> Self {
        Self { by_name: HashMap::new() }
    }

    pub fn register(&mut self, spec: FunctionSpec) {
        self.by_name.insert(spec.name, spec);
    }

    pub fn get(&self, name: &str) -> Option<&FunctionSpec> {
        self.by_name.get(name)
    }

    /// Compute the result type of `name(args)` within the given namespace.
    pub fn resolve(
        &self,
        name: &str,
        kind: FunctionKind,
        args: &[Node],
    ) -> Result<DataType, ResolveError> {
        let spec = self
            .get(name)
            .ok_or_else(|| ResolveError::UnknownFunction(name.to_string()))?;
        if spec.kind != kind {
            return Err(ResolveError::KindMismatch { name: name.to_string(), expected: kind });
        }
        (spec.typing)(args).ok_or_else(|| ResolveError::ArgumentMismatch {
            name: name.to_string(),
            expected: spec.signature.to_string(),
            got: args
                .iter()
                .map(|arg| arg.result_type().unwrap_or(DataType::Nothing))
                .collect(),
        })
    }

    /// Build a fully resolved ordinary function node.
    pub fn build_ordinary(&self, name: &str, args: Vec<Node>) -> Result<FunctionNode, ResolveError> {
        let result_type = self.resolve(name, FunctionKind::Ordinary, &args)?;
        Ok(FunctionNode {
            name: name.to_string(),
            kind: FunctionKind::Ordinary,
            args,
            result_type,
        })
    }

    /// Build a fully resolved aggregate function node.
    pub fn build_aggregate(&self, name: &str, args: Vec<Node>) -> Result<FunctionNode, ResolveError> {
        let result_type = self.resolve(name, FunctionKind::Aggregate, &args)?;
        Ok(FunctionNode {
            name: name.to_string(),
            kind: FunctionKind::Aggregate,
            args,
            result_type,
        })
    }

    pub fn default_registry() -> Self {
        let mut registry = Self::new();

        registry.register(FunctionSpec {
            name: "length",
            kind: FunctionKind::Ordinary,
            signature: "length(Array | Map)",
            typing: |args| match args {
                [first] => {
                    let ty = type_of(first)?;
                    (ty.is_array() || ty.is_map()).then_some(DataType::UInt64)
                }
                _ => None,
            },
        });
        registry.register(FunctionSpec {
            name: "empty",
            kind: FunctionKind::Ordinary,
            signature: "empty(Array | Map)",
            typing: container_predicate_typing,
        });
        registry.register(FunctionSpec {
            name: "notEmpty",
            kind: FunctionKind::Ordinary,
            signature: "notEmpty(Array | Map)",
            typing: container_predicate_typing,
        });
        registry.register(FunctionSpec {
            name: "isNull",
            kind: FunctionKind::Ordinary,
            signature: "isNull(expression)",
            typing: unary_flag_typing,
        });
        registry.register(FunctionSpec {
            name: "isNotNull",
            kind: FunctionKind::Ordinary,
            signature: "isNotNull(expression)",
            typing: unary_flag_typing,
        });
        registry.register(FunctionSpec {
            name: "not",
            kind: FunctionKind::Ordinary,
            signature: "not(expression)",
            typing: unary_flag_typing,
        });
        registry.register(FunctionSpec {
            name: "equals",
            kind: FunctionKind::Ordinary,
            signature: "equals(left, right)",
            typing: binary_flag_typing,
        });
        registry.register(FunctionSpec {
            name: "notEquals",
            kind: FunctionKind::Ordinary,
            signature: "notEquals(left, right)",
            typing: binary_flag_typing,
        });
        registry.register(FunctionSpec {
            name: "has",
            kind: FunctionKind::Ordinary,
            signature: "has(Array, element)",
            typing: |args| match args {
                [first, _second] => type_of(first)?.is_array().then_some(DataType::UInt8),
                _ => None,
            },
        });
        registry.register(FunctionSpec {
            name: "mapKeys",
            kind: FunctionKind::Ordinary,
            signature: "mapKeys(Map)",
            typing: |args| match args {
                [first] => Some(DataType::array(type_of(first)?.map_key_type()?.clone())),
                _ => None,
            },
        });
        registry.register(FunctionSpec {
            name: "mapValues",
            kind: FunctionKind::Ordinary,
            signature: "mapValues(Map)",
            typing: |args| match args {
                [first] => Some(DataType::array(type_of(first)?.map_value_type()?.clone())),
                _ => None,
            },
        });
        registry.register(FunctionSpec {
            name: "mapContains",
            kind: FunctionKind::Ordinary,
            signature: "mapContains(Map, key)",
            typing: |args| match args {
                [first, _second] => type_of(first)?.is_map().then_some(DataType::UInt8),
                _ => None,
            },
        });
        registry.register(FunctionSpec {
            name: "tupleElement",
            kind: FunctionKind::Ordinary,
            signature: "tupleElement(Tuple, name | position)",
            typing: |args| {
                let [first, second] = args else { return None };
                let tuple_type = type_of(first)?;
                match second {
                    Node::Constant(LiteralValue::String(name)) => {
                        tuple_type.tuple_field_type(name).cloned()
                    }
                    Node::Constant(LiteralValue::UInt64(position)) => {
                        let name = tuple_type.tuple_field_name(*position)?.to_string();
                        tuple_type.tuple_field_type(&name).cloned()
                    }
                    _ => None,
                }
            },
        });
        registry.register(FunctionSpec {
            name: "variantElement",
            kind: FunctionKind::Ordinary,
            signature: "variantElement(Variant, tag)",
            typing: |args| {
                let [first, second] = args else { return None };
                let Node::Constant(LiteralValue::String(tag)) = second else { return None };
                let alternative = type_of(first)?.variant_alternative_type(tag)?.clone();
                match alternative {
                    DataType::Nullable(_) => Some(alternative),
                    other => Some(DataType::nullable(other)),
                }
            },
        });
        registry.register(FunctionSpec {
            name: "count",
            kind: FunctionKind::Aggregate,
            signature: "count([expression])",
            typing: |args| match args {
                [] | [_] => Some(DataType::UInt64),
                _ => None,
            },
        });
        registry.register(FunctionSpec {
            name: "sum",
            kind: FunctionKind::Aggregate,
            signature: "sum(numeric)",
            typing: |args| {
                let [first] = args else { return None };
                match type_of(first)? {
                    DataType::UInt8 | DataType::UInt64 => Some(DataType::UInt64),
                    DataType::Int64 => Some(DataType::Int64),
                    DataType::Float64 => Some(DataType::Float64),
                    _ => None,
                }
            },
        });

        registry
    }
}

fn type_of(node: &Node) -> Option<DataType> {
    node.result_type()
}

fn unary_flag_typing(args: &[Node]) -> Option<DataType> {
    match args {
        [_] => Some(DataType::UInt8),
        _ => None,
    }
}

fn binary_flag_typing(args: &[Node]) -> Option<DataType> {
    match args {
        [_, _] => Some(DataType::UInt8),
        _ => None,
    }
}

fn container_predicate_typing(args: &[Node]) -> Option<DataType> {
    match args {
        [first] => {
            let ty = type_of(first)?;
            (ty.is_array() || ty.is_map()).then_some(DataType::UInt8)
        }
        _ => None,
    }
}
