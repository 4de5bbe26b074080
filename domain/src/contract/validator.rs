//! Contract validation
//!
//! [`DefaultContractValidator`] walks a [`SchemaNode`] tree alongside a JSON
//! value and reports the first violation it meets. Objects are visited with
//! required fields first (declaration order), then declared properties
//! (name order), then undeclared fields, so the reported violation is
//! deterministic for a given input.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::schema::{SchemaNode, SchemaType};

/// What was wrong with a value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationKind {
    MissingRequired,
    TypeMismatch {
        expected: SchemaType,
        found: String,
    },
    NotInEnum {
        allowed: Vec<Value>,
    },
    BelowMinimum {
        minimum: f64,
    },
    AboveMaximum {
        maximum: f64,
    },
    UnknownField,
    NoVariantMatched {
        variants: usize,
    },
    AmbiguousVariant {
        matched: usize,
    },
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViolationKind::MissingRequired => write!(f, "missing required field"),
            ViolationKind::TypeMismatch { expected, found } => {
                write!(f, "expected {}, found {}", expected, found)
            }
            ViolationKind::NotInEnum { allowed } => {
                let allowed: Vec<String> = allowed.iter().map(|v| v.to_string()).collect();
                write!(f, "value must be one of [{}]", allowed.join(", "))
            }
            ViolationKind::BelowMinimum { minimum } => write!(f, "must be >= {}", minimum),
            ViolationKind::AboveMaximum { maximum } => write!(f, "must be <= {}", maximum),
            ViolationKind::UnknownField => write!(f, "unknown field"),
            ViolationKind::NoVariantMatched { variants } => {
                write!(f, "does not match any of {} allowed variants", variants)
            }
            ViolationKind::AmbiguousVariant { matched } => {
                write!(f, "matches {} variants, exactly one is allowed", matched)
            }
        }
    }
}

/// A located contract violation. Displays as `<field>: <violation>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractViolation {
    /// Dotted path to the offending field (`filters.status`, `items[2].id`);
    /// empty for the root value
    pub field: String,
    pub kind: ViolationKind,
}

impl ContractViolation {
    pub fn new(field: impl Into<String>, kind: ViolationKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }
}

impl std::fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let field = if self.field.is_empty() {
            "(root)"
        } else {
            self.field.as_str()
        };
        write!(f, "{}: {}", field, self.kind)
    }
}

impl std::error::Error for ContractViolation {}

/// Validator for values against contracts
///
/// This is a pure domain trait; validation never mutates or coerces the
/// value.
pub trait ContractValidator: Send + Sync {
    fn validate(&self, contract: &SchemaNode, value: &Value) -> Result<(), ContractViolation>;
}

/// Default tree-walking implementation of [`ContractValidator`]
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultContractValidator;

impl ContractValidator for DefaultContractValidator {
    fn validate(&self, contract: &SchemaNode, value: &Value) -> Result<(), ContractViolation> {
        walk(contract, value, "")
    }
}

fn child_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn matches_type(schema_type: SchemaType, value: &Value) -> bool {
    match schema_type {
        SchemaType::String => value.is_string(),
        SchemaType::Number => value.is_number(),
        SchemaType::Integer => match value {
            Value::Number(n) => {
                n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
            }
            _ => false,
        },
        SchemaType::Boolean => value.is_boolean(),
        SchemaType::Object => value.is_object(),
        SchemaType::Array => value.is_array(),
        SchemaType::Null => value.is_null(),
    }
}

fn walk(node: &SchemaNode, value: &Value, path: &str) -> Result<(), ContractViolation> {
    if value.is_null() && node.nullable {
        return Ok(());
    }

    if let Some(variants) = &node.one_of {
        let matched = variants
            .iter()
            .filter(|variant| walk(variant, value, path).is_ok())
            .count();
        match matched {
            1 => {}
            0 => {
                return Err(ContractViolation::new(
                    path,
                    ViolationKind::NoVariantMatched {
                        variants: variants.len(),
                    },
                ));
            }
            n => {
                return Err(ContractViolation::new(
                    path,
                    ViolationKind::AmbiguousVariant { matched: n },
                ));
            }
        }
    }

    if let Some(expected) = node.schema_type
        && !matches_type(expected, value)
    {
        return Err(ContractViolation::new(
            path,
            ViolationKind::TypeMismatch {
                expected,
                found: type_name(value).to_string(),
            },
        ));
    }

    if let Some(allowed) = &node.enum_values
        && !allowed.contains(value)
    {
        return Err(ContractViolation::new(
            path,
            ViolationKind::NotInEnum {
                allowed: allowed.clone(),
            },
        ));
    }

    if let Some(n) = value.as_f64() {
        if let Some(minimum) = node.minimum
            && n < minimum
        {
            return Err(ContractViolation::new(
                path,
                ViolationKind::BelowMinimum { minimum },
            ));
        }
        if let Some(maximum) = node.maximum
            && n > maximum
        {
            return Err(ContractViolation::new(
                path,
                ViolationKind::AboveMaximum { maximum },
            ));
        }
    }

    match value {
        Value::Object(map) => {
            for name in &node.required {
                if !map.contains_key(name) {
                    return Err(ContractViolation::new(
                        child_path(path, name),
                        ViolationKind::MissingRequired,
                    ));
                }
            }
            for (name, child) in &node.properties {
                if let Some(field_value) = map.get(name) {
                    walk(child, field_value, &child_path(path, name))?;
                }
            }
            if node.additional_properties == Some(false) {
                let mut unknown: Vec<&String> = map
                    .keys()
                    .filter(|k| !node.properties.contains_key(k.as_str()))
                    .collect();
                unknown.sort();
                if let Some(name) = unknown.first() {
                    return Err(ContractViolation::new(
                        child_path(path, name),
                        ViolationKind::UnknownField,
                    ));
                }
            }
        }
        Value::Array(elements) => {
            if let Some(items) = &node.items {
                for (i, element) in elements.iter().enumerate() {
                    walk(items, element, &format!("{}[{}]", path, i))?;
                }
            }
        }
        _ => {}
    }

    Ok(())
}
