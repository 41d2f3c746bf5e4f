//! Argument validation and normalization
//!
//! Raw MCP arguments are checked against the tool's declared fields before
//! anything else happens. A missing required field, a value of the wrong type
//! or a broken cross-field rule rejects the invocation without touching the
//! network. Surviving values are normalized (upper-cased app codes) and
//! collected into a canonical argument map.

use serde_json::{Map, Value};

use crate::error::ToolError;
use crate::registry::{CUSTOM_MESSAGE_FIELD, CrossFieldRule, FieldKind, FieldSpec, Normalize, ToolSpec};

/// Validated, normalized arguments of one invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedArgs {
    /// Declared fields that are present, after normalization
    pub fields: Map<String, Value>,
    /// Caller-supplied success text, on tools that accept one
    pub custom_message: Option<String>,
}

/// Validate raw arguments against a tool definition
///
/// `null` or absent arguments count as an empty object. Keys that are not
/// declared by the tool are dropped, or rejected when `strict` is set.
pub fn validate(
    spec: &ToolSpec,
    raw: &Value,
    strict: bool,
) -> Result<ValidatedArgs, ToolError> {
    let empty = Map::new();
    let args = match raw {
        Value::Null => &empty,
        Value::Object(map) => map,
        other => {
            return Err(ToolError::validation(
                spec.name,
                format!("arguments must be an object, got {}", type_name(other)),
            ));
        }
    };

    if strict {
        if let Some(key) = args.keys().find(|k| !spec.accepts(k)) {
            return Err(ToolError::validation(
                spec.name,
                format!("unrecognized field `{}`", key),
            ));
        }
    }

    let mut validated = ValidatedArgs::default();

    for field in spec.fields {
        match args.get(field.name) {
            None if field.required => {
                return Err(ToolError::validation(
                    spec.name,
                    format!("missing required field `{}`", field.name),
                ));
            }
            None => {}
            Some(value) => {
                check_kind(spec, field, value)?;
                let value = normalize(field, value.clone());
                check_enum(spec, field, &value)?;
                validated.fields.insert(field.name.to_string(), value);
            }
        }
    }

    if let Some(rule) = spec.rule {
        check_rule(spec, rule, &validated.fields)?;
    }

    if spec.custom_message {
        match args.get(CUSTOM_MESSAGE_FIELD) {
            None => {}
            Some(Value::String(text)) => validated.custom_message = Some(text.clone()),
            Some(other) => {
                return Err(ToolError::validation(
                    spec.name,
                    format!(
                        "field `{}` must be a string, got {}",
                        CUSTOM_MESSAGE_FIELD,
                        type_name(other)
                    ),
                ));
            }
        }
    }

    Ok(validated)
}

fn check_kind(spec: &ToolSpec, field: &FieldSpec, value: &Value) -> Result<(), ToolError> {
    let ok = match field.kind {
        FieldKind::String | FieldKind::Enum(_) => value.is_string(),
        FieldKind::Number => value.is_number(),
        FieldKind::Boolean => value.is_boolean(),
        FieldKind::StringArray => value
            .as_array()
            .is_some_and(|items| items.iter().all(Value::is_string)),
    };

    if ok {
        Ok(())
    } else {
        Err(ToolError::validation(
            spec.name,
            format!(
                "field `{}` must be a {}, got {}",
                field.name,
                field.kind.label(),
                type_name(value)
            ),
        ))
    }
}

fn check_enum(spec: &ToolSpec, field: &FieldSpec, value: &Value) -> Result<(), ToolError> {
    let FieldKind::Enum(allowed) = field.kind else {
        return Ok(());
    };
    match value.as_str() {
        Some(s) if allowed.contains(&s) => Ok(()),
        _ => Err(ToolError::validation(
            spec.name,
            format!(
                "field `{}` must be one of {}, got {}",
                field.name,
                allowed.join(", "),
                value
            ),
        )),
    }
}

fn check_rule(
    spec: &ToolSpec,
    rule: CrossFieldRule,
    fields: &Map<String, Value>,
) -> Result<(), ToolError> {
    match rule {
        CrossFieldRule::AtLeastOneOf(names) => {
            if names.iter().any(|n| fields.contains_key(*n)) {
                Ok(())
            } else {
                let listed: Vec<String> = names.iter().map(|n| format!("`{}`", n)).collect();
                Err(ToolError::validation(
                    spec.name,
                    format!("at least one of {} is required", listed.join(" or ")),
                ))
            }
        }
    }
}

fn normalize(field: &FieldSpec, value: Value) -> Value {
    match (field.normalize, value) {
        (Normalize::Uppercase, Value::String(s)) => Value::String(s.to_uppercase()),
        (_, value) => value,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
