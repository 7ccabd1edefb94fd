//! YAML frontmatter serialization.
//!
//! Treated as a pure external collaborator per the purpose/scope's "external
//! collaborators kept pure" design note: this module is a single-call
//! adapter (`to_yaml`) over `serde_yaml`, plus the camelCase→kebab-case key
//! mapping every document kind's frontmatter uses.

use serde::Serialize;
use serde_json::Value;

use crate::error::CompileError;

/// Serializes any frontmatter struct to a YAML document, mapping its
/// camelCase field names to kebab-case keys and omitting fields already
/// absent from the JSON representation (`#[serde(skip_serializing_if)]`
/// upstream already drops unset optional fields).
pub fn to_yaml<T: Serialize>(value: &T) -> Result<String, CompileError> {
    let json = serde_json::to_value(value).map_err(|e| CompileError::ConfigError {
        message: format!("failed to serialize frontmatter: {e}"),
    })?;
    let kebab = kebab_case_keys(json);
    let yaml_value: serde_yaml::Value =
        serde_yaml::to_value(&kebab).map_err(|e| CompileError::ConfigError {
            message: format!("failed to build frontmatter YAML: {e}"),
        })?;
    serde_yaml::to_string(&yaml_value).map_err(|e| CompileError::ConfigError {
        message: format!("failed to render frontmatter YAML: {e}"),
    })
}

fn kebab_case_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mapped = map
                .into_iter()
                .map(|(k, v)| (camel_to_kebab(&k), kebab_case_keys(v)))
                .collect();
            Value::Object(mapped)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(kebab_case_keys).collect()),
        other => other,
    }
}

fn camel_to_kebab(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 4);
    for ch in field.chars() {
        if ch.is_uppercase() {
            out.push('-');
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::CommandMeta;

    #[test]
    fn maps_camel_case_field_to_kebab_case_key() {
        let meta = CommandMeta {
            name: "hello".into(),
            description: "say hi".into(),
            argument_hint: Some("<topic>".into()),
            ..CommandMeta::default()
        };
        let yaml = to_yaml(&meta).unwrap();
        assert!(yaml.contains("name: hello"));
        assert!(yaml.contains("description: say hi"));
        assert!(yaml.contains("argument-hint: <topic>"));
    }

    #[test]
    fn omits_unset_optional_fields() {
        let meta = CommandMeta {
            name: "hello".into(),
            description: "say hi".into(),
            ..CommandMeta::default()
        };
        let yaml = to_yaml(&meta).unwrap();
        assert!(!yaml.contains("agent"));
        assert!(!yaml.contains("allowed-tools"));
    }
}
