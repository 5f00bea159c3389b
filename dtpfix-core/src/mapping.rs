//! YAML class mapping loader.
//!
//! The file is a flat map of old element-type label to new label:
//!
//! ```yaml
//! IfcWall: Wall
//! IfcSpace: ignore
//! ```

use anyhow::{Context, bail};
use camino::Utf8Path;
use dtpfix_types::mapping::ClassMapping;
use fs_err as fs;
use serde_yaml::Value;
use std::collections::BTreeMap;

pub fn load_class_mapping(path: &Utf8Path) -> anyhow::Result<ClassMapping> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read class mapping {path}"))?;
    parse_class_mapping(&contents).with_context(|| format!("parse class mapping {path}"))
}

/// Parse a mapping. An empty document is an empty mapping.
///
/// Values must be non-empty strings. A null, numeric or boolean value is
/// rejected rather than coerced, since it would be written to the graph as
/// the new label.
pub fn parse_class_mapping(contents: &str) -> anyhow::Result<ClassMapping> {
    if contents.trim().is_empty() {
        return Ok(ClassMapping::new());
    }
    let entries: Option<BTreeMap<String, Value>> =
        serde_yaml::from_str(contents).context("invalid YAML class mapping")?;

    let mut mapping = ClassMapping::new();
    for (label, value) in entries.unwrap_or_default() {
        match value {
            Value::String(new_label) if !new_label.trim().is_empty() => {
                mapping.insert(label, new_label);
            }
            Value::String(_) => bail!("class mapping entry '{label}' has an empty value"),
            other => bail!(
                "class mapping entry '{label}' must map to a string, found {}",
                kind(&other)
            ),
        }
    }
    Ok(mapping)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
