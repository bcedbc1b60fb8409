//! Block-style YAML rendering.
//!
//! Mappings keep insertion order, indentation is two spaces, lines are never wrapped, and
//! a sequence is indented under its parent key instead of sitting flush with it:
//!
//! ```yaml
//! clusters:
//!   - Cluster_name: exa1
//!     devices:
//!       - Device_name: sfa1
//! ```

use serde::Serialize;
use serde_yaml::{Mapping, Value};

use exa_core::Error;

use crate::Result;

const INDENT: usize = 2;

/// Serializes `value` as a block-style YAML document.
///
/// # Errors
///
/// Returns [`Error::Document`] if the value cannot be represented as YAML.
pub fn to_block_yaml<T: Serialize>(value: &T) -> Result<String> {
    let value = serde_yaml::to_value(value).map_err(|e| Error::Document(e.to_string()))?;
    let mut out = String::new();
    match &value {
        Value::Mapping(map) if !map.is_empty() => write_mapping(&mut out, map, 0, false)?,
        Value::Sequence(items) if !items.is_empty() => write_sequence(&mut out, items, 0)?,
        other => {
            out.push_str(&scalar(other)?);
            out.push('\n');
        }
    }
    Ok(out)
}

/// Writes mapping entries at `indent`; with `inline_first` the first key continues the
/// current line (after a sequence dash).
fn write_mapping(out: &mut String, map: &Mapping, indent: usize, inline_first: bool) -> Result<()> {
    for (position, (key, value)) in map.iter().enumerate() {
        if position > 0 || !inline_first {
            pad(out, indent);
        }
        out.push_str(&scalar(key)?);
        out.push(':');
        match value {
            Value::Mapping(child) if !child.is_empty() => {
                out.push('\n');
                write_mapping(out, child, indent + INDENT, false)?;
            }
            Value::Sequence(items) if !items.is_empty() => {
                out.push('\n');
                write_sequence(out, items, indent + INDENT)?;
            }
            other => {
                out.push(' ');
                out.push_str(&scalar(other)?);
                out.push('\n');
            }
        }
    }
    Ok(())
}

fn write_sequence(out: &mut String, items: &[Value], indent: usize) -> Result<()> {
    for item in items {
        pad(out, indent);
        match item {
            Value::Mapping(child) if !child.is_empty() => {
                out.push_str("- ");
                write_mapping(out, child, indent + INDENT, true)?;
            }
            Value::Sequence(nested) if !nested.is_empty() => {
                out.push_str("-\n");
                write_sequence(out, nested, indent + INDENT)?;
            }
            other => {
                out.push_str("- ");
                out.push_str(&scalar(other)?);
                out.push('\n');
            }
        }
    }
    Ok(())
}

fn pad(out: &mut String, indent: usize) {
    out.extend(std::iter::repeat(' ').take(indent));
}

/// Renders a scalar (or an empty collection) on one line.
fn scalar(value: &Value) -> Result<String> {
    match value {
        Value::Null => Ok("null".to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Number(number) => Ok(number.to_string()),
        Value::String(text) => {
            let rendered = serde_yaml::to_string(text).map_err(|e| Error::Document(e.to_string()))?;
            let rendered = rendered.trim_end();
            if rendered.contains('\n') {
                double_quoted(text)
            } else {
                Ok(rendered.to_string())
            }
        }
        Value::Sequence(items) if items.is_empty() => Ok("[]".to_string()),
        Value::Mapping(map) if map.is_empty() => Ok("{}".to_string()),
        other => Err(Error::Document(format!(
            "unsupported inline value: {other:?}"
        ))),
    }
}

/// A double-quoted scalar, always on one line.
fn double_quoted(text: &str) -> Result<String> {
    serde_json::to_string(text).map_err(|e| Error::Document(e.to_string()))
}
