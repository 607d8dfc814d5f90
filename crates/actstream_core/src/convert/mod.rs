//! AS1 <-> AS2 tree conversion.
//!
//! # Responsibility
//! - Convert AS1 trees to AS2 (`from_as1`) and AS2 trees to AS1 (`to_as1`).
//! - Keep unrecognized keys untouched so converters stay field-by-field.
//! - Carry quote posts and Mastodon profile links across both dialects.
//!
//! # Invariants
//! - Inputs are borrowed and never mutated; every call builds a new tree.
//! - AS2 output never carries `verb`/`objectType`; AS1 output never carries
//!   `@context`/`type`.
//! - Only the outermost AS2 object carries `@context`.
//! - Outputs are trimmed of null and empty values.

pub mod error;
pub mod from_as1;
pub mod options;
mod profile_links;
mod quotes;
pub mod to_as1;

use crate::util::json::{is_empty, Object};
use serde_json::Value;

/// Copies every key of `obj` that the converter does not rewrite.
fn passthrough(obj: &Object, recognized: &[&str]) -> Object {
    obj.iter()
        .filter(|(key, _)| !recognized.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Inserts `value` unless it is empty, so converted fields never clobber
/// passthrough data with nothing.
fn put(out: &mut Object, key: &str, value: Value) {
    if !is_empty(&value) {
        out.insert(key.to_string(), value);
    }
}

fn child_path(path: &str, key: &str) -> String {
    format!("{path}.{key}")
}

fn element_path(path: &str, key: &str, index: usize) -> String {
    format!("{path}.{key}[{index}]")
}
