//! Generic views of documents as trees of values
//!
//! Any serializable document can be seen as a [`Value`] tree. A node counts as *present* unless
//! it is null, or a list or record holding nothing present; this is what makes a field that was
//! never set distinct from one explicitly set to `false`, `0` or `""`.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::Step;

/// Serializes a document into a tree
pub fn to_tree(value: &impl Serialize) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| {
        tracing::error!("Document cannot be represented as a tree: {}", e);
        Value::Null
    })
}

/// Returns true if the node holds nothing
///
/// A record whose fields are all unset holds nothing, however deeply nested.
pub fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.iter().all(is_absent),
        Value::Object(fields) => fields.values().all(is_absent),
        _ => false,
    }
}

/// A short name for the kind of a node
pub fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "record",
    }
}

/// Visits every present node, parents before children
///
/// The visitor receives the node's steps as they are in `value`, and the same steps with
/// record field names passed through `rename`.
pub fn walk_present(
    value: &Value,
    rename: &dyn Fn(&str) -> String,
    visit: &mut dyn FnMut(&[Step], &[Step]),
) {
    fn walk(
        value: &Value,
        from: &mut Vec<Step>,
        to: &mut Vec<Step>,
        rename: &dyn Fn(&str) -> String,
        visit: &mut dyn FnMut(&[Step], &[Step]),
    ) {
        if is_absent(value) {
            return;
        }
        visit(from, to);
        match value {
            Value::Object(fields) => {
                for (name, child) in fields {
                    from.push(Step::from(name));
                    to.push(Step::Name(rename(name)));
                    walk(child, from, to, rename, visit);
                    from.pop();
                    to.pop();
                }
            }
            Value::Array(items) => {
                for (index, child) in items.iter().enumerate() {
                    from.push(Step::Index(index));
                    to.push(Step::Index(index));
                    walk(child, from, to, rename, visit);
                    from.pop();
                    to.pop();
                }
            }
            _ => {}
        }
    }
    walk(value, &mut Vec::new(), &mut Vec::new(), rename, visit)
}

/// The steps to every present node, parents before children
pub fn present_nodes(value: &Value) -> Vec<Vec<Step>> {
    let mut nodes = Vec::new();
    walk_present(value, &|name| name.to_owned(), &mut |from, _| {
        nodes.push(from.to_vec())
    });
    nodes
}

/// Renames every record field in the tree
pub fn rename_keys(value: Value, rename: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(name, child)| (rename(&name), rename_keys(child, rename)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|child| rename_keys(child, rename))
                .collect(),
        ),
        other => other,
    }
}

/// Removes every absent node, leaving only what was set
pub fn strip_absent(value: Value) -> Value {
    match value {
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(name, child)| (name, strip_absent(child)))
                .filter(|(_, child)| !is_absent(child))
                .collect::<Map<_, _>>(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(strip_absent)
                .filter(|child| !is_absent(child))
                .collect(),
        ),
        other => other,
    }
}

/// Finds record fields that are set in `input` but were not carried into `model`
///
/// Comparing a parsed input tree with the tree of the model deserialized from it reveals the
/// keys the model ignored. Lists are compared position by position.
pub fn unused_keys(input: &Value, model: &Value) -> Vec<Vec<Step>> {
    fn compare(input: &Value, model: Option<&Value>, path: &mut Vec<Step>, out: &mut Vec<Vec<Step>>) {
        match input {
            Value::Object(fields) => {
                for (name, child) in fields {
                    if is_absent(child) {
                        continue;
                    }
                    path.push(Step::from(name));
                    let counterpart = model.and_then(|model| model.get(name));
                    match counterpart {
                        Some(counterpart) if !is_absent(counterpart) => {
                            compare(child, Some(counterpart), path, out)
                        }
                        _ => out.push(path.clone()),
                    }
                    path.pop();
                }
            }
            Value::Array(items) => {
                for (index, child) in items.iter().enumerate() {
                    path.push(Step::Index(index));
                    compare(child, model.and_then(|model| model.get(index)), path, out);
                    path.pop();
                }
            }
            _ => {}
        }
    }
    let mut out = Vec::new();
    compare(input, Some(model), &mut Vec::new(), &mut out);
    out
}
