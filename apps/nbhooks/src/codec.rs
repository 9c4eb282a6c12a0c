//! Notebook parsing and nbformat-style serialization.
//!
//! Output mirrors what Jupyter writes: keys sorted at every depth, one-space
//! indentation, non-ASCII left unescaped, and a trailing newline.

use crate::error::{Error, Result};
use crate::models::notebook::Notebook;
use serde::Serialize;
use serde_json::{Map, Value as Json};

pub fn parse(text: &str) -> Result<Notebook> {
    let nb: Notebook = serde_json::from_str(text)?;
    if nb.nbformat != 4 {
        return Err(Error::UnsupportedVersion {
            major: nb.nbformat,
            minor: nb.nbformat_minor,
        });
    }
    Ok(nb)
}

pub fn to_string(nb: &Notebook) -> Result<String> {
    let mut value = serde_json::to_value(nb)?;
    sort_keys(&mut value);
    let mut buf = Vec::new();
    let fmt = serde_json::ser::PrettyFormatter::with_indent(b" ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, fmt);
    value.serialize(&mut ser)?;
    buf.push(b'\n');
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Recursively rebuild objects with keys in lexicographic order.
fn sort_keys(json: &mut Json) {
    match json {
        Json::Object(obj) => {
            let mut keys: Vec<String> = obj.keys().cloned().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                if let Some(mut v) = obj.remove(&key) {
                    sort_keys(&mut v);
                    sorted.insert(key, v);
                }
            }
            *obj = sorted;
        }
        Json::Array(items) => items.iter_mut().for_each(sort_keys),
        _ => {}
    }
}
