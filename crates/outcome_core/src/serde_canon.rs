//! Canonical JSON serialization for deterministic hashing
//!
//! Object keys are sorted recursively so that the same artifact always
//! produces the same bytes, and therefore the same Blake3 digest.

use serde::Serialize;
use serde_json::{map::Map, ser::PrettyFormatter, Serializer, Value};
use std::collections::BTreeMap;
use std::io::Write;

/// Recursively sort JSON object keys
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<&String, Value> =
                map.iter().map(|(k, v)| (k, canonicalize(v))).collect();
            let mut out = Map::with_capacity(sorted.len());
            for (k, v) in sorted {
                out.insert(k.clone(), v);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Compact canonical JSON (sorted keys, no whitespace)
pub fn to_canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let value = serde_json::to_value(value)?;
    serde_json::to_string(&canonicalize(&value))
}

/// Pretty canonical JSON with two-space indentation, used for files on disk
pub fn to_canonical_json_pretty<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let canonical = canonicalize(&serde_json::to_value(value)?);
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"  ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    canonical.serialize(&mut serializer)?;
    buffer.write_all(b"\n").map_err(serde_json::Error::io)?;
    Ok(buffer)
}

/// Blake3 digest of the canonical JSON form, as hex
pub fn hash_canonical_hex<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let json = to_canonical_json(value)?;
    Ok(hex::encode(blake3::hash(json.as_bytes()).as_bytes()))
}
