// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Dotted field paths over JSON values.
//!
//! `"mesh.nodes.0.id"` walks object keys; a numeric segment indexes into an
//! array when reading. Writes only create objects.

use serde_json::{Map, Value};

use crate::errors::MappingError;

/// Read the value at `path`, or `None` if any segment is missing.
pub fn get_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Write `new_value` at `path`, creating intermediate objects as needed.
pub fn set_path(target: &mut Map<String, Value>, path: &str, new_value: Value) -> Result<(), MappingError> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(MappingError::InvalidPath(path.to_string()));
    }

    let (last, parents) = segments
        .split_last()
        .ok_or_else(|| MappingError::InvalidPath(path.to_string()))?;

    let mut current = target;
    for segment in parents {
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        current = match entry {
            Value::Object(map) => map,
            _ => return Err(MappingError::InvalidPath(path.to_string())),
        };
    }
    current.insert(last.to_string(), new_value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_path_walks_objects_and_arrays() {
        let v = json!({"mesh": {"nodes": [{"id": 7}]}, "n": 1});
        assert_eq!(get_path(&v, "n"), Some(&json!(1)));
        assert_eq!(get_path(&v, "mesh.nodes.0.id"), Some(&json!(7)));
        assert_eq!(get_path(&v, "mesh.nodes.3.id"), None);
        assert_eq!(get_path(&v, "mesh.missing"), None);
        assert_eq!(get_path(&v, "n.deeper"), None);
        assert_eq!(get_path(&v, ""), Some(&v));
    }

    #[test]
    fn test_set_path_creates_intermediate_objects() {
        let mut out = Map::new();
        set_path(&mut out, "solver.settings.tolerance", json!(0.1)).unwrap();
        set_path(&mut out, "solver.name", json!("cg")).unwrap();
        assert_eq!(
            Value::Object(out),
            json!({"solver": {"settings": {"tolerance": 0.1}, "name": "cg"}})
        );
    }

    #[test]
    fn test_set_path_rejects_bad_paths() {
        let mut out = Map::new();
        out.insert("scalar".to_string(), json!(3));
        assert!(matches!(
            set_path(&mut out, "scalar.inner", json!(1)),
            Err(MappingError::InvalidPath(_))
        ));
        assert!(set_path(&mut out, "a..b", json!(1)).is_err());
        assert!(set_path(&mut out, "", json!(1)).is_err());
    }
}
