//! Property extraction
//!
//! Walks a descriptor record along a path like `CacheNodes[0].Endpoint.Address`.
//! A missing path is `None`; a present JSON `null` is `Some(&Value::Null)`.

use serde_json::Value;

/// One step of a property path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Split a path on dots and brackets. Empty segments are dropped.
pub fn parse_path(path: &str) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars();

    while let Some(c) = chars.next() {
        match c {
            '.' => flush(&mut current, &mut segments),
            '[' => {
                flush(&mut current, &mut segments);
                let mut inner = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == ']' {
                        closed = true;
                        break;
                    }
                    inner.push(c);
                }
                if closed {
                    segments.push(match inner.parse::<usize>() {
                        Ok(idx) => PathSegment::Index(idx),
                        Err(_) => PathSegment::Key(inner),
                    });
                } else {
                    // Unclosed bracket: keep the text as a key
                    current.push('[');
                    current.push_str(&inner);
                }
            }
            _ => current.push(c),
        }
    }
    flush(&mut current, &mut segments);

    segments
}

fn flush(current: &mut String, segments: &mut Vec<PathSegment>) {
    if !current.is_empty() {
        segments.push(PathSegment::Key(std::mem::take(current)));
    }
}

/// Extract a value from a record using a dot/bracket path
pub fn extract_property<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    // A key that literally contains dots wins over path traversal
    if let Some(value) = record.as_object().and_then(|map| map.get(path)) {
        return Some(value);
    }

    let segments = parse_path(path);
    if segments.is_empty() {
        return None;
    }

    let mut current = record;
    for segment in &segments {
        current = match (segment, current) {
            (PathSegment::Index(idx), Value::Array(items)) => items.get(*idx)?,
            (PathSegment::Index(idx), Value::Object(map)) => map.get(&idx.to_string())?,
            (PathSegment::Key(key), Value::Object(map)) => map.get(key)?,
            // Numeric keys index arrays too (`Items.0.Name`)
            (PathSegment::Key(key), Value::Array(items)) => items.get(key.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current)
}

/// Top-level keys of a record, listed when a property is missing
pub fn top_level_keys(record: &Value) -> Vec<String> {
    match record {
        Value::Object(map) => {
            let mut keys: Vec<String> = map.keys().cloned().collect();
            keys.sort();
            keys
        }
        Value::Array(items) => (0..items.len()).map(|i| i.to_string()).collect(),
        _ => Vec::new(),
    }
}
