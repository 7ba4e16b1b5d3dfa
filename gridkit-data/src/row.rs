use serde_json::{Map, Value};

/// One result row: field name to value.
pub type Row = Map<String, Value>;

/// Flatten positional entries of a raw result row.
///
/// Some projections (an entity plus computed expressions, for instance)
/// come back with the entity nested under a numeric key such as `"0"`. Each
/// entry whose key is a non-negative integer and whose value is a mapping is
/// replaced by that mapping's own entries; every other entry is kept as-is.
/// Entries are visited in map order; on a name clash the later entry wins.
pub fn normalize_row(raw: Row) -> Row {
    let mut normalized = Row::new();
    for (key, value) in raw {
        match value {
            Value::Object(nested) if is_positional(&key) => {
                for (nested_key, nested_value) in nested {
                    normalized.insert(nested_key, nested_value);
                }
            }
            value => {
                normalized.insert(key, value);
            }
        }
    }
    normalized
}

fn is_positional(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit())
}
