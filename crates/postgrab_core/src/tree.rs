use serde_json::Value;

/// Depth-first search over an attribute tree.
///
/// Visits every `(key, value)` pair of every mapping. At a mapping all of its own
/// entries are offered to `visit` before any value is descended into; values are
/// then searched in key order and sequence elements in index order. The first
/// `Some` returned by `visit` wins.
pub fn find_first<'a, T, F>(tree: &'a Value, visit: &mut F) -> Option<T>
where
    F: FnMut(&'a str, &'a Value) -> Option<T>,
{
    match tree {
        Value::Object(map) => {
            for (key, value) in map {
                if let Some(found) = visit(key.as_str(), value) {
                    return Some(found);
                }
            }
            map.values().find_map(|value| find_first(value, visit))
        }
        Value::Array(items) => items.iter().find_map(|item| find_first(item, visit)),
        _ => None,
    }
}

/// First non-null value stored under `key` anywhere in `tree`.
pub fn find_key<'a>(tree: &'a Value, key: &str) -> Option<&'a Value> {
    find_first(tree, &mut |k, v: &'a Value| (k == key && !v.is_null()).then_some(v))
}

/// Like [`find_key`] but only accepts string values.
pub fn find_str<'a>(tree: &'a Value, key: &str) -> Option<&'a str> {
    find_first(tree, &mut |k, v: &'a Value| {
        if k == key {
            v.as_str()
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{find_key, find_str};

    #[test]
    fn own_keys_win_over_nested_ones() {
        let tree = json!({
            "a": { "target": "deep" },
            "target": "shallow"
        });
        assert_eq!(find_str(&tree, "target"), Some("shallow"));
    }

    #[test]
    fn null_matches_are_skipped() {
        let tree = json!({
            "target": null,
            "inner": [ { "target": 3 } ]
        });
        assert_eq!(find_key(&tree, "target"), Some(&json!(3)));
    }

    #[test]
    fn scalars_have_no_keys() {
        assert_eq!(find_key(&json!("target"), "target"), None);
        assert_eq!(find_key(&json!(null), "target"), None);
    }
}
