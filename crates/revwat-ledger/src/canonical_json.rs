//! Canonical JSON serialization.
//!
//! Block hashes must be stable across processes and `serde_json` releases,
//! so the ledger never enables the `preserve_order` feature: `serde_json`'s
//! `Map` is then backed by a `BTreeMap`, and object keys serialize in
//! sorted order automatically. Struct fields still serialize in
//! declaration order, which is why every hashed struct in [`crate::block`]
//! declares its fields alphabetically by hand.

use serde::Serialize;

/// Serializes `value` to its canonical JSON string form.
pub fn to_canonical_string<T: Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn map_keys_sort_regardless_of_insertion_order() {
        let mut map = serde_json::Map::new();
        map.insert("zebra".to_string(), json!(1));
        map.insert("apple".to_string(), json!(2));
        let rendered = to_canonical_string(&map).unwrap();
        assert!(rendered.find("apple").unwrap() < rendered.find("zebra").unwrap());
    }
}
