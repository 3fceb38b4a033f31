use crate::models::Reported;
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct InventoryRecord {
    pub id: String,
    pub name: Option<Value>,
    pub shard_count: Option<u64>,
}

impl InventoryRecord {
    /// `None` sans `uid` exploitable.
    pub fn from_json(record: &Value) -> Option<Self> {
        let id = entity_id_of(record.get("uid")?)?;
        Some(Self {
            id,
            name: record.get("name").filter(|v| !v.is_null()).cloned(),
            shard_count: record.get("shards_count").and_then(Value::as_u64),
        })
    }
}

/// uid -> fiche, le dernier doublon gagne.
#[derive(Debug, Clone, Default)]
pub struct InventoryIndex {
    records: HashMap<String, InventoryRecord>,
}

impl InventoryIndex {
    pub fn build(records: &[Value]) -> Self {
        let mut index = Self::default();
        for (position, raw) in records.iter().enumerate() {
            match InventoryRecord::from_json(raw) {
                Some(record) => {
                    index.records.insert(record.id.clone(), record);
                }
                None => warn!(position, "skipping bdb record without a usable uid"),
            }
        }
        index
    }

    pub fn get(&self, entity_id: &str) -> Option<&InventoryRecord> {
        self.records.get(entity_id)
    }

    pub fn name_of(&self, entity_id: &str) -> Reported<Value> {
        self.get(entity_id).and_then(|r| r.name.clone()).into()
    }

    pub fn shard_count_of(&self, entity_id: &str) -> Reported<u64> {
        self.get(entity_id).and_then(|r| r.shard_count).into()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn entity_id_of(uid: &Value) -> Option<String> {
    match uid {
        Value::Number(n) => n.as_u64().map(|v| v.to_string()),
        Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            Some(s.clone())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_keys_by_uid_string() {
        let index = InventoryIndex::build(&[
            json!({"uid": 1, "name": "mydb", "shards_count": 2}),
            json!({"uid": 12, "name": "cache", "shards_count": 4, "port": 12000}),
        ]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.name_of("1"), Reported::Value(json!("mydb")));
        assert_eq!(index.shard_count_of("12"), Reported::Value(4));
    }

    #[test]
    fn test_missing_fields_default_at_lookup() {
        let index = InventoryIndex::build(&[json!({"uid": 3})]);
        assert!(index.get("3").is_some());
        assert_eq!(index.name_of("3"), Reported::NotAvailable);
        assert_eq!(index.shard_count_of("3"), Reported::NotAvailable);
        assert_eq!(index.name_of("404"), Reported::NotAvailable);
    }

    #[test]
    fn test_duplicate_uid_last_wins() {
        let index = InventoryIndex::build(&[
            json!({"uid": 5, "name": "old"}),
            json!({"uid": 5, "name": "new"}),
        ]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.name_of("5"), Reported::Value(json!("new")));
    }

    #[test]
    fn test_records_without_uid_are_skipped() {
        let index = InventoryIndex::build(&[
            json!({"name": "orphan"}),
            json!({"uid": "x", "name": "bad"}),
            json!({"uid": -1}),
            json!("not an object"),
            json!({"uid": "7", "name": "string-uid"}),
        ]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.name_of("7"), Reported::Value(json!("string-uid")));
    }

    #[test]
    fn test_non_string_name_passes_through() {
        let index = InventoryIndex::build(&[
            json!({"uid": 8, "name": 42}),
            json!({"uid": 9, "name": null}),
        ]);
        assert_eq!(index.name_of("8"), Reported::Value(json!(42)));
        assert_eq!(index.name_of("9"), Reported::NotAvailable);
    }
}
