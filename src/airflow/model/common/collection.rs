use serde::de::DeserializeOwned;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::airflow::error::{AdapterError, AdapterResult};

/// Paging window sent as `limit`/`offset` query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: 100,
            offset: 0,
        }
    }
}

impl Page {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }

    pub fn to_query(self) -> Vec<(String, String)> {
        vec![
            ("limit".to_string(), self.limit.to_string()),
            ("offset".to_string(), self.offset.to_string()),
        ]
    }
}

/// A page of items under a canonical collection key.
///
/// `items` always holds exactly what the server returned; `total_entries` is
/// the server's count and may be larger (it defaults to the item count when
/// the server omits it).
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<T> {
    pub key: &'static str,
    pub items: Vec<T>,
    pub total_entries: i64,
}

impl<T> Collection<T> {
    pub fn empty(key: &'static str) -> Self {
        Self {
            key,
            items: Vec::new(),
            total_entries: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Re-keys the collection and converts every item.
    pub fn map<U>(self, key: &'static str, f: impl FnMut(T) -> U) -> Collection<U> {
        Collection {
            key,
            items: self.items.into_iter().map(f).collect(),
            total_entries: self.total_entries,
        }
    }
}

impl<T: DeserializeOwned> Collection<T> {
    /// Reads `{<key>: [...], total_entries}` from a response body.
    pub fn from_value(key: &'static str, value: Value) -> AdapterResult<Self> {
        let Value::Object(mut body) = value else {
            return Err(AdapterError::decode(format!(
                "expected an object holding '{key}'"
            )));
        };
        let raw_items = match body.remove(key) {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => {
                return Err(AdapterError::decode(format!(
                    "response has no '{key}' array"
                )))
            }
            Some(other) => {
                return Err(AdapterError::decode(format!(
                    "'{key}' is not an array: {other}"
                )))
            }
        };
        let items = raw_items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()
            .map_err(|e| AdapterError::decode(format!("invalid item in '{key}': {e}")))?;

        #[allow(clippy::cast_possible_wrap)]
        let total_entries = body
            .get("total_entries")
            .and_then(Value::as_i64)
            .unwrap_or(items.len() as i64);
        Ok(Self {
            key,
            items,
            total_entries,
        })
    }
}

impl<T: Serialize> Serialize for Collection<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(self.key, &self.items)?;
        map.serialize_entry("total_entries", &self.total_entries)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_reads_items_and_total() {
        let collection: Collection<Value> = Collection::from_value(
            "pools",
            json!({"pools": [{"name": "default_pool"}], "total_entries": 7}),
        )
        .unwrap();
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.total_entries, 7);
    }

    #[test]
    fn test_missing_total_defaults_to_item_count() {
        let collection: Collection<Value> =
            Collection::from_value("tasks", json!({"tasks": [{"task_id": "a"}, {"task_id": "b"}]}))
                .unwrap();
        assert_eq!(collection.total_entries, 2);
    }

    #[test]
    fn test_missing_key_is_decode_error() {
        let result: AdapterResult<Collection<Value>> =
            Collection::from_value("dags", json!({"detail": "nope"}));
        assert!(matches!(result, Err(AdapterError::Decode { .. })));
    }

    #[test]
    fn test_serializes_under_key() {
        let collection = Collection {
            key: "variables",
            items: vec![json!({"key": "env"})],
            total_entries: 1,
        };
        assert_eq!(
            serde_json::to_value(&collection).unwrap(),
            json!({"variables": [{"key": "env"}], "total_entries": 1})
        );
    }

    #[test]
    fn test_page_query() {
        assert_eq!(
            Page::new(25, 50).to_query(),
            vec![
                ("limit".to_string(), "25".to_string()),
                ("offset".to_string(), "50".to_string())
            ]
        );
    }
}
