//! Variable name → value mapping used for inbound context and outbound output.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Process variables of one in-flight request. Keys are unique, iteration
/// follows insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableStore {
    entries: Map<String, Value>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Insert or replace a variable. A replaced key keeps its original position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for VariableStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut store = Self::new();
        for (k, v) in iter {
            store.set(k, v);
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_returns_none_for_missing_key() {
        let store = VariableStore::new();
        assert!(store.get("x").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn set_overwrites_existing_key() {
        let mut store = VariableStore::new();
        store.set("x", 1);
        store.set("x", "two");
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("x"), Some(&json!("two")));
    }

    #[test]
    fn entries_follow_insertion_order() {
        let store = VariableStore::new()
            .with("zeta", 1)
            .with("alpha", true)
            .with("mid", json!({"nested": [1, 2]}));

        let keys: Vec<&str> = store.entries().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn replaced_key_keeps_position() {
        let mut store = VariableStore::new().with("a", 1).with("b", 2);
        store.set("a", 3);
        let keys: Vec<&str> = store.entries().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn holds_dynamic_values() {
        let store: VariableStore = [
            ("s", json!("text")),
            ("n", json!(5)),
            ("b", json!(false)),
            ("r", json!({"k": "v"})),
            ("null", Value::Null),
        ]
        .into_iter()
        .collect();

        assert_eq!(store.len(), 5);
        assert_eq!(store.get("null"), Some(&Value::Null));
        assert!(store.contains("r"));
    }

    #[test]
    fn serializes_as_plain_object() {
        let store = VariableStore::new().with("x", 5);
        assert_eq!(serde_json::to_value(&store).unwrap(), json!({"x": 5}));

        let back: VariableStore = serde_json::from_value(json!({"y": "z"})).unwrap();
        assert_eq!(back.get("y"), Some(&json!("z")));
    }
}
