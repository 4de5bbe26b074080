//! Aggregation value objects

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One independently queryable shard (e.g. one shared drive among many)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub id: String,
    pub name: String,
}

impl SourceDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Opaque continuation token returned by a paginated upstream call
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageCursor(String);

impl PageCursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Interpret an upstream token field; empty strings mean "no more pages".
    pub fn from_token(token: Option<&str>) -> Option<Self> {
        token.filter(|t| !t.is_empty()).map(Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PageCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One page of an upstream listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// `None` once the listing is exhausted
    #[serde(rename = "nextCursor", default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<PageCursor>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_cursor: None,
        }
    }

    pub fn with_cursor(items: Vec<T>, cursor: impl Into<String>) -> Self {
        Self {
            items,
            next_cursor: Some(PageCursor::new(cursor)),
        }
    }

    pub fn is_last(&self) -> bool {
        self.next_cursor.is_none()
    }
}

/// Anything that can be deduplicated across branches
pub trait IdentityKeyed {
    /// Stable key recognising the same logical resource in two branches
    fn identity_key(&self) -> &str;
}

impl IdentityKeyed for SourceDescriptor {
    fn identity_key(&self) -> &str {
        &self.id
    }
}

/// A merged result item: identity key plus the item's fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationItem {
    #[serde(rename = "identityKey")]
    pub identity_key: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl AggregationItem {
    pub fn new(identity_key: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            identity_key: identity_key.into(),
            fields,
        }
    }

    /// Build an item from a JSON object, taking the identity key from
    /// `key_field`. Returns `None` when the value is not an object or the
    /// key field is missing or not a string/number.
    pub fn from_value(value: Value, key_field: &str) -> Option<Self> {
        let Value::Object(fields) = value else {
            return None;
        };
        let key = match fields.get(key_field)? {
            Value::String(s) if !s.is_empty() => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        Some(Self::new(key, fields))
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(|v| v.as_str())
    }

    /// The item's fields as a JSON object (without the synthetic key)
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl IdentityKeyed for AggregationItem {
    fn identity_key(&self) -> &str {
        &self.identity_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cursor_from_token() {
        assert_eq!(PageCursor::from_token(None), None);
        assert_eq!(PageCursor::from_token(Some("")), None);
        assert_eq!(
            PageCursor::from_token(Some("abc")),
            Some(PageCursor::new("abc"))
        );
    }

    #[test]
    fn test_page_wire_shape() {
        let page: Page<Value> =
            serde_json::from_value(json!({"items": [1, 2], "nextCursor": "c2"})).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.next_cursor, Some(PageCursor::new("c2")));

        let page: Page<Value> = serde_json::from_value(json!({"items": []})).unwrap();
        assert!(page.is_last());
    }

    #[test]
    fn test_item_from_value() {
        let item = AggregationItem::from_value(json!({"id": "42", "name": "A"}), "id").unwrap();
        assert_eq!(item.identity_key(), "42");
        assert_eq!(item.get_str("name"), Some("A"));

        let numeric = AggregationItem::from_value(json!({"id": 7}), "id").unwrap();
        assert_eq!(numeric.identity_key(), "7");

        assert!(AggregationItem::from_value(json!({"name": "no id"}), "id").is_none());
        assert!(AggregationItem::from_value(json!("scalar"), "id").is_none());
    }
}
