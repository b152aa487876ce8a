//! Shared response shapes: ids, listings, action results.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque identifier of a remote resource.
///
/// The backend hands out numeric ids for most resources and string ids for
/// some; both are rendered verbatim into paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Number(n) => write!(f, "{}", n),
            ResourceId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ResourceId {
    fn from(id: i64) -> Self {
        ResourceId::Number(id)
    }
}

impl From<i32> for ResourceId {
    fn from(id: i32) -> Self {
        ResourceId::Number(id.into())
    }
}

impl From<u32> for ResourceId {
    fn from(id: u32) -> Self {
        ResourceId::Number(id.into())
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        ResourceId::Text(id.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        ResourceId::Text(id)
    }
}

impl From<&ResourceId> for ResourceId {
    fn from(id: &ResourceId) -> Self {
        id.clone()
    }
}

/// A collection endpoint's answer: either a bare array or a paginated
/// envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Items(Vec<T>),
    Page(Page<T>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Listing<T> {
    pub fn items(&self) -> &[T] {
        match self {
            Listing::Page(page) => &page.results,
            Listing::Items(items) => items,
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            Listing::Page(page) => page.results,
            Listing::Items(items) => items,
        }
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// Total reported by the server, falling back to the items on hand.
    pub fn total(&self) -> u64 {
        match self {
            Listing::Page(page) => page.count.unwrap_or(page.results.len() as u64),
            Listing::Items(items) => items.len() as u64,
        }
    }

    pub fn has_next(&self) -> bool {
        matches!(self, Listing::Page(Page { next: Some(_), .. }))
    }
}

/// Outcome of a mutation (approve, block, refund, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ActionResult {
    /// Human-readable summary, whichever field the server used.
    pub fn summary(&self) -> Option<&str> {
        self.message.as_deref().or(self.detail.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_id_display() {
        assert_eq!(ResourceId::from(42).to_string(), "42");
        assert_eq!(ResourceId::from("42").to_string(), "42");
        assert_eq!(ResourceId::from("RET-9").to_string(), "RET-9");
    }

    #[test]
    fn test_resource_id_text_is_kept_verbatim() {
        assert_eq!(ResourceId::from("007"), ResourceId::Text("007".into()));
        assert_eq!(ResourceId::from("007").to_string(), "007");
        assert_eq!(ResourceId::from(String::from("+5")).to_string(), "+5");
        assert_eq!(ResourceId::from(" 12").to_string(), " 12");
    }

    #[test]
    fn test_resource_id_deserializes_both_forms() {
        let n: ResourceId = serde_json::from_str("17").expect("number id");
        let s: ResourceId = serde_json::from_str("\"ord_17\"").expect("string id");
        assert_eq!(n, ResourceId::Number(17));
        assert_eq!(s, ResourceId::Text("ord_17".into()));
    }

    #[test]
    fn test_listing_bare_array() {
        let listing: Listing<Value> = serde_json::from_str(r#"[{"id":1},{"id":2}]"#).expect("array");
        assert_eq!(listing.len(), 2);
        assert_eq!(listing.total(), 2);
        assert!(!listing.has_next());
    }

    #[test]
    fn test_listing_paginated_envelope() {
        let json = r#"{"count": 57, "next": "https://x/api/users/?page=2", "previous": null, "results": [{"id": 1}]}"#;
        let listing: Listing<Value> = serde_json::from_str(json).expect("page");
        assert_eq!(listing.len(), 1);
        assert_eq!(listing.total(), 57);
        assert!(listing.has_next());
        assert_eq!(listing.into_items().len(), 1);
    }

    #[test]
    fn test_action_result_keeps_unknown_fields() {
        let json = r#"{"message": "Vendor approved", "vendor_id": 42, "status": "approved"}"#;
        let result: ActionResult = serde_json::from_str(json).expect("action");
        assert_eq!(result.summary(), Some("Vendor approved"));
        assert_eq!(result.fields.get("status"), Some(&Value::from("approved")));

        let detail: ActionResult = serde_json::from_str(r#"{"detail": "Refund queued"}"#).expect("detail");
        assert_eq!(detail.summary(), Some("Refund queued"));
    }
}
