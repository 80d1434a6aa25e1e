use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const NEXT_REL: &str = "next";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowRecord {
    pub id: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, Value>,
}

impl RowRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
}

impl Link {
    pub fn next(href: impl Into<String>) -> Self {
        Self {
            rel: NEXT_REL.to_string(),
            href: href.into(),
        }
    }
}

/// One page of records as returned by a record source, or the accumulated
/// dataset once pages have been merged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PageResult {
    pub items: Vec<RowRecord>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub has_more: bool,
}

impl PageResult {
    pub fn has_data(&self) -> bool {
        !self.items.is_empty()
    }

    /// The continuation link, only when the page says more data exists.
    pub fn next_link(&self) -> Option<&str> {
        if !self.has_more {
            return None;
        }
        self.links
            .iter()
            .find(|link| link.rel == NEXT_REL)
            .map(|link| link.href.as_str())
    }

    /// Appends a later page; pagination metadata follows the newest page.
    pub fn append(&mut self, page: PageResult) {
        self.items.extend(page.items);
        self.links = page.links;
        self.has_more = page.has_more;
    }
}
