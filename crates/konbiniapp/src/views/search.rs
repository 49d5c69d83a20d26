use std::collections::BTreeSet;

use crate::model::{ContentItem, ContentType};

/// Browse filters. All set criteria must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    /// Case-insensitive substring of title or author. Empty matches everything.
    pub query: String,
    pub content_type: Option<ContentType>,
    /// The item must carry every one of these tags.
    pub tags: Vec<String>,
}

impl SearchFilter {
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, content_type: ContentType) -> Self {
        self.content_type = Some(content_type);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Adds the tag if absent, removes it otherwise.
    pub fn toggle_tag(&mut self, tag: &str) {
        if self.tags.iter().any(|t| t == tag) {
            self.tags.retain(|t| t != tag);
        } else {
            self.tags.push(tag.to_string());
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_empty() && self.content_type.is_none() && self.tags.is_empty()
    }

    pub fn matches(&self, item: &ContentItem) -> bool {
        self.matches_query(item) && self.matches_type(item) && self.matches_tags(item)
    }

    fn matches_query(&self, item: &ContentItem) -> bool {
        if self.query.is_empty() {
            return true;
        }
        let query = self.query.to_lowercase();
        item.title.to_lowercase().contains(&query) || item.author.to_lowercase().contains(&query)
    }

    fn matches_type(&self, item: &ContentItem) -> bool {
        self.content_type.map_or(true, |t| item.content_type == t)
    }

    fn matches_tags(&self, item: &ContentItem) -> bool {
        self.tags.iter().all(|tag| item.tags.contains(tag))
    }
}

/// Matching items in collection order.
pub fn filter<'a>(items: &'a [ContentItem], filter: &SearchFilter) -> Vec<&'a ContentItem> {
    items.iter().filter(|item| filter.matches(item)).collect()
}

/// Every tag used by any item, de-duplicated and sorted.
pub fn all_tags(items: &[ContentItem]) -> Vec<String> {
    items
        .iter()
        .flat_map(|item| item.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
