use crate::model::{ContentItem, ContentType};

pub const LIKE_WEIGHT: u64 = 5;

/// `views + 5 × likes`.
pub fn hot_score(item: &ContentItem) -> u64 {
    let likes = u64::try_from(item.like_count()).unwrap_or(u64::MAX);
    item.views.saturating_add(likes.saturating_mul(LIKE_WEIGHT))
}

/// Items ordered by descending hot score. `sort_by_key` is a stable sort, so
/// equal scores keep their collection order.
pub fn rank<'a, I>(items: I) -> Vec<&'a ContentItem>
where
    I: IntoIterator<Item = &'a ContentItem>,
{
    let mut ranked: Vec<&ContentItem> = items.into_iter().collect();
    ranked.sort_by_key(|item| std::cmp::Reverse(hot_score(item)));
    ranked
}

pub fn top_by_type(items: &[ContentItem], content_type: ContentType, n: usize) -> Vec<&ContentItem> {
    let mut ranked = rank(items.iter().filter(|i| i.content_type == content_type));
    ranked.truncate(n);
    ranked
}

/// The highest-scored item of any type; the first one on ties.
pub fn spotlight(items: &[ContentItem]) -> Option<&ContentItem> {
    rank(items).into_iter().next()
}

#[derive(Debug)]
pub struct HomeSections<'a> {
    pub spotlight: Option<&'a ContentItem>,
    pub novels: Vec<&'a ContentItem>,
    pub comics: Vec<&'a ContentItem>,
    pub videos: Vec<&'a ContentItem>,
}

pub fn home_sections(items: &[ContentItem], n: usize) -> HomeSections<'_> {
    HomeSections {
        spotlight: spotlight(items),
        novels: top_by_type(items, ContentType::Novel, n),
        comics: top_by_type(items, ContentType::Comic, n),
        videos: top_by_type(items, ContentType::Video, n),
    }
}
