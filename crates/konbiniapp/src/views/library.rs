//! Per-user joins between a user's references and the live item collection.

use crate::model::{Chapter, ContentItem, ReadingProgress, User};

/// Marker the studio puts in author names of admin-authored drafts.
pub const ADMIN_AUTHOR_MARKER: &str = "Tôi";

/// A history entry joined with the item it points at.
#[derive(Debug)]
pub struct HistoryEntry<'a> {
    pub item: &'a ContentItem,
    pub progress: &'a ReadingProgress,
}

impl<'a> HistoryEntry<'a> {
    /// The chapter the reader reached, if the index still points inside the item.
    pub fn chapter(&self) -> Option<&'a Chapter> {
        chapter_for(self.item, self.progress)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibraryStats {
    pub works: usize,
    pub favorites: usize,
    pub history: usize,
}

/// Items in `user.favorites`, in collection order. Favorites of deleted items are skipped.
pub fn favorites<'a>(items: &'a [ContentItem], user: &User) -> Vec<&'a ContentItem> {
    items.iter().filter(|i| user.has_favorite(&i.id)).collect()
}

/// History entries in the user's order, joined against live items.
/// Entries whose item no longer exists are dropped.
pub fn history<'a>(items: &'a [ContentItem], user: &'a User) -> Vec<HistoryEntry<'a>> {
    user.reading_history
        .iter()
        .filter_map(|progress| {
            items
                .iter()
                .find(|i| i.id == progress.content_id)
                .map(|item| HistoryEntry { item, progress })
        })
        .collect()
}

/// Items attributed to the user by display name. Admins also see studio drafts
/// whose author carries the admin marker.
pub fn my_works<'a>(items: &'a [ContentItem], user: &User) -> Vec<&'a ContentItem> {
    items
        .iter()
        .filter(|i| {
            i.author == user.name || (user.is_admin() && i.author.contains(ADMIN_AUTHOR_MARKER))
        })
        .collect()
}

pub fn stats(items: &[ContentItem], user: &User) -> LibraryStats {
    LibraryStats {
        works: my_works(items, user).len(),
        favorites: favorites(items, user).len(),
        history: history(items, user).len(),
    }
}

/// Resolves positional progress to a chapter. `None` when chapters were removed
/// after the progress was recorded.
pub fn chapter_for<'a>(item: &'a ContentItem, progress: &ReadingProgress) -> Option<&'a Chapter> {
    item.chapters.get(progress.chapter_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentType, UserRole};
    use crate::store::memory::fixtures::{sample_item, signed_in};
    use chrono::Utc;

    fn items() -> Vec<ContentItem> {
        let mut a = sample_item("A", "Lan", ContentType::Novel);
        a.id = "a".into();
        let mut b = sample_item("B", "Tôi (admin)", ContentType::Comic);
        b.id = "b".into();
        let mut c = sample_item("C", "Minh", ContentType::Video);
        c.id = "c".into();
        vec![a, b, c]
    }

    #[test]
    fn favorites_skip_dangling_ids() {
        let items = items();
        let mut user = signed_in("u1", "Lan", UserRole::Reader);
        user.favorites = vec!["c".into(), "deleted".into(), "a".into()];

        let favs = favorites(&items, &user);
        let ids: Vec<_> = favs.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn history_drops_missing_items_and_keeps_progress() {
        let items = items();
        let mut user = signed_in("u1", "Lan", UserRole::Reader);
        user.upsert_progress("c", 0, Utc::now());
        user.upsert_progress("gone", 2, Utc::now());
        user.upsert_progress("a", 5, Utc::now());

        let entries = history(&items, &user);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].item.id, "c");
        assert_eq!(entries[1].progress.chapter_index, 5);
        assert!(entries[0].chapter().is_some());
        // "a" has one chapter, so index 5 is stale
        assert!(entries[1].chapter().is_none());
    }

    #[test]
    fn my_works_matches_name_and_admin_marker() {
        let items = items();
        let reader = signed_in("u1", "Lan", UserRole::Reader);
        let works = my_works(&items, &reader);
        assert_eq!(works.len(), 1);

        let admin = signed_in("u2", "Owner", UserRole::Admin);
        let works = my_works(&items, &admin);
        assert_eq!(works.len(), 1);
        assert_eq!(works[0].id, "b");
    }

    #[test]
    fn stats_count_each_section() {
        let items = items();
        let mut user = signed_in("u1", "Lan", UserRole::Reader);
        user.favorites = vec!["a".into(), "b".into()];
        user.upsert_progress("c", 0, Utc::now());

        assert_eq!(
            stats(&items, &user),
            LibraryStats {
                works: 1,
                favorites: 2,
                history: 1
            }
        );
    }
}
