use crate::model::ContentItem;

/// Works published under one author name with aggregated counters.
#[derive(Debug)]
pub struct AuthorProfile<'a> {
    pub name: String,
    pub works: Vec<&'a ContentItem>,
    pub total_views: u64,
    pub total_likes: u64,
}

/// Collects items whose `author` equals `name` exactly.
///
/// Names are not normalized, and two users sharing a display name are
/// indistinguishable here until items carry an author id.
pub fn profile<'a>(items: &'a [ContentItem], name: &str) -> AuthorProfile<'a> {
    let works: Vec<&ContentItem> = items.iter().filter(|i| i.author == name).collect();
    let total_views = works.iter().fold(0u64, |acc, i| acc.saturating_add(i.views));
    let total_likes = works
        .iter()
        .fold(0u64, |acc, i| acc.saturating_add(i.like_count() as u64));
    AuthorProfile {
        name: name.to_string(),
        works,
        total_views,
        total_likes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ContentType;
    use crate::store::memory::fixtures::sample_item;

    #[test]
    fn sums_exact_matches_only() {
        let mut a = sample_item("A", "Lan", ContentType::Novel);
        a.views = 100;
        a.likes = vec!["u1".into(), "u2".into()];
        let mut b = sample_item("B", "Lan", ContentType::Comic);
        b.views = 50;
        b.likes = vec!["u1".into()];
        let mut c = sample_item("C", "lan", ContentType::Video);
        c.views = 1000;
        let items = vec![a, b, c];

        let profile = profile(&items, "Lan");
        assert_eq!(profile.works.len(), 2);
        assert_eq!(profile.total_views, 150);
        assert_eq!(profile.total_likes, 3);
    }

    #[test]
    fn unknown_author_is_empty() {
        let items = vec![sample_item("A", "Lan", ContentType::Novel)];
        let profile = profile(&items, "Nobody");
        assert!(profile.works.is_empty());
        assert_eq!(profile.total_views, 0);
        assert_eq!(profile.total_likes, 0);
    }
}
