//! # Domain Model
//!
//! Core records of the platform: [`ContentItem`] with its [`Chapter`]s, [`Comment`],
//! [`User`] with [`ReadingProgress`], and the [`SiteSettings`] singleton.
//!
//! ## Stored Shape
//!
//! Records are serialized as camelCase JSON. A chapter keeps exactly one payload
//! field next to its metadata:
//!
//! ```text
//! { "id": "c1", "title": "...", "content": "<p>...</p>", "createdAt": "..." }   // novel
//! { "id": "c1", "title": "...", "pages": ["https://..."], "createdAt": "..." }  // comic
//! { "id": "c1", "title": "...", "videoUrl": "https://...", "createdAt": "..." } // video
//! ```
//!
//! ## Invariants
//!
//! - `ContentItem.likes` never holds the same user twice.
//! - A chapter's payload matches its parent's [`ContentType`] (see [`ContentItem::validate`]).
//! - `User.favorites` has no duplicates and `User.reading_history` holds at most one
//!   entry per content id.
//!
//! ## Denormalized Fields
//!
//! `ContentItem.author` is a display name, not a reference to a [`User`]. The
//! `user_name` / `user_avatar` of a [`Comment`] are a snapshot taken when the
//! comment was written; renaming a user does not rewrite old comments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

use crate::error::{KonbiniError, Result};

pub const GUEST_NAME: &str = "Khách ẩn danh";
pub const GUEST_AVATAR: &str =
    "https://api.dicebear.com/7.x/identicon/svg?seed=guest&backgroundColor=f0f0f0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Novel,
    Comic,
    Video,
}

impl ContentType {
    pub const ALL: [ContentType; 3] = [ContentType::Novel, ContentType::Comic, ContentType::Video];
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContentType::Novel => "novel",
            ContentType::Comic => "comic",
            ContentType::Video => "video",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Creator,
    #[default]
    Reader,
}

/// The renderable body of a chapter. Which variant is valid depends on the
/// parent item's [`ContentType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChapterPayload {
    Text {
        content: String,
    },
    Pages {
        pages: Vec<String>,
    },
    Video {
        #[serde(rename = "videoUrl")]
        video_url: String,
    },
}

impl ChapterPayload {
    pub fn content_type(&self) -> ContentType {
        match self {
            ChapterPayload::Text { .. } => ContentType::Novel,
            ChapterPayload::Pages { .. } => ContentType::Comic,
            ChapterPayload::Video { .. } => ContentType::Video,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    /// Unique within the parent item only.
    pub id: String,
    pub title: String,
    #[serde(flatten)]
    pub payload: ChapterPayload,
    pub created_at: DateTime<Utc>,
}

impl Chapter {
    pub fn new(id: impl Into<String>, title: impl Into<String>, payload: ChapterPayload) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            payload,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub cover_url: String,
    /// Free-text display name, matched by exact string.
    pub author: String,
    pub views: u64,
    /// User ids that liked this item.
    #[serde(default)]
    pub likes: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Reading order.
    pub chapters: Vec<Chapter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl ContentItem {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        content_type: ContentType,
        chapters: Vec<Chapter>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: String::new(),
            content_type,
            cover_url: String::new(),
            author: author.into(),
            views: 0,
            likes: Vec::new(),
            created_at: Utc::now(),
            tags: Vec::new(),
            chapters,
            status: None,
        }
    }

    pub fn like_count(&self) -> usize {
        self.likes.len()
    }

    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.likes.iter().any(|id| id == user_id)
    }

    /// Flips `user_id`'s like and returns whether the item is now liked.
    ///
    /// Removing drops every occurrence, so data written before duplicates were
    /// rejected converges back to the set invariant.
    pub fn toggle_like(&mut self, user_id: &str) -> bool {
        if self.is_liked_by(user_id) {
            self.likes.retain(|id| id != user_id);
            false
        } else {
            self.likes.push(user_id.to_string());
            true
        }
    }

    /// Checks everything a reader needs to render the item.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(KonbiniError::Validation("item id is empty".to_string()));
        }
        if self.title.trim().is_empty() {
            return Err(KonbiniError::Validation("item title is empty".to_string()));
        }
        if self.chapters.is_empty() {
            return Err(KonbiniError::Validation(format!(
                "'{}' has no chapters",
                self.title
            )));
        }

        let mut chapter_ids = HashSet::new();
        for (idx, chapter) in self.chapters.iter().enumerate() {
            if !chapter_ids.insert(chapter.id.as_str()) {
                return Err(KonbiniError::Validation(format!(
                    "duplicate chapter id '{}' in '{}'",
                    chapter.id, self.title
                )));
            }
            let kind = chapter.payload.content_type();
            if kind != self.content_type {
                return Err(KonbiniError::Validation(format!(
                    "chapter {} of '{}' carries a {} payload, expected {}",
                    idx + 1,
                    self.title,
                    kind,
                    self.content_type
                )));
            }
            match &chapter.payload {
                ChapterPayload::Pages { pages } if pages.is_empty() => {
                    return Err(KonbiniError::Validation(format!(
                        "chapter {} of '{}' has no pages",
                        idx + 1,
                        self.title
                    )));
                }
                ChapterPayload::Video { video_url } if video_url.trim().is_empty() => {
                    return Err(KonbiniError::Validation(format!(
                        "chapter {} of '{}' has no video url",
                        idx + 1,
                        self.title
                    )));
                }
                _ => {}
            }
        }

        let mut seen = HashSet::new();
        if let Some(dup) = self.likes.iter().find(|id| !seen.insert(id.as_str())) {
            return Err(KonbiniError::Validation(format!(
                "user '{}' likes '{}' twice",
                dup, self.title
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub content_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paragraph_index: Option<usize>,
    pub user_id: String,
    /// Snapshot of the author's name at comment time.
    pub user_name: String,
    /// Snapshot of the author's avatar at comment time.
    pub user_avatar: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    /// Reserved for soft delete; no operation sets it yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Comment {
    pub fn new(content_id: impl Into<String>, author: &User, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content_id: content_id.into(),
            chapter_id: None,
            paragraph_index: None,
            user_id: author.id.clone(),
            user_name: author.name.clone(),
            user_avatar: author.avatar.clone(),
            text: text.into(),
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    pub fn on_chapter(mut self, chapter_id: impl Into<String>) -> Self {
        self.chapter_id = Some(chapter_id.into());
        self
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingProgress {
    pub content_id: String,
    /// Position in the item's chapter list, not a chapter id.
    pub chapter_index: usize,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub avatar: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub role: UserRole,
    pub is_anonymous: bool,
    pub favorites: Vec<String>,
    pub reading_history: Vec<ReadingProgress>,
}

// Profiles written by older builds may repeat favorites or history entries.
// Collapse them on load: favorites keep first occurrence, history keeps the
// most recently written entry for each content id.
impl<'de> Deserialize<'de> for User {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let helper = UserHelper::deserialize(deserializer)?;

        let mut favorites: Vec<String> = Vec::with_capacity(helper.favorites.len());
        for id in helper.favorites {
            if !favorites.contains(&id) {
                favorites.push(id);
            }
        }

        let mut reading_history: Vec<ReadingProgress> = Vec::new();
        for entry in helper.reading_history {
            match reading_history
                .iter_mut()
                .find(|h| h.content_id == entry.content_id)
            {
                Some(existing) => *existing = entry,
                None => reading_history.push(entry),
            }
        }

        Ok(User {
            id: helper.id,
            name: helper.name,
            email: helper.email,
            avatar: helper.avatar,
            bio: helper.bio,
            role: helper.role,
            is_anonymous: helper.is_anonymous,
            favorites,
            reading_history,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserHelper {
    id: String,
    name: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    avatar: String,
    #[serde(default)]
    bio: Option<String>,
    #[serde(default)]
    role: UserRole,
    #[serde(default)]
    is_anonymous: bool,
    #[serde(default)]
    favorites: Vec<String>,
    #[serde(default)]
    reading_history: Vec<ReadingProgress>,
}

impl User {
    /// A fresh anonymous identity with a new random id.
    pub fn guest() -> Self {
        let suffix: String = Uuid::new_v4().simple().to_string().chars().take(9).collect();
        Self {
            id: format!("guest_{}", suffix),
            name: GUEST_NAME.to_string(),
            email: None,
            avatar: GUEST_AVATAR.to_string(),
            bio: None,
            role: UserRole::Reader,
            is_anonymous: true,
            favorites: Vec::new(),
            reading_history: Vec::new(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn can_publish(&self) -> bool {
        matches!(self.role, UserRole::Admin | UserRole::Creator)
    }

    pub fn has_favorite(&self, content_id: &str) -> bool {
        self.favorites.iter().any(|id| id == content_id)
    }

    /// Returns whether `content_id` is a favorite after the toggle.
    pub fn toggle_favorite(&mut self, content_id: &str) -> bool {
        if self.has_favorite(content_id) {
            self.favorites.retain(|id| id != content_id);
            false
        } else {
            self.favorites.push(content_id.to_string());
            true
        }
    }

    pub fn progress_for(&self, content_id: &str) -> Option<&ReadingProgress> {
        self.reading_history
            .iter()
            .find(|h| h.content_id == content_id)
    }

    /// Replaces the entry for `content_id`, or appends one.
    pub fn upsert_progress(&mut self, content_id: &str, chapter_index: usize, at: DateTime<Utc>) {
        let progress = ReadingProgress {
            content_id: content_id.to_string(),
            chapter_index,
            updated_at: at,
        };
        match self
            .reading_history
            .iter_mut()
            .find(|h| h.content_id == content_id)
        {
            Some(existing) => *existing = progress,
            None => self.reading_history.push(progress),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    pub site_name: String,
    pub logo_url: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            site_name: "THE KONBINI".to_string(),
            logo_url: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    #[default]
    Serif,
    Sans,
}

/// How novel chapters are laid out on this device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaderSettings {
    pub font_size: u32,
    pub font_family: FontFamily,
    pub line_height: f32,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            font_size: 18,
            font_family: FontFamily::Serif,
            line_height: 1.8,
        }
    }
}

impl ReaderSettings {
    pub const FONT_SIZE_RANGE: std::ops::RangeInclusive<u32> = 12..=40;
    pub const LINE_HEIGHT_RANGE: std::ops::RangeInclusive<f32> = 1.0..=3.0;

    pub fn validate(&self) -> Result<()> {
        if !Self::FONT_SIZE_RANGE.contains(&self.font_size) {
            return Err(KonbiniError::Validation(format!(
                "font size {} is outside {:?}",
                self.font_size,
                Self::FONT_SIZE_RANGE
            )));
        }
        if !Self::LINE_HEIGHT_RANGE.contains(&self.line_height) {
            return Err(KonbiniError::Validation(format!(
                "line height {} is outside {:?}",
                self.line_height,
                Self::LINE_HEIGHT_RANGE
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn novel(title: &str) -> ContentItem {
        ContentItem::new(
            title,
            "Writer",
            ContentType::Novel,
            vec![Chapter::new(
                "c1",
                "Chapter 1",
                ChapterPayload::Text {
                    content: "Once".into(),
                },
            )],
        )
    }

    #[test]
    fn chapter_payload_keeps_flat_field_names() {
        let chapter = Chapter::new(
            "c1",
            "Pilot",
            ChapterPayload::Video {
                video_url: "https://cdn/pilot.mp4".into(),
            },
        );
        let json = serde_json::to_value(&chapter).unwrap();
        assert_eq!(json["videoUrl"], "https://cdn/pilot.mp4");
        assert!(json.get("content").is_none());
        assert!(json.get("createdAt").is_some());

        let back: Chapter = serde_json::from_value(json).unwrap();
        assert_eq!(back.payload.content_type(), ContentType::Video);
    }

    #[test]
    fn chapter_without_payload_does_not_parse() {
        let raw = r#"{"id":"c1","title":"Empty","createdAt":"2024-01-01T00:00:00Z"}"#;
        assert!(serde_json::from_str::<Chapter>(raw).is_err());
    }

    #[test]
    fn item_type_is_stored_as_lowercase_type_field() {
        let item = novel("Wind");
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "novel");
        assert!(json.get("status").is_none());
    }

    #[test]
    fn toggle_like_flips_membership() {
        let mut item = novel("Wind");
        assert!(item.toggle_like("u1"));
        assert_eq!(item.like_count(), 1);
        assert!(!item.toggle_like("u1"));
        assert_eq!(item.like_count(), 0);
    }

    #[test]
    fn toggle_like_removes_legacy_duplicates() {
        let mut item = novel("Wind");
        item.likes = vec!["u1".into(), "u2".into(), "u1".into()];
        assert!(!item.toggle_like("u1"));
        assert_eq!(item.likes, vec!["u2".to_string()]);
    }

    #[test]
    fn validate_rejects_mismatched_payload() {
        let mut item = novel("Wind");
        item.chapters.push(Chapter::new(
            "c2",
            "Pictures",
            ChapterPayload::Pages {
                pages: vec!["p.png".into()],
            },
        ));
        let err = item.validate().unwrap_err();
        assert!(matches!(err, KonbiniError::Validation(msg) if msg.contains("comic payload")));
    }

    #[test]
    fn validate_rejects_empty_chapters_and_pages() {
        let mut item = novel("Wind");
        item.chapters.clear();
        assert!(item.validate().is_err());

        let comic = ContentItem::new(
            "Pics",
            "Artist",
            ContentType::Comic,
            vec![Chapter::new("c1", "One", ChapterPayload::Pages { pages: vec![] })],
        );
        assert!(comic.validate().is_err());
    }

    #[test]
    fn validate_rejects_duplicate_chapter_ids_and_likes() {
        let mut item = novel("Wind");
        item.chapters.push(item.chapters[0].clone());
        assert!(item.validate().is_err());

        let mut item = novel("Wind");
        item.likes = vec!["u1".into(), "u1".into()];
        assert!(item.validate().is_err());
    }

    #[test]
    fn validate_accepts_well_formed_item() {
        assert!(novel("Wind").validate().is_ok());
    }

    #[test]
    fn comment_snapshots_author_profile() {
        let mut user = User::guest();
        user.name = "Lan".into();
        let comment = Comment::new("item-1", &user, "Hay quá").on_chapter("c1");
        user.name = "Renamed".into();

        assert_eq!(comment.user_name, "Lan");
        assert_eq!(comment.user_id, user.id);
        assert_eq!(comment.chapter_id.as_deref(), Some("c1"));
        assert!(!comment.is_deleted());
    }

    #[test]
    fn guest_is_anonymous_reader() {
        let guest = User::guest();
        assert!(guest.is_anonymous);
        assert!(guest.id.starts_with("guest_"));
        assert_eq!(guest.id.len(), "guest_".len() + 9);
        assert_eq!(guest.role, UserRole::Reader);
        assert_ne!(guest.id, User::guest().id);
    }

    #[test]
    fn upsert_progress_replaces_existing_entry() {
        let mut user = User::guest();
        user.upsert_progress("a", 1, Utc::now());
        user.upsert_progress("b", 0, Utc::now());
        user.upsert_progress("a", 4, Utc::now());

        assert_eq!(user.reading_history.len(), 2);
        assert_eq!(user.progress_for("a").unwrap().chapter_index, 4);
    }

    #[test]
    fn user_deserialization_collapses_duplicates() {
        let raw = r#"{
            "id": "u1", "name": "Lan", "avatar": "", "role": "reader", "isAnonymous": false,
            "favorites": ["a", "b", "a"],
            "readingHistory": [
                {"contentId": "a", "chapterIndex": 1, "updatedAt": "2024-01-01T00:00:00Z"},
                {"contentId": "a", "chapterIndex": 3, "updatedAt": "2024-01-02T00:00:00Z"}
            ]
        }"#;
        let user: User = serde_json::from_str(raw).unwrap();
        assert_eq!(user.favorites, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(user.reading_history.len(), 1);
        assert_eq!(user.reading_history[0].chapter_index, 3);
    }

    #[test]
    fn user_missing_collections_default_to_empty() {
        let raw = r#"{"id":"u1","name":"Lan","avatar":"","role":"creator","isAnonymous":false}"#;
        let user: User = serde_json::from_str(raw).unwrap();
        assert!(user.favorites.is_empty());
        assert!(user.reading_history.is_empty());
        assert!(user.can_publish());
        assert!(!user.is_admin());
    }

    #[test]
    fn theme_toggles() {
        assert_eq!(Theme::default(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }

    #[test]
    fn defaults_use_marked_variants() {
        assert_eq!(UserRole::default(), UserRole::Reader);
        assert_eq!(Theme::default(), Theme::Dark);
        assert_eq!(FontFamily::default(), FontFamily::Serif);
    }

    #[test]
    fn reader_settings_defaults_and_bounds() {
        let settings = ReaderSettings::default();
        assert_eq!(settings.font_size, 18);
        assert_eq!(settings.line_height, 1.8);
        assert!(settings.validate().is_ok());

        let tiny = ReaderSettings {
            font_size: 4,
            ..settings
        };
        assert!(matches!(tiny.validate(), Err(KonbiniError::Validation(_))));

        let unreadable = ReaderSettings {
            line_height: f32::NAN,
            ..settings
        };
        assert!(unreadable.validate().is_err());
    }

    #[test]
    fn reader_settings_read_stored_shape() {
        let settings: ReaderSettings =
            serde_json::from_str(r#"{"fontSize":20,"fontFamily":"sans","lineHeight":1.5}"#).unwrap();
        assert_eq!(settings.font_family, FontFamily::Sans);
        assert_eq!(settings.font_size, 20);
    }
}
