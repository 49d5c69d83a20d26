//! # API Facade
//!
//! The API layer is a **thin facade** over the repository, the session and the derived
//! views. It is the single entry point for every screen of the platform, regardless of
//! the UI being used.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Checks permissions** against the session's current user
//! - **Dispatches** to the repository, [`Session`], [`studio`] or [`views`]
//! - **Returns owned data**: view results are cloned out of the loaded snapshot
//!
//! ## Permissions
//!
//! | Operation | Allowed for |
//! |-----------|-------------|
//! | read items, comments, settings | everyone |
//! | like, comment | everyone, guests included |
//! | theme, reader settings | everyone (device preferences) |
//! | favorite, reading progress | identified users (favorites fail with `LoginRequired`) |
//! | publish, edit, upload images | creators and admins |
//! | delete, site settings, user list, role changes | admins |
//!
//! Denials are [`KonbiniError::PermissionDenied`].
//!
//! ## Generic Over StorageBackend
//!
//! `KonbiniApi<B: StorageBackend>` works the same on top of:
//! - Production: `KonbiniApi<FsBackend>`
//! - Testing: `KonbiniApi<MemBackend>`
//!
//! ## Testing Strategy
//!
//! API tests check permission gates and that each call reaches the right layer.
//! Storage behavior is tested in the store modules; ranking and joins in `views`.

use tracing::{debug, info};

use crate::config::KonbiniConfig;
use crate::error::{KonbiniError, Result};
use crate::model::{
    Comment, ContentItem, ReaderSettings, ReadingProgress, SiteSettings, Theme, User, UserRole,
};
use crate::services::{encode_upload, CreativeAssistant, TextCompletion};
use crate::session::{ProfileEdit, Session};
use crate::store::{LikeToggle, Repository, StorageBackend};
use crate::studio::{self, Draft, TagSuggester};
use crate::views::{self, library::LibraryStats, search::SearchFilter};

/// Home screen sections, owned.
#[derive(Debug, Clone, PartialEq)]
pub struct HomeFeed {
    pub spotlight: Option<ContentItem>,
    pub novels: Vec<ContentItem>,
    pub comics: Vec<ContentItem>,
    pub videos: Vec<ContentItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthorPage {
    pub name: String,
    pub works: Vec<ContentItem>,
    pub total_views: u64,
    pub total_likes: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryItem {
    pub item: ContentItem,
    pub progress: ReadingProgress,
    /// `None` when the recorded chapter no longer exists.
    pub chapter_title: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LibraryPage {
    pub favorites: Vec<ContentItem>,
    pub history: Vec<HistoryItem>,
    pub my_works: Vec<ContentItem>,
    pub stats: LibraryStats,
}

fn owned(items: Vec<&ContentItem>) -> Vec<ContentItem> {
    items.into_iter().cloned().collect()
}

/// The main API facade for Konbini operations.
pub struct KonbiniApi<B: StorageBackend> {
    repo: Repository<B>,
    session: Session,
    config: KonbiniConfig,
}

impl<B: StorageBackend> KonbiniApi<B> {
    /// Restores the device session from `repo`.
    pub fn new(repo: Repository<B>, config: KonbiniConfig) -> Result<Self> {
        let session = Session::restore(&repo)?;
        debug!(user_id = %session.user().id, guest = session.is_guest(), "session restored");
        Ok(Self {
            repo,
            session,
            config,
        })
    }

    pub fn repository(&self) -> &Repository<B> {
        &self.repo
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &KonbiniConfig {
        &self.config
    }

    pub fn current_user(&self) -> &User {
        self.session.user()
    }

    fn require_publisher(&self, action: &str) -> Result<()> {
        if self.current_user().can_publish() {
            return Ok(());
        }
        Err(KonbiniError::PermissionDenied(format!(
            "only creators and admins can {}",
            action
        )))
    }

    fn require_admin(&self, action: &str) -> Result<()> {
        if self.current_user().is_admin() {
            return Ok(());
        }
        Err(KonbiniError::PermissionDenied(format!(
            "only admins can {}",
            action
        )))
    }

    // --- Items ---

    pub fn items(&self) -> Result<Vec<ContentItem>> {
        self.repo.get_all_items()
    }

    pub fn item(&self, id: &str) -> Result<Option<ContentItem>> {
        self.repo.get_item_by_id(id)
    }

    /// Opens an item for reading and counts the view.
    pub fn open_item(&self, id: &str) -> Result<Option<ContentItem>> {
        if self.repo.record_view(id)?.is_none() {
            return Ok(None);
        }
        self.repo.get_item_by_id(id)
    }

    /// Publishes a new item or saves an edit of an existing one.
    ///
    /// An edit whose item was deleted in the meantime fails with `NotFound`.
    pub fn publish(&self, draft: Draft, suggester: &impl TagSuggester) -> Result<ContentItem> {
        self.require_publisher("publish")?;
        let existing = match draft.id.as_deref() {
            Some(id) => Some(
                self.repo
                    .get_item_by_id(id)?
                    .ok_or_else(|| KonbiniError::NotFound(format!("item '{}'", id)))?,
            ),
            None => None,
        };
        let item = studio::publish(draft, existing.as_ref(), suggester)?;
        self.repo.save_item(&item)?;
        Ok(item)
    }

    /// Fills a chapter with assistant output. Returns `false` when the draft has
    /// nothing to prompt with.
    pub fn assist_chapter<C: TextCompletion>(
        &self,
        draft: &mut Draft,
        chapter_idx: usize,
        assistant: &CreativeAssistant<C>,
    ) -> Result<bool> {
        self.require_publisher("use the writing assistant")?;
        let Some(prompt) = draft.assist_prompt(chapter_idx) else {
            return Ok(false);
        };
        let prior = draft.chapters[chapter_idx].body.clone();
        let text = assistant.generate(&prompt, draft.content_type, Some(&prior));
        draft.append_to_chapter(chapter_idx, &text)?;
        Ok(true)
    }

    /// Encodes an uploaded cover or logo image as a data URL.
    pub fn upload_image(&self, bytes: &[u8], mime: &str) -> Result<String> {
        self.require_publisher("upload images")?;
        Ok(encode_upload(bytes, mime, self.config.max_upload_bytes)?)
    }

    pub fn delete_item(&self, id: &str) -> Result<bool> {
        self.require_admin("delete items")?;
        self.repo.delete_item(id)
    }

    pub fn toggle_like(&self, content_id: &str) -> Result<LikeToggle> {
        self.repo.toggle_like(content_id, &self.current_user().id)
    }

    pub fn toggle_favorite(&mut self, content_id: &str) -> Result<bool> {
        if self.session.is_guest() {
            return Err(KonbiniError::LoginRequired);
        }
        self.session.toggle_favorite(&self.repo, content_id)
    }

    /// Returns `false` for guests, whose progress is not recorded.
    pub fn record_progress(&mut self, content_id: &str, chapter_index: usize) -> Result<bool> {
        self.session
            .record_progress(&self.repo, content_id, chapter_index)
    }

    // --- Comments ---

    pub fn comments(&self, content_id: &str) -> Result<Vec<Comment>> {
        self.repo.get_comments(content_id)
    }

    /// Posts a comment as the current user, snapshotting their name and avatar.
    pub fn add_comment(
        &self,
        content_id: &str,
        chapter_id: Option<&str>,
        text: &str,
    ) -> Result<Comment> {
        let mut comment = Comment::new(content_id, self.current_user(), text.trim());
        if let Some(chapter_id) = chapter_id {
            comment = comment.on_chapter(chapter_id);
        }
        self.repo.add_comment(&comment)?;
        Ok(comment)
    }

    // --- Admin ---

    pub fn site_settings(&self) -> Result<SiteSettings> {
        self.repo.get_site_settings()
    }

    pub fn update_site_settings(&self, settings: &SiteSettings) -> Result<()> {
        self.require_admin("change site settings")?;
        if settings.site_name.trim().is_empty() {
            return Err(KonbiniError::Validation("site name is empty".to_string()));
        }
        self.repo.update_site_settings(settings)
    }

    pub fn users(&self) -> Result<Vec<User>> {
        self.require_admin("list users")?;
        self.repo.get_all_users()
    }

    /// Returns `false` when no user has that id.
    pub fn set_user_role(&mut self, user_id: &str, role: UserRole) -> Result<bool> {
        self.require_admin("change roles")?;
        let changed = self.repo.update_user_role(user_id, role)?;
        if changed && self.current_user().id == user_id {
            self.session.apply_role(&self.repo, role)?;
        }
        Ok(changed)
    }

    // --- Session ---

    pub fn login(&mut self, email: &str) -> Result<&User> {
        if email.trim().is_empty() {
            return Err(KonbiniError::Validation("email is empty".to_string()));
        }
        self.session.login(&self.repo, &self.config, email)
    }

    pub fn logout(&mut self) -> Result<&User> {
        self.session.logout(&self.repo)
    }

    pub fn update_profile(&mut self, edit: ProfileEdit) -> Result<&User> {
        if edit.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(KonbiniError::Validation("display name is empty".to_string()));
        }
        self.session.update_profile(&self.repo, edit)
    }

    pub fn toggle_theme(&mut self) -> Result<Theme> {
        let theme = self.session.toggle_theme(&self.repo)?;
        info!(?theme, "theme changed");
        Ok(theme)
    }

    pub fn reader_settings(&self) -> ReaderSettings {
        self.session.reader_settings()
    }

    pub fn update_reader_settings(&mut self, settings: ReaderSettings) -> Result<ReaderSettings> {
        let settings = self.session.set_reader_settings(&self.repo, settings)?;
        debug!(font_size = settings.font_size, "reader settings changed");
        Ok(settings)
    }

    // --- Views ---

    pub fn home(&self) -> Result<HomeFeed> {
        let items = self.repo.get_all_items()?;
        let sections = views::ranking::home_sections(&items, self.config.hot_list_size);
        Ok(HomeFeed {
            spotlight: sections.spotlight.cloned(),
            novels: owned(sections.novels),
            comics: owned(sections.comics),
            videos: owned(sections.videos),
        })
    }

    pub fn search(&self, filter: &SearchFilter) -> Result<Vec<ContentItem>> {
        let items = self.repo.get_all_items()?;
        Ok(owned(views::search::filter(&items, filter)))
    }

    /// Every tag in use, for the search filter.
    pub fn tags(&self) -> Result<Vec<String>> {
        Ok(views::search::all_tags(&self.repo.get_all_items()?))
    }

    pub fn author(&self, name: &str) -> Result<AuthorPage> {
        let items = self.repo.get_all_items()?;
        let profile = views::author::profile(&items, name);
        Ok(AuthorPage {
            name: profile.name,
            works: owned(profile.works),
            total_views: profile.total_views,
            total_likes: profile.total_likes,
        })
    }

    /// The current user's favorites, reading history and own works.
    pub fn library(&self) -> Result<LibraryPage> {
        let items = self.repo.get_all_items()?;
        let user = self.current_user();
        let history = views::library::history(&items, user)
            .into_iter()
            .map(|entry| HistoryItem {
                chapter_title: entry.chapter().map(|c| c.title.clone()),
                item: entry.item.clone(),
                progress: entry.progress.clone(),
            })
            .collect();
        Ok(LibraryPage {
            favorites: owned(views::library::favorites(&items, user)),
            history,
            my_works: owned(views::library::my_works(&items, user)),
            stats: views::library::stats(&items, user),
        })
    }
}
