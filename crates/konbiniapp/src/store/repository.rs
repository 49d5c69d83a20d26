use super::backend::{StorageBackend, StoreKey};
use crate::error::{KonbiniError, Result};
use crate::model::{Comment, ContentItem, ReaderSettings, SiteSettings, Theme, User, UserRole};
use crate::seed;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Outcome of [`Repository::toggle_like`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeToggle {
    pub like_count: usize,
    pub is_liked: bool,
}

/// The single reader and writer of a device store.
///
/// Every mutation reads the whole collection from the backend, changes one
/// record and writes the whole collection back. Nothing is cached between
/// calls, so each operation starts from the latest persisted snapshot.
pub struct Repository<B: StorageBackend> {
    /// The underlying storage backend.
    /// Exposed as pub(crate) for testing and internal access only.
    pub(crate) backend: B,
    latency: Duration,
}

impl<B: StorageBackend> Repository<B> {
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            latency: Duration::ZERO,
        }
    }

    /// Adds an artificial delay to item reads and writes.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn simulate_network(&self) {
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }
    }

    /// `Ok(None)` only when the key is absent. A present value that fails to
    /// parse is `StorageCorrupt`.
    fn load<T: DeserializeOwned>(&self, key: StoreKey) -> Result<Option<T>> {
        let Some(raw) = self.backend.read(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| KonbiniError::StorageCorrupt {
                key,
                details: e.to_string(),
            })
    }

    fn save<T: Serialize + ?Sized>(&self, key: StoreKey, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value).map_err(|e| KonbiniError::StorageWriteFailed {
            key,
            reason: format!("serialization failed: {}", e),
        })?;
        self.backend.write(key, &raw).inspect_err(|e| {
            warn!(%key, error = %e, "store write failed");
        })
    }

    fn load_items(&self) -> Result<Vec<ContentItem>> {
        match self.load(StoreKey::Items)? {
            Some(items) => Ok(items),
            None => {
                let items = seed::initial_content();
                info!(count = items.len(), "seeding bootstrap items");
                self.save(StoreKey::Items, &items)?;
                Ok(items)
            }
        }
    }

    fn load_comments(&self) -> Result<Vec<Comment>> {
        Ok(self.load(StoreKey::Comments)?.unwrap_or_default())
    }

    // --- Items ---

    /// All items, newest first. Seeds and persists the bootstrap dataset the
    /// first time the store has no items key.
    pub fn get_all_items(&self) -> Result<Vec<ContentItem>> {
        self.simulate_network();
        let items = self.load_items()?;
        debug!(count = items.len(), "loaded items");
        Ok(items)
    }

    pub fn get_item_by_id(&self, id: &str) -> Result<Option<ContentItem>> {
        Ok(self.get_all_items()?.into_iter().find(|i| i.id == id))
    }

    /// Replaces the item with the same id in place, or prepends a new one.
    pub fn save_item(&self, item: &ContentItem) -> Result<()> {
        item.validate()?;
        self.simulate_network();

        let mut items = self.load_items()?;
        match items.iter().position(|i| i.id == item.id) {
            Some(idx) => items[idx] = item.clone(),
            None => items.insert(0, item.clone()),
        }
        self.save(StoreKey::Items, &items)?;
        info!(id = %item.id, title = %item.title, "saved item");
        Ok(())
    }

    /// Hard delete. Comments, likes, favorites and history entries pointing at
    /// the item are left in place. Returns whether an item was removed.
    pub fn delete_item(&self, id: &str) -> Result<bool> {
        self.simulate_network();

        let mut items = self.load_items()?;
        let before = items.len();
        items.retain(|i| i.id != id);
        if items.len() == before {
            debug!(id, "delete of unknown item ignored");
            return Ok(false);
        }
        self.save(StoreKey::Items, &items)?;
        info!(id, "deleted item");
        Ok(true)
    }

    /// Flips `user_id`'s like on the item.
    ///
    /// The collection is re-read right before mutating, which narrows but does
    /// not close the window in which another handle's write can be lost.
    pub fn toggle_like(&self, content_id: &str, user_id: &str) -> Result<LikeToggle> {
        let mut items = self.load_items()?;
        let Some(item) = items.iter_mut().find(|i| i.id == content_id) else {
            debug!(content_id, "like on unknown item ignored");
            return Ok(LikeToggle {
                like_count: 0,
                is_liked: false,
            });
        };

        let is_liked = item.toggle_like(user_id);
        let like_count = item.like_count();
        self.save(StoreKey::Items, &items)?;
        debug!(content_id, user_id, is_liked, like_count, "toggled like");
        Ok(LikeToggle {
            like_count,
            is_liked,
        })
    }

    /// Increments the view counter. Returns the new count, or `None` when the
    /// item does not exist.
    pub fn record_view(&self, content_id: &str) -> Result<Option<u64>> {
        let mut items = self.load_items()?;
        let Some(item) = items.iter_mut().find(|i| i.id == content_id) else {
            return Ok(None);
        };
        item.views = item.views.saturating_add(1);
        let views = item.views;
        self.save(StoreKey::Items, &items)?;
        Ok(Some(views))
    }

    // --- Comments ---

    /// Comments on one item, newest first. Equal timestamps keep insertion order.
    pub fn get_comments(&self, content_id: &str) -> Result<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .load_comments()?
            .into_iter()
            .filter(|c| c.content_id == content_id && !c.is_deleted())
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(comments)
    }

    pub fn add_comment(&self, comment: &Comment) -> Result<()> {
        if comment.text.trim().is_empty() {
            return Err(KonbiniError::Validation("comment text is empty".to_string()));
        }
        if comment.content_id.trim().is_empty() {
            return Err(KonbiniError::Validation(
                "comment is not attached to an item".to_string(),
            ));
        }
        let mut comments = self.load_comments()?;
        comments.push(comment.clone());
        self.save(StoreKey::Comments, &comments)?;
        info!(content_id = %comment.content_id, user_id = %comment.user_id, "added comment");
        Ok(())
    }

    // --- Site settings ---

    pub fn get_site_settings(&self) -> Result<SiteSettings> {
        Ok(self.load(StoreKey::Settings)?.unwrap_or_default())
    }

    pub fn update_site_settings(&self, settings: &SiteSettings) -> Result<()> {
        self.save(StoreKey::Settings, settings)?;
        info!(site_name = %settings.site_name, "updated site settings");
        Ok(())
    }

    // --- Users ---

    /// Registered accounts. Falls back to the built-in admin list, without
    /// persisting it, until the collection is first written.
    pub fn get_all_users(&self) -> Result<Vec<User>> {
        Ok(self
            .load(StoreKey::Users)?
            .unwrap_or_else(seed::initial_users))
    }

    /// Returns whether a user with `user_id` was found.
    pub fn update_user_role(&self, user_id: &str, role: UserRole) -> Result<bool> {
        let mut users = self.get_all_users()?;
        let Some(user) = users.iter_mut().find(|u| u.id == user_id) else {
            return Ok(false);
        };
        user.role = role;
        self.save(StoreKey::Users, &users)?;
        info!(user_id, ?role, "changed user role");
        Ok(true)
    }

    /// Inserts or replaces an account in the users collection.
    pub fn upsert_user(&self, user: &User) -> Result<()> {
        let mut users = self.get_all_users()?;
        match users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => *existing = user.clone(),
            None => users.push(user.clone()),
        }
        self.save(StoreKey::Users, &users)
    }

    // --- Per-user state ---

    /// Toggles `content_id` in the user's favorites and persists the profile.
    /// The caller adopts the returned user as its current identity.
    pub fn toggle_favorite(&self, user: &User, content_id: &str) -> Result<User> {
        let mut updated = user.clone();
        let now_favorite = updated.toggle_favorite(content_id);
        self.save_identity(&updated)?;
        debug!(user_id = %user.id, content_id, now_favorite, "toggled favorite");
        Ok(updated)
    }

    /// Records the chapter a user reached. Guests are never tracked: returns
    /// `None` and writes nothing.
    pub fn update_reading_progress(
        &self,
        user: &User,
        content_id: &str,
        chapter_index: usize,
    ) -> Result<Option<User>> {
        if user.is_anonymous {
            return Ok(None);
        }
        let mut updated = user.clone();
        updated.upsert_progress(content_id, chapter_index, Utc::now());
        self.save_identity(&updated)?;
        debug!(user_id = %user.id, content_id, chapter_index, "recorded progress");
        Ok(Some(updated))
    }

    /// Persists the device profile and, for identified users, their account row,
    /// so a later login with the same email finds the same library.
    ///
    /// The account row goes first: an unreadable users collection fails the call
    /// before anything is written.
    pub fn save_identity(&self, user: &User) -> Result<()> {
        if !user.is_anonymous {
            self.upsert_user(user)?;
        }
        self.save_profile(user)
    }

    // --- Device keys ---

    pub fn load_profile(&self) -> Result<Option<User>> {
        self.load(StoreKey::Profile)
    }

    pub fn save_profile(&self, user: &User) -> Result<()> {
        self.save(StoreKey::Profile, user)
    }

    pub fn load_theme(&self) -> Result<Theme> {
        Ok(self.load(StoreKey::Theme)?.unwrap_or_default())
    }

    pub fn save_theme(&self, theme: Theme) -> Result<()> {
        self.save(StoreKey::Theme, &theme)
    }

    /// Defaults when nothing was saved yet.
    pub fn load_reader_settings(&self) -> Result<ReaderSettings> {
        Ok(self.load(StoreKey::ReaderSettings)?.unwrap_or_default())
    }

    pub fn save_reader_settings(&self, settings: &ReaderSettings) -> Result<()> {
        self.save(StoreKey::ReaderSettings, settings)
    }
}
