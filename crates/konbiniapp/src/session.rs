//! # Session / Identity
//!
//! Who is using this device right now. A session is either a **Guest**
//! (anonymous, id regenerated whenever no profile is persisted) or
//! **Identified** (after a simulated login).
//!
//! ## Lifecycle
//!
//! ```text
//!            login(email)
//!   Guest ─────────────────► Identified
//!     ▲                          │
//!     └──────── logout() ────────┘
//! ```
//!
//! - **Login** replaces the identity. Favorites and reading history gathered
//!   as a guest are merged into the new identity; switching accounts while
//!   identified carries nothing over. No credential is checked.
//! - **Logout** discards the identified profile and persists a fresh guest.
//!
//! Every mutation is written to the device store first; the in-memory state
//! only advances once the write succeeded, so a reload always observes the
//! latest state and a failed write never leaves the session ahead of the store.
//!
//! Theme and reader settings are device preferences. They survive login and logout.

use tracing::info;
use uuid::Uuid;

use crate::config::KonbiniConfig;
use crate::error::Result;
use crate::model::{ReaderSettings, Theme, User, UserRole};
use crate::store::{Repository, StorageBackend};

pub const OWNER_NAME: &str = "Chủ Trạm";
pub const READER_NAME: &str = "Độc giả Konbini";

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Guest(User),
    Identified(User),
}

impl SessionState {
    fn from_user(user: User) -> Self {
        if user.is_anonymous {
            SessionState::Guest(user)
        } else {
            SessionState::Identified(user)
        }
    }
}

/// Editable profile fields. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProfileEdit {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
    theme: Theme,
    reader_settings: ReaderSettings,
}

impl Session {
    /// Restores the persisted identity and preferences, or starts (and persists) a fresh guest.
    pub fn restore<B: StorageBackend>(repo: &Repository<B>) -> Result<Self> {
        let theme = repo.load_theme()?;
        let reader_settings = repo.load_reader_settings()?;
        let user = match repo.load_profile()? {
            Some(user) => user,
            None => {
                let guest = User::guest();
                repo.save_profile(&guest)?;
                guest
            }
        };
        Ok(Self {
            state: SessionState::from_user(user),
            theme,
            reader_settings,
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn user(&self) -> &User {
        match &self.state {
            SessionState::Guest(user) | SessionState::Identified(user) => user,
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self.state, SessionState::Guest(_))
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn reader_settings(&self) -> ReaderSettings {
        self.reader_settings
    }

    fn adopt(&mut self, user: User) {
        self.state = SessionState::from_user(user);
    }

    /// Simulated login. The configured owner email becomes admin; known accounts
    /// keep the role and id stored for them; everyone else starts as a reader.
    ///
    /// Only a guest library is merged into the account.
    pub fn login<B: StorageBackend>(
        &mut self,
        repo: &Repository<B>,
        config: &KonbiniConfig,
        email: &str,
    ) -> Result<&User> {
        let email = email.trim();
        let is_owner = config.is_owner_email(email);
        let known = repo
            .get_all_users()?
            .into_iter()
            .find(|u| {
                u.email
                    .as_deref()
                    .is_some_and(|e| e.eq_ignore_ascii_case(email))
            });

        let mut user = known.unwrap_or_else(|| new_account(email, is_owner));
        if is_owner {
            user.role = UserRole::Admin;
        }

        if let SessionState::Guest(guest) = &self.state {
            merge_guest_library(&mut user, guest);
        }

        repo.save_identity(&user)?;
        info!(user_id = %user.id, role = ?user.role, "logged in");
        self.adopt(user);
        Ok(self.user())
    }

    /// Drops the identified profile and starts a fresh guest.
    pub fn logout<B: StorageBackend>(&mut self, repo: &Repository<B>) -> Result<&User> {
        let guest = User::guest();
        repo.save_profile(&guest)?;
        info!(user_id = %self.user().id, "logged out");
        self.adopt(guest);
        Ok(self.user())
    }

    pub fn update_profile<B: StorageBackend>(
        &mut self,
        repo: &Repository<B>,
        edit: ProfileEdit,
    ) -> Result<&User> {
        let mut user = self.user().clone();
        if let Some(name) = edit.name {
            user.name = name;
        }
        if let Some(bio) = edit.bio {
            user.bio = if bio.trim().is_empty() { None } else { Some(bio) };
        }
        if let Some(avatar) = edit.avatar {
            user.avatar = avatar;
        }

        repo.save_identity(&user)?;
        self.adopt(user);
        Ok(self.user())
    }

    /// Returns whether the item is a favorite afterwards.
    pub fn toggle_favorite<B: StorageBackend>(
        &mut self,
        repo: &Repository<B>,
        content_id: &str,
    ) -> Result<bool> {
        let updated = repo.toggle_favorite(self.user(), content_id)?;
        let is_favorite = updated.has_favorite(content_id);
        self.adopt(updated);
        Ok(is_favorite)
    }

    /// Returns `false` for guests, whose progress is never recorded.
    pub fn record_progress<B: StorageBackend>(
        &mut self,
        repo: &Repository<B>,
        content_id: &str,
        chapter_index: usize,
    ) -> Result<bool> {
        match repo.update_reading_progress(self.user(), content_id, chapter_index)? {
            Some(updated) => {
                self.adopt(updated);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Mirrors a role change already written to the users collection.
    pub(crate) fn apply_role<B: StorageBackend>(
        &mut self,
        repo: &Repository<B>,
        role: UserRole,
    ) -> Result<()> {
        let mut user = self.user().clone();
        user.role = role;
        repo.save_profile(&user)?;
        self.adopt(user);
        Ok(())
    }

    pub fn set_theme<B: StorageBackend>(&mut self, repo: &Repository<B>, theme: Theme) -> Result<Theme> {
        repo.save_theme(theme)?;
        self.theme = theme;
        Ok(theme)
    }

    pub fn toggle_theme<B: StorageBackend>(&mut self, repo: &Repository<B>) -> Result<Theme> {
        self.set_theme(repo, self.theme.toggled())
    }

    pub fn set_reader_settings<B: StorageBackend>(
        &mut self,
        repo: &Repository<B>,
        settings: ReaderSettings,
    ) -> Result<ReaderSettings> {
        settings.validate()?;
        repo.save_reader_settings(&settings)?;
        self.reader_settings = settings;
        Ok(settings)
    }
}

/// Adds the guest's favorites, and any reading progress newer than the
/// account's own, to `user`.
fn merge_guest_library(user: &mut User, guest: &User) {
    for id in &guest.favorites {
        if !user.has_favorite(id) {
            user.favorites.push(id.clone());
        }
    }
    for progress in &guest.reading_history {
        let newer = user
            .progress_for(&progress.content_id)
            .map_or(true, |p| p.updated_at < progress.updated_at);
        if newer {
            user.upsert_progress(
                &progress.content_id,
                progress.chapter_index,
                progress.updated_at,
            );
        }
    }
}

fn new_account(email: &str, is_owner: bool) -> User {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(9).collect();
    let (name, avatar, role) = if is_owner {
        (
            OWNER_NAME.to_string(),
            "https://api.dicebear.com/7.x/bottts/svg?seed=Admin".to_string(),
            UserRole::Admin,
        )
    } else {
        (
            READER_NAME.to_string(),
            format!("https://api.dicebear.com/7.x/avataaars/svg?seed={}", email),
            UserRole::Reader,
        )
    };
    User {
        id: format!("google_{}", suffix),
        name,
        email: Some(email.to_string()),
        avatar,
        bio: None,
        role,
        is_anonymous: false,
        favorites: Vec::new(),
        reading_history: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryRepository;
    use crate::store::StoreKey;
    use chrono::{Duration, Utc};

    #[test]
    fn restore_starts_and_persists_guest() {
        let repo = InMemoryRepository::new();
        let session = Session::restore(&repo).unwrap();
        assert!(session.is_guest());
        assert_eq!(repo.load_profile().unwrap().unwrap(), *session.user());

        // A reload observes the same guest
        let again = Session::restore(&repo).unwrap();
        assert_eq!(again.user().id, session.user().id);
    }

    #[test]
    fn corrupt_profile_is_reported() {
        let repo = InMemoryRepository::new();
        repo.backend().set_raw(StoreKey::Profile, "not json");
        assert!(Session::restore(&repo).unwrap_err().is_corrupt());
    }

    #[test]
    fn owner_login_becomes_admin() {
        let repo = InMemoryRepository::new();
        let config = KonbiniConfig::default();
        let mut session = Session::restore(&repo).unwrap();

        let user = session.login(&repo, &config, " CouleurYou@gmail.com ").unwrap();
        assert_eq!(user.role, UserRole::Admin);
        assert!(!user.is_anonymous);
        assert!(!session.is_guest());
    }

    #[test]
    fn login_merges_guest_library() {
        let repo = InMemoryRepository::new();
        let config = KonbiniConfig::default();
        let mut session = Session::restore(&repo).unwrap();
        session.toggle_favorite(&repo, "1").unwrap();

        let user = session.login(&repo, &config, "reader@example.com").unwrap().clone();
        assert_eq!(user.role, UserRole::Reader);
        assert!(user.has_favorite("1"));
        assert_eq!(repo.load_profile().unwrap().unwrap(), user);
    }

    #[test]
    fn switching_accounts_carries_nothing_over() {
        let repo = InMemoryRepository::new();
        let config = KonbiniConfig::default();
        let mut session = Session::restore(&repo).unwrap();
        session.login(&repo, &config, "alice@example.com").unwrap();
        session.toggle_favorite(&repo, "1").unwrap();
        session.record_progress(&repo, "1", 3).unwrap();

        let bob = session.login(&repo, &config, "bob@example.com").unwrap().clone();
        assert!(bob.favorites.is_empty());
        assert!(bob.reading_history.is_empty());

        let users = repo.get_all_users().unwrap();
        let stored_bob = users.iter().find(|u| u.id == bob.id).unwrap();
        assert!(stored_bob.favorites.is_empty());
        let alice = users
            .iter()
            .find(|u| u.email.as_deref() == Some("alice@example.com"))
            .unwrap();
        assert!(alice.has_favorite("1"));
    }

    #[test]
    fn corrupt_users_leave_profile_and_session_untouched() {
        let repo = InMemoryRepository::new();
        let config = KonbiniConfig::default();
        let mut session = Session::restore(&repo).unwrap();
        session.login(&repo, &config, "lan@example.com").unwrap();
        let before = session.user().clone();
        repo.backend().set_raw(StoreKey::Users, "not json");

        assert!(session.toggle_favorite(&repo, "1").unwrap_err().is_corrupt());
        assert!(session.record_progress(&repo, "1", 2).unwrap_err().is_corrupt());
        let edit = ProfileEdit {
            name: Some("Lan".into()),
            ..Default::default()
        };
        assert!(session.update_profile(&repo, edit).unwrap_err().is_corrupt());

        assert_eq!(*session.user(), before);
        assert_eq!(repo.load_profile().unwrap().unwrap(), before);
    }

    #[test]
    fn login_reuses_known_account() {
        let repo = InMemoryRepository::new();
        let config = KonbiniConfig::default();
        let mut session = Session::restore(&repo).unwrap();

        let first_id = session
            .login(&repo, &config, "writer@example.com")
            .unwrap()
            .id
            .clone();
        repo.update_user_role(&first_id, UserRole::Creator).unwrap();
        session.logout(&repo).unwrap();

        let user = session.login(&repo, &config, "WRITER@example.com").unwrap();
        assert_eq!(user.id, first_id);
        assert_eq!(user.role, UserRole::Creator);
    }

    #[test]
    fn login_keeps_newer_progress() {
        let repo = InMemoryRepository::new();
        let config = KonbiniConfig::default();
        let mut session = Session::restore(&repo).unwrap();
        session.login(&repo, &config, "a@example.com").unwrap();
        session.record_progress(&repo, "1", 4).unwrap();
        session.logout(&repo).unwrap();

        // Guest progress is not tracked, so an older guest entry can only
        // come from a stale profile. Simulate one directly.
        let mut guest = session.user().clone();
        guest.upsert_progress("1", 1, Utc::now() - Duration::days(1));
        repo.save_profile(&guest).unwrap();
        let mut session = Session::restore(&repo).unwrap();

        let user = session.login(&repo, &config, "a@example.com").unwrap();
        assert_eq!(user.progress_for("1").unwrap().chapter_index, 4);
    }

    #[test]
    fn logout_persists_fresh_guest() {
        let repo = InMemoryRepository::new();
        let config = KonbiniConfig::default();
        let mut session = Session::restore(&repo).unwrap();
        let guest_id = session.user().id.clone();
        session.login(&repo, &config, "x@example.com").unwrap();

        let guest = session.logout(&repo).unwrap().clone();
        assert!(guest.is_anonymous);
        assert_ne!(guest.id, guest_id);
        assert!(guest.favorites.is_empty());
        assert_eq!(repo.load_profile().unwrap().unwrap(), guest);
    }

    #[test]
    fn guest_progress_is_ignored() {
        let repo = InMemoryRepository::new();
        let mut session = Session::restore(&repo).unwrap();
        assert!(!session.record_progress(&repo, "1", 2).unwrap());
        assert!(session.user().reading_history.is_empty());
    }

    #[test]
    fn failed_write_does_not_advance_session() {
        let repo = InMemoryRepository::new();
        let mut session = Session::restore(&repo).unwrap();
        repo.backend().set_simulate_write_error(true);

        assert!(session.toggle_favorite(&repo, "1").is_err());
        assert!(session.user().favorites.is_empty());
        assert!(session.toggle_theme(&repo).is_err());
        assert_eq!(session.theme(), Theme::Dark);
    }

    #[test]
    fn profile_edit_syncs_users_collection() {
        let repo = InMemoryRepository::new();
        let config = KonbiniConfig::default();
        let mut session = Session::restore(&repo).unwrap();
        session.login(&repo, &config, "lan@example.com").unwrap();

        session
            .update_profile(
                &repo,
                ProfileEdit {
                    name: Some("Lan".into()),
                    bio: Some("  ".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(session.user().name, "Lan");
        assert!(session.user().bio.is_none());
        let users = repo.get_all_users().unwrap();
        assert!(users.iter().any(|u| u.name == "Lan"));
    }

    #[test]
    fn reader_settings_persist_across_logout() {
        let repo = InMemoryRepository::new();
        let config = KonbiniConfig::default();
        let mut session = Session::restore(&repo).unwrap();
        assert_eq!(session.reader_settings(), ReaderSettings::default());

        session.login(&repo, &config, "lan@example.com").unwrap();
        let larger = ReaderSettings {
            font_size: 24,
            ..ReaderSettings::default()
        };
        session.set_reader_settings(&repo, larger).unwrap();
        session.logout(&repo).unwrap();

        assert_eq!(session.reader_settings(), larger);
        assert_eq!(Session::restore(&repo).unwrap().reader_settings(), larger);
    }

    #[test]
    fn invalid_reader_settings_are_not_saved() {
        let repo = InMemoryRepository::new();
        let mut session = Session::restore(&repo).unwrap();
        let broken = ReaderSettings {
            line_height: 0.0,
            ..ReaderSettings::default()
        };
        assert!(session.set_reader_settings(&repo, broken).is_err());
        assert_eq!(session.reader_settings(), ReaderSettings::default());
        assert!(repo.backend().raw(StoreKey::ReaderSettings).is_none());
    }

    #[test]
    fn theme_toggle_persists() {
        let repo = InMemoryRepository::new();
        let mut session = Session::restore(&repo).unwrap();
        assert_eq!(session.toggle_theme(&repo).unwrap(), Theme::Light);
        assert_eq!(Session::restore(&repo).unwrap().theme(), Theme::Light);
    }
}
