use super::mem_backend::MemBackend;
use super::repository::Repository;

pub type InMemoryRepository = Repository<MemBackend>;

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Repository::with_backend(MemBackend::new())
    }

    /// A second handle on the same device store, like another open tab.
    pub fn another_tab(&self) -> Self {
        Repository::with_backend(self.backend.clone())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::model::{Chapter, ChapterPayload, ContentItem, ContentType, User, UserRole};
    use crate::store::StoreKey;

    /// Builds a repository whose items collection holds exactly the given items.
    pub struct RepoFixture {
        pub repo: InMemoryRepository,
        items: Vec<ContentItem>,
    }

    impl Default for RepoFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl RepoFixture {
        pub fn new() -> Self {
            Self {
                repo: InMemoryRepository::new(),
                items: Vec::new(),
            }
        }

        pub fn with_item(mut self, item: ContentItem) -> Self {
            self.items.push(item);
            self
        }

        pub fn with_novel(self, title: &str, author: &str, views: u64) -> Self {
            let mut item = sample_item(title, author, ContentType::Novel);
            item.views = views;
            self.with_item(item)
        }

        pub fn with_comic(self, title: &str, author: &str, views: u64) -> Self {
            let mut item = sample_item(title, author, ContentType::Comic);
            item.views = views;
            self.with_item(item)
        }

        /// Writes the collected items (in the given order) and returns the repository.
        pub fn build(self) -> InMemoryRepository {
            let raw = serde_json::to_string(&self.items).expect("fixture items serialize");
            self.repo.backend.set_raw(StoreKey::Items, &raw);
            self.repo
        }
    }

    pub fn sample_item(title: &str, author: &str, content_type: ContentType) -> ContentItem {
        let payload = match content_type {
            ContentType::Novel => ChapterPayload::Text {
                content: format!("<p>{} begins</p>", title),
            },
            ContentType::Comic => ChapterPayload::Pages {
                pages: vec![format!("https://img/{}/1.png", title)],
            },
            ContentType::Video => ChapterPayload::Video {
                video_url: format!("https://cdn/{}.mp4", title),
            },
        };
        ContentItem::new(title, author, content_type, vec![Chapter::new("c1", "Chapter 1", payload)])
    }

    pub fn signed_in(id: &str, name: &str, role: UserRole) -> User {
        let mut user = User::guest();
        user.id = id.to_string();
        user.name = name.to_string();
        user.role = role;
        user.is_anonymous = false;
        user
    }
}
