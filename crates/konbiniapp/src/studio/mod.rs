//! # Studio
//!
//! The editable form of an item. A [`Draft`] is what a creator works on; [`publish`]
//! turns it into a stored [`ContentItem`].
//!
//! ## Publishing
//!
//! | Draft field | Published as |
//! |-------------|--------------|
//! | `id: None` | fresh UUID |
//! | `id: Some(..)` with an existing record | same id; `views`, `likes`, `created_at` carried over |
//! | empty `tags` | whatever the [`TagSuggester`] returns |
//! | blank `author` | [`STUDIO_AUTHOR`] |
//! | blank `cover_url` | a placeholder image seeded by the item id |
//! | novel chapter `body` | HTML rendered with `pulldown-cmark`, single newlines kept as `<br />` |
//!
//! Comic chapters must carry pages and video chapters a URL. Missing media is a
//! validation error; nothing is filled in silently.

use chrono::Utc;
use uuid::Uuid;

use crate::error::{KonbiniError, Result};
use crate::model::{Chapter, ChapterPayload, ContentItem, ContentType};
use crate::seed::STUDIO_AUTHOR;

mod markup;

pub use markup::{html_to_markdown, render_novel};

pub const FIRST_CHAPTER_TITLE: &str = "Chương 1: Khởi đầu";
pub const IDEA_PROMPT: &str = "Gợi ý ý tưởng tiếp theo";

/// Supplies tags when a creator publishes without any. Must not fail.
pub trait TagSuggester {
    fn suggest_tags(&self, title: &str, description: &str) -> Vec<String>;
}

/// A fixed tag list, handy when no completion service is configured.
pub struct FixedTags(pub Vec<String>);

impl TagSuggester for FixedTags {
    fn suggest_tags(&self, _title: &str, _description: &str) -> Vec<String> {
        self.0.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChapterDraft {
    pub id: String,
    pub title: String,
    /// Markdown source. Only used by novels.
    pub body: String,
    pub pages: Vec<String>,
    pub video_url: Option<String>,
}

impl ChapterDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            title: title.into(),
            ..Default::default()
        }
    }

    fn from_chapter(chapter: &Chapter) -> Result<Self> {
        let mut draft = Self {
            id: chapter.id.clone(),
            title: chapter.title.clone(),
            ..Default::default()
        };
        match &chapter.payload {
            ChapterPayload::Text { content } => draft.body = html_to_markdown(content)?,
            ChapterPayload::Pages { pages } => draft.pages = pages.clone(),
            ChapterPayload::Video { video_url } => draft.video_url = Some(video_url.clone()),
        }
        Ok(draft)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub content_type: ContentType,
    pub cover_url: Option<String>,
    pub author: String,
    pub tags: Vec<String>,
    pub status: Option<String>,
    pub chapters: Vec<ChapterDraft>,
}

impl Draft {
    /// An empty draft with a single opening chapter.
    pub fn new(content_type: ContentType) -> Self {
        Self {
            id: None,
            title: String::new(),
            description: String::new(),
            content_type,
            cover_url: None,
            author: STUDIO_AUTHOR.to_string(),
            tags: Vec::new(),
            status: None,
            chapters: vec![ChapterDraft::new(FIRST_CHAPTER_TITLE)],
        }
    }

    /// Loads a stored item back into the editor. Novel HTML is turned back into
    /// markdown, so publishing the draft unchanged reproduces the stored chapters.
    pub fn from_item(item: &ContentItem) -> Result<Self> {
        let chapters = item
            .chapters
            .iter()
            .map(ChapterDraft::from_chapter)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            id: Some(item.id.clone()),
            title: item.title.clone(),
            description: item.description.clone(),
            content_type: item.content_type,
            cover_url: (!item.cover_url.is_empty()).then(|| item.cover_url.clone()),
            author: item.author.clone(),
            tags: item.tags.clone(),
            status: item.status.clone(),
            chapters,
        })
    }

    /// Appends a chapter titled by its position and returns its index.
    pub fn add_chapter(&mut self) -> usize {
        let idx = self.chapters.len();
        self.chapters
            .push(ChapterDraft::new(format!("Chương {}", idx + 1)));
        idx
    }

    /// Removes a chapter. An item always keeps at least one.
    pub fn remove_chapter(&mut self, idx: usize) -> Result<ChapterDraft> {
        if self.chapters.len() <= 1 {
            return Err(KonbiniError::Validation(
                "an item needs at least one chapter".to_string(),
            ));
        }
        self.check_index(idx)?;
        Ok(self.chapters.remove(idx))
    }

    pub fn move_chapter(&mut self, from: usize, to: usize) -> Result<()> {
        self.check_index(from)?;
        self.check_index(to)?;
        let chapter = self.chapters.remove(from);
        self.chapters.insert(to, chapter);
        Ok(())
    }

    fn check_index(&self, idx: usize) -> Result<()> {
        if idx >= self.chapters.len() {
            return Err(KonbiniError::Validation(format!(
                "chapter {} does not exist (draft has {})",
                idx + 1,
                self.chapters.len()
            )));
        }
        Ok(())
    }

    /// The continue-writing request for the writing assistant, or `None` when the
    /// draft has neither a title nor a description to work from.
    pub fn assist_prompt(&self, chapter_idx: usize) -> Option<String> {
        if self.title.trim().is_empty() && self.description.trim().is_empty() {
            return None;
        }
        let chapter = self.chapters.get(chapter_idx)?;
        if self.title.trim().is_empty() {
            return Some(IDEA_PROMPT.to_string());
        }
        Some(format!(
            "Viết tiếp nội dung chương \"{}\" cho truyện \"{}\"",
            chapter.title, self.title
        ))
    }

    /// Appends assistant output to a chapter body, separated by a blank line.
    pub fn append_to_chapter(&mut self, chapter_idx: usize, text: &str) -> Result<()> {
        self.check_index(chapter_idx)?;
        let body = &mut self.chapters[chapter_idx].body;
        if !body.is_empty() {
            body.push_str("\n\n");
        }
        body.push_str(text);
        Ok(())
    }
}

/// Builds the item to store from a draft.
///
/// `existing` is the stored record being edited, if any. Its id must match the draft's.
pub fn publish(
    draft: Draft,
    existing: Option<&ContentItem>,
    suggester: &impl TagSuggester,
) -> Result<ContentItem> {
    if let (Some(existing), Some(id)) = (existing, draft.id.as_deref()) {
        if existing.id != id {
            return Err(KonbiniError::Validation(format!(
                "draft '{}' cannot overwrite item '{}'",
                id, existing.id
            )));
        }
    }

    let id = draft
        .id
        .clone()
        .or_else(|| existing.map(|e| e.id.clone()))
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let tags = if draft.tags.is_empty() {
        let description = if draft.description.trim().is_empty() {
            &draft.title
        } else {
            &draft.description
        };
        suggester.suggest_tags(&draft.title, description)
    } else {
        draft.tags
    };

    let author = match draft.author.trim() {
        "" => STUDIO_AUTHOR.to_string(),
        name => name.to_string(),
    };

    let cover_url = draft
        .cover_url
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| format!("https://picsum.photos/seed/{}/600/800", id));

    let mut chapters = Vec::with_capacity(draft.chapters.len());
    for (idx, chapter) in draft.chapters.into_iter().enumerate() {
        let created_at = existing
            .and_then(|e| e.chapters.iter().find(|c| c.id == chapter.id))
            .map_or_else(Utc::now, |c| c.created_at);
        let payload = chapter_payload(draft.content_type, idx, &chapter)?;
        chapters.push(Chapter {
            id: chapter.id,
            title: chapter.title,
            payload,
            created_at,
        });
    }

    let item = ContentItem {
        id,
        title: draft.title,
        description: draft.description,
        content_type: draft.content_type,
        cover_url,
        author,
        views: existing.map_or(0, |e| e.views),
        likes: existing.map(|e| e.likes.clone()).unwrap_or_default(),
        created_at: existing.map_or_else(Utc::now, |e| e.created_at),
        tags,
        chapters,
        status: draft.status,
    };
    item.validate()?;
    Ok(item)
}

fn chapter_payload(
    content_type: ContentType,
    idx: usize,
    chapter: &ChapterDraft,
) -> Result<ChapterPayload> {
    match content_type {
        ContentType::Novel => Ok(ChapterPayload::Text {
            content: render_novel(&chapter.body),
        }),
        ContentType::Comic => {
            let pages: Vec<String> = chapter
                .pages
                .iter()
                .filter(|p| !p.trim().is_empty())
                .cloned()
                .collect();
            if pages.is_empty() {
                return Err(KonbiniError::Validation(format!(
                    "chapter {} '{}' has no pages",
                    idx + 1,
                    chapter.title
                )));
            }
            Ok(ChapterPayload::Pages { pages })
        }
        ContentType::Video => match chapter.video_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(ChapterPayload::Video {
                video_url: url.to_string(),
            }),
            _ => Err(KonbiniError::Validation(format!(
                "chapter {} '{}' has no video url",
                idx + 1,
                chapter.title
            ))),
        },
    }
}
