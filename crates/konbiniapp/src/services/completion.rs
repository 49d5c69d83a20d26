//! Writing assistance backed by a text-completion service.
//!
//! [`TextCompletion`] is the seam to the remote model. [`CreativeAssistant`] builds
//! the requests and absorbs every failure: callers always get text (or tags) back,
//! and the failure is only visible in the logs.

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::KonbiniConfig;
use crate::model::ContentType;
use crate::studio::TagSuggester;

pub const EMPTY_RESPONSE_TEXT: &str = "Xin lỗi, tôi không thể tạo nội dung lúc này.";
pub const SERVICE_ERROR_TEXT: &str = "Đã xảy ra lỗi khi kết nối với AI. Vui lòng thử lại sau.";
pub const FALLBACK_TAGS: [&str; 2] = ["Mới", "Hot"];
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

const NOVEL_INSTRUCTION: &str = "Bạn là một trợ lý viết văn chuyên nghiệp, sáng tạo và giàu cảm xúc. Hãy giúp người dùng viết tiếp câu chuyện, tạo dàn ý hoặc mô tả chi tiết bằng tiếng Việt.";
const COMIC_INSTRUCTION: &str = "Bạn là một biên kịch truyện tranh tài ba. Hãy giúp tạo ra kịch bản phân cảnh (storyboard), mô tả nhân vật hoặc tóm tắt cốt truyện hấp dẫn bằng tiếng Việt.";
const VIDEO_INSTRUCTION: &str = "Bạn là một nhà sáng tạo nội dung video (YouTuber/TikToker) chuyên nghiệp. Hãy giúp viết kịch bản video, tiêu đề hấp dẫn (clickbait nhưng trung thực) và mô tả video chuẩn SEO bằng tiếng Việt.";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    #[error("completion service is not configured")]
    NotConfigured,

    #[error("completion request failed: {0}")]
    Request(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_instruction: Option<String>,
    pub prompt: String,
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system_instruction: None,
            prompt: prompt.into(),
            temperature: None,
        }
    }
}

pub trait TextCompletion {
    fn complete(&self, request: &CompletionRequest) -> Result<String, ServiceError>;
}

/// Stand-in used when no credential is configured. Every request fails with
/// [`ServiceError::NotConfigured`], so the assistant serves its fallbacks.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconfigured;

impl TextCompletion for Unconfigured {
    fn complete(&self, _request: &CompletionRequest) -> Result<String, ServiceError> {
        Err(ServiceError::NotConfigured)
    }
}

pub struct CreativeAssistant<C: TextCompletion> {
    client: C,
}

impl CreativeAssistant<Unconfigured> {
    pub fn unconfigured() -> Self {
        Self::new(Unconfigured)
    }
}

impl<C: TextCompletion> CreativeAssistant<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Uses `client` only when the configuration carries a completion credential.
    pub fn from_config(config: &KonbiniConfig, client: C) -> Option<Self> {
        config
            .has_completion_credentials()
            .then(|| Self::new(client))
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Creative text for a chapter. Novels get the current chapter text as context.
    pub fn generate(&self, prompt: &str, content_type: ContentType, prior_text: Option<&str>) -> String {
        let instruction = match content_type {
            ContentType::Novel => NOVEL_INSTRUCTION,
            ContentType::Comic => COMIC_INSTRUCTION,
            ContentType::Video => VIDEO_INSTRUCTION,
        };
        let prompt = match (content_type, prior_text) {
            (ContentType::Novel, Some(prior)) if !prior.trim().is_empty() => format!(
                "Dựa trên nội dung hiện tại:\n\"{}\"\n\nYêu cầu của người dùng: {}",
                prior, prompt
            ),
            _ => prompt.to_string(),
        };
        let request = CompletionRequest {
            system_instruction: Some(instruction.to_string()),
            prompt,
            temperature: Some(DEFAULT_TEMPERATURE),
        };

        match self.client.complete(&request) {
            Ok(text) if !text.trim().is_empty() => {
                debug!(%content_type, chars = text.len(), "completion generated");
                text
            }
            Ok(_) => {
                warn!(%content_type, "completion returned no text");
                EMPTY_RESPONSE_TEXT.to_string()
            }
            Err(e) => {
                warn!(%content_type, error = %e, "completion failed");
                SERVICE_ERROR_TEXT.to_string()
            }
        }
    }

    /// Up to five short tags for an item. Falls back to [`FALLBACK_TAGS`].
    pub fn suggest_tags(&self, title: &str, description: &str) -> Vec<String> {
        let request = CompletionRequest::new(format!(
            "Hãy tạo 5 thẻ (tags) ngắn gọn bằng tiếng Việt cho nội dung có tiêu đề \"{}\" và mô tả \"{}\". Trả về kết quả dưới dạng danh sách ngăn cách bởi dấu phẩy, không có số thứ tự. Ví dụ: Hành động, Tình cảm, Học đường",
            title, description
        ));

        let tags = match self.client.complete(&request) {
            Ok(text) => parse_tags(&text),
            Err(e) => {
                warn!(error = %e, "tag suggestion failed");
                Vec::new()
            }
        };
        if tags.is_empty() {
            return fallback_tags();
        }
        tags
    }
}

impl<C: TextCompletion> TagSuggester for CreativeAssistant<C> {
    fn suggest_tags(&self, title: &str, description: &str) -> Vec<String> {
        CreativeAssistant::suggest_tags(self, title, description)
    }
}

pub fn fallback_tags() -> Vec<String> {
    FALLBACK_TAGS.iter().map(|t| t.to_string()).collect()
}

fn parse_tags(text: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in text.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}
