//! # External Services
//!
//! Integrations the core consumes but does not implement:
//!
//! - [`completion`]: a text-completion backend behind the [`TextCompletion`] trait,
//!   wrapped by [`CreativeAssistant`], which never surfaces a failure to its caller.
//! - [`media`]: turns uploaded image bytes into inline `data:` URLs.

pub mod completion;
pub mod media;

pub use completion::{CompletionRequest, CreativeAssistant, ServiceError, TextCompletion};
pub use media::{encode_upload, UploadError};
