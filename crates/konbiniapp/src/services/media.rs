//! Image uploads stored inline as `data:` URLs.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("upload is {size} bytes, the limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    #[error("'{0}' is not an image type")]
    UnsupportedType(String),

    #[error("upload is empty")]
    Empty,
}

/// Encodes image bytes as a `data:<mime>;base64,...` URL.
///
/// Anything larger than `max_bytes` is rejected.
pub fn encode_upload(bytes: &[u8], mime: &str, max_bytes: usize) -> Result<String, UploadError> {
    let mime = mime.trim().to_ascii_lowercase();
    if !mime.starts_with("image/") || mime.len() == "image/".len() {
        return Err(UploadError::UnsupportedType(mime));
    }
    if bytes.is_empty() {
        return Err(UploadError::Empty);
    }
    if bytes.len() > max_bytes {
        return Err(UploadError::TooLarge {
            size: bytes.len(),
            limit: max_bytes,
        });
    }
    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_MIB: usize = 2 * 1024 * 1024;

    #[test]
    fn encodes_as_data_url() {
        let url = encode_upload(b"hi", "image/png", TWO_MIB).unwrap();
        assert_eq!(url, "data:image/png;base64,aGk=");
    }

    #[test]
    fn limit_is_inclusive() {
        let exact = vec![0u8; 16];
        assert!(encode_upload(&exact, "image/jpeg", 16).is_ok());

        let over = vec![0u8; 17];
        assert_eq!(
            encode_upload(&over, "image/jpeg", 16),
            Err(UploadError::TooLarge { size: 17, limit: 16 })
        );
    }

    #[test]
    fn rejects_non_images_and_empty_files() {
        assert!(matches!(
            encode_upload(b"x", "text/plain", TWO_MIB),
            Err(UploadError::UnsupportedType(_))
        ));
        assert_eq!(encode_upload(b"", "image/png", TWO_MIB), Err(UploadError::Empty));
    }
}
