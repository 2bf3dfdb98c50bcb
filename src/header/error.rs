use thiserror::Error;

/// Reasons a safetensors header could not be read
#[derive(Debug, Error)]
pub enum HeaderError {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("file is shorter than the 8-byte header size prefix")]
    ShortPrefix,

    #[error("header size is 0")]
    ZeroLength,

    #[error("header size {declared} exceeds the {available} bytes remaining in the file")]
    Truncated { declared: u64, available: u64 },

    #[error("header size {0} exceeds the {max} byte limit", max = super::MAX_HEADER_LEN)]
    TooLarge(u64),

    #[error("header is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("header JSON is not an object")]
    NotAnObject,
}
