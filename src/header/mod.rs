mod error;
mod reader;

pub use error::HeaderError;
pub use reader::{HeaderReader, parse_header};

/// Metadata sub-object of one file's header
pub type MetadataRecord = serde_json::Map<String, serde_json::Value>;

/// Reserved top-level header key holding the free-form metadata
pub const METADATA_KEY: &str = "__metadata__";

/// Upper bound on the declared header size, in bytes
pub const MAX_HEADER_LEN: u64 = 100_000_000;
