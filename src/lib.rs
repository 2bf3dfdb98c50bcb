pub mod header;
pub mod report;
pub mod scanner;
pub mod utils;

use anyhow::Result;

// Re-export main types and functions for easier access
pub use header::{HeaderError, HeaderReader, MetadataRecord};
pub use scanner::Scanner;
pub use scanner::types::{
    FileOutcome, ModuleMapping, ScanOptions, ScanResult, ScanStats, SkipReason, MODULE_KEY, SAFETENSORS_EXT,
};

/// Scan `options.root` and return the mapping of classified files
pub fn extract_metadata(options: ScanOptions) -> Result<ModuleMapping> {
    Ok(Scanner::new(options).scan()?.mapping)
}
