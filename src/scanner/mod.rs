mod file_collector;
mod progress;
mod sorter;
pub mod types;

use std::path::{Path, PathBuf};
use anyhow::{Result, bail};
use chrono::Utc;
use log::{debug, error, info, warn};
use serde_json::Value;

use crate::header::HeaderReader;
use crate::utils::file_utils;
use types::{FileOutcome, ModuleMapping, ScanOptions, ScanResult, ScanStats, SkipReason, MODULE_KEY};

pub use file_collector::FileCollector;
pub use progress::ProgressTracker;
pub use sorter::Sorter;

/// Scanner that classifies tensor files by their network module tag
#[derive(Debug)]
pub struct Scanner {
    /// Configuration options for scanning
    options: ScanOptions,

    /// File collector for finding candidate files
    file_collector: FileCollector,

    /// Header reader for extracting metadata
    reader: HeaderReader,

    /// Progress tracker for displaying progress
    progress_tracker: ProgressTracker,
}

impl Scanner {
    /// Create a new scanner with the given options
    pub fn new(options: ScanOptions) -> Self {
        Self {
            file_collector: FileCollector::new(options.extension.clone(), options.follow_links),
            reader: HeaderReader::new(),
            progress_tracker: ProgressTracker::new(options.show_progress),
            options,
        }
    }

    /// Create a scanner over `root` with default options
    pub fn with_defaults(root: impl Into<PathBuf>) -> Self {
        Self::new(ScanOptions::new(root))
    }

    /// Get the scan options
    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Classify a single file from its header, without moving it
    pub fn classify_file(&self, file: impl AsRef<Path>) -> FileOutcome {
        let file = file.as_ref();

        if !file_utils::is_readable(file) {
            return FileOutcome::Skipped(SkipReason::Unreadable);
        }

        let mut metadata = match self.reader.read_header(file) {
            Ok(metadata) => metadata,
            Err(e) => return FileOutcome::Skipped(SkipReason::MalformedHeader(e)),
        };

        match metadata.remove(MODULE_KEY) {
            Some(Value::String(tag)) => FileOutcome::Classified { tag, destination: None },
            Some(value) => FileOutcome::Skipped(SkipReason::NonStringTag { value }),
            None => FileOutcome::Skipped(SkipReason::MissingTag { metadata }),
        }
    }

    /// Walk the root, classify every candidate and sort it if requested.
    ///
    /// Per-file failures are logged and collected in the result; only an
    /// unusable root is an error. Files moved before an interruption stay moved.
    pub fn scan(&self) -> Result<ScanResult> {
        let root = file_utils::normalize_path(&self.options.root)?;
        if !root.is_dir() {
            bail!("{} is not a directory", root.display());
        }
        info!("Scanning directory: {}", root.display());

        // Collect up front so files moved into tag directories are not revisited
        let files = self.file_collector.collect_files(&root)?;
        info!("Found {} .{} files", files.len(), self.file_collector.extension());

        let sorter = self.options.sort.then(|| Sorter::new(&root));
        let mut mapping = ModuleMapping::new();
        let mut skipped = Vec::new();
        let mut stats = ScanStats {
            total_files: files.len(),
            ..ScanStats::default()
        };

        self.progress_tracker.track_path_progress(&files, |file| {
            let mut outcome = self.classify_file(file);

            if let FileOutcome::Classified { tag, destination } = &mut outcome {
                debug!("{} -> {}", file.display(), tag);
                mapping.insert(file.clone(), tag.clone());

                if let Some(sorter) = &sorter {
                    match sorter.sort_file(file, tag) {
                        Ok(moved_to) => *destination = moved_to,
                        Err(e) => {
                            error!("Failed to sort {}: {:#}", file.display(), e);
                            stats.move_failures += 1;
                        }
                    }
                }
            }

            stats.record(&outcome);
            if let FileOutcome::Skipped(reason) = outcome {
                log_skip(file, &reason);
                skipped.push((file.clone(), reason));
            }
        });

        info!(
            "Classified {} of {} files ({} skipped, {} moved)",
            stats.classified,
            stats.total_files,
            stats.skipped(),
            stats.moved
        );

        Ok(ScanResult {
            root,
            sorted: self.options.sort,
            scanned_at: Utc::now(),
            mapping,
            skipped,
            stats,
        })
    }
}

fn log_skip(file: &Path, reason: &SkipReason) {
    match reason {
        SkipReason::Unreadable => warn!("Cannot read file {}", file.display()),
        SkipReason::MalformedHeader(e) => error!("Error reading file {}: {}", file.display(), e),
        SkipReason::MissingTag { metadata } => {
            warn!("'{}' not found in metadata for file: {}", MODULE_KEY, file.display());
            warn!("Metadata content: {}", Value::Object(metadata.clone()));
        }
        SkipReason::NonStringTag { value } => {
            warn!("'{}' is not a string for file: {} ({})", MODULE_KEY, file.display(), value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use serde_json::json;
    use tempfile::tempdir;

    fn write_tensor_file(path: &Path, header: &Value) {
        let header = header.to_string();
        let mut bytes = (header.len() as u64).to_le_bytes().to_vec();
        bytes.extend_from_slice(header.as_bytes());
        bytes.extend_from_slice(&[0u8; 16]);
        fs::write(path, bytes).unwrap();
    }

    #[test]
    fn classifies_tagged_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.safetensors");
        write_tensor_file(&file, &json!({ "__metadata__": { "ss_network_module": "networks.lora" } }));

        match Scanner::with_defaults(dir.path()).classify_file(&file) {
            FileOutcome::Classified { tag, destination } => {
                assert_eq!(tag, "networks.lora");
                assert_eq!(destination, None);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn reports_missing_tag_with_metadata() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.safetensors");
        write_tensor_file(&file, &json!({ "__metadata__": { "ss_epoch": "3" } }));

        match Scanner::with_defaults(dir.path()).classify_file(&file) {
            FileOutcome::Skipped(SkipReason::MissingTag { metadata }) => {
                assert_eq!(metadata.get("ss_epoch"), Some(&json!("3")));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn numeric_tag_is_skipped() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.safetensors");
        write_tensor_file(&file, &json!({ "__metadata__": { "ss_network_module": 7 } }));

        assert!(matches!(
            Scanner::with_defaults(dir.path()).classify_file(&file),
            FileOutcome::Skipped(SkipReason::NonStringTag { .. })
        ));
    }

    #[test]
    fn file_removed_after_collection_is_unreadable() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("gone.safetensors");
        write_tensor_file(&file, &json!({ "__metadata__": { "ss_network_module": "LoRA" } }));
        fs::remove_file(&file).unwrap();

        assert!(matches!(
            Scanner::with_defaults(dir.path()).classify_file(&file),
            FileOutcome::Skipped(SkipReason::Unreadable)
        ));
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempdir().unwrap();
        let scanner = Scanner::with_defaults(dir.path().join("gone"));
        assert!(scanner.scan().is_err());
    }

    #[test]
    fn unsortable_tag_stays_mapped() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.safetensors");
        write_tensor_file(&file, &json!({ "__metadata__": { "ss_network_module": "../up" } }));

        let result = Scanner::new(ScanOptions::new(dir.path()).with_sort(true)).scan().unwrap();

        assert_eq!(result.mapping.get(&file).map(String::as_str), Some("../up"));
        assert_eq!(result.stats.move_failures, 1);
        assert_eq!(result.stats.moved, 0);
        assert!(file.is_file());
    }
}
