use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::header::{HeaderError, MetadataRecord};

/// File extension of the tensor files being classified
pub const SAFETENSORS_EXT: &str = "safetensors";

/// Metadata key holding the classification tag
pub const MODULE_KEY: &str = "ss_network_module";

/// Absolute file path (where the file was found) to classification tag
pub type ModuleMapping = BTreeMap<PathBuf, String>;

/// Configuration options for a scan
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Directory to scan recursively; also the parent of the tag directories
    pub root: PathBuf,

    /// Move each classified file into `root/<tag>/`
    pub sort: bool,

    /// Extension a file name must end with to be considered
    pub extension: String,

    /// Descend into symlinked directories while walking.
    ///
    /// Symlinks to files are candidates either way; with `sort` the link
    /// itself is moved.
    pub follow_links: bool,

    /// Show a progress bar for larger scans
    pub show_progress: bool,
}

impl ScanOptions {
    /// Options for scanning `root` without sorting.
    ///
    /// There is no `Default`: the root is always supplied by the caller.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            sort: false,
            extension: SAFETENSORS_EXT.to_string(),
            follow_links: false,
            show_progress: true,
        }
    }

    /// Enable or disable sorting into tag directories
    pub fn with_sort(mut self, sort: bool) -> Self {
        self.sort = sort;
        self
    }
}

/// Why a candidate file was left out of the mapping
#[derive(Debug)]
pub enum SkipReason {
    /// The process cannot open the file for reading
    Unreadable,

    /// The header could not be parsed
    MalformedHeader(HeaderError),

    /// The metadata has no classification tag
    MissingTag { metadata: MetadataRecord },

    /// The classification tag is present but not a string
    NonStringTag { value: Value },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreadable => write!(f, "cannot read file"),
            Self::MalformedHeader(e) => write!(f, "malformed header: {}", e),
            Self::MissingTag { metadata } => {
                write!(f, "'{}' not found in metadata: {}", MODULE_KEY, Value::Object(metadata.clone()))
            }
            Self::NonStringTag { value } => write!(f, "'{}' is not a string: {}", MODULE_KEY, value),
        }
    }
}

impl Serialize for SkipReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Result of classifying a single file
#[derive(Debug)]
pub enum FileOutcome {
    /// The file carries a tag; `destination` is set when it was moved
    Classified {
        tag: String,
        destination: Option<PathBuf>,
    },

    /// The file was skipped and is not part of the mapping
    Skipped(SkipReason),
}

/// Statistics about the scanning process
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// Number of candidate files found
    pub total_files: usize,

    /// Number of files added to the mapping
    pub classified: usize,

    /// Number of files that could not be opened
    pub unreadable: usize,

    /// Number of files with an unparseable header
    pub malformed: usize,

    /// Number of files without a usable tag
    pub missing_tag: usize,

    /// Number of files moved into a tag directory
    pub moved: usize,

    /// Number of classified files whose move failed or was refused
    pub move_failures: usize,
}

impl ScanStats {
    /// Number of candidate files left out of the mapping
    pub fn skipped(&self) -> usize {
        self.unreadable + self.malformed + self.missing_tag
    }

    /// Count one outcome
    pub fn record(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Classified { destination, .. } => {
                self.classified += 1;
                if destination.is_some() {
                    self.moved += 1;
                }
            }
            FileOutcome::Skipped(SkipReason::Unreadable) => self.unreadable += 1,
            FileOutcome::Skipped(SkipReason::MalformedHeader(_)) => self.malformed += 1,
            FileOutcome::Skipped(SkipReason::MissingTag { .. } | SkipReason::NonStringTag { .. }) => {
                self.missing_tag += 1
            }
        }
    }
}

/// Result of a scan
#[derive(Debug, Serialize)]
pub struct ScanResult {
    /// Root the scan ran over, made absolute
    pub root: PathBuf,

    /// Whether files were sorted into tag directories
    pub sorted: bool,

    /// When the scan finished
    pub scanned_at: DateTime<Utc>,

    /// Classified files
    pub mapping: ModuleMapping,

    /// Skipped files and why
    pub skipped: Vec<(PathBuf, SkipReason)>,

    /// Counters for the scan
    pub stats: ScanStats,
}
