use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};
use log::warn;

/// Scans at or below this many files run without a bar
const MIN_FILES_FOR_BAR: usize = 10;

/// Progress tracker for displaying progress during scanning
#[derive(Debug, Default)]
pub struct ProgressTracker {
    enabled: bool,
}

impl ProgressTracker {
    /// Create a new progress tracker
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Run `operation` over each path in order, showing a bar for larger scans
    pub fn track_path_progress<F>(&self, paths: &[PathBuf], mut operation: F)
    where
        F: FnMut(&PathBuf),
    {
        let progress_bar = self.bar_for(paths.len());

        for (index, path) in paths.iter().enumerate() {
            if let Some(pb) = &progress_bar {
                pb.set_position(index as u64);
                if let Some(file_name) = path.file_name() {
                    pb.set_message(format!("Processing: {}", file_name.to_string_lossy()));
                }
            }

            operation(path);
        }

        if let Some(pb) = progress_bar {
            pb.finish_with_message("Processing complete");
        }
    }

    fn bar_for(&self, len: usize) -> Option<ProgressBar> {
        if !self.enabled || len <= MIN_FILES_FOR_BAR {
            return None;
        }

        let pb = ProgressBar::new(len as u64);
        match ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")
        {
            Ok(style) => pb.set_style(style.progress_chars("#>-")),
            Err(e) => warn!("Invalid progress template: {}", e),
        }
        Some(pb)
    }
}
