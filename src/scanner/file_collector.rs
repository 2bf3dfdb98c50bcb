use std::path::{Path, PathBuf};
use anyhow::Result;
use log::{debug, trace, warn};
use walkdir::WalkDir;

use crate::utils::file_utils;

/// File collector for finding tensor files
#[derive(Debug)]
pub struct FileCollector {
    /// File name suffix (without the dot) a candidate must end with
    extension: String,

    /// Descend into symlinked directories while walking
    follow_links: bool,
}

impl FileCollector {
    /// Create a new file collector for one extension
    pub fn new(extension: impl Into<String>, follow_links: bool) -> Self {
        Self {
            extension: extension.into(),
            follow_links,
        }
    }

    /// Collect all matching files under `input_dir`, in file-name order per directory
    pub fn collect_files(&self, input_dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let input_dir = input_dir.as_ref();
        debug!("Collecting files from directory: {}", input_dir.display());

        let mut files = Vec::new();

        for entry in WalkDir::new(input_dir)
            .follow_links(self.follow_links)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!("Skipping unreadable entry: {}", err);
                    None
                }
            })
            // Symlinked files are kept even when directory links are not followed
            .filter(|e| e.file_type().is_file() || (e.path_is_symlink() && e.path().is_file()))
        {
            if file_utils::has_extension(entry.path(), &self.extension) {
                trace!("Found file: {}", entry.path().display());
                files.push(entry.into_path());
            }
        }

        debug!("Collected {} files for processing", files.len());
        Ok(files)
    }

    /// Get the extension being collected
    pub fn extension(&self) -> &str {
        &self.extension
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn collects_nested_matches_only() -> Result<()> {
        let dir = tempdir()?;
        let nested = dir.path().join("loras").join("style");
        fs::create_dir_all(&nested)?;
        fs::write(dir.path().join("b.safetensors"), b"")?;
        fs::write(dir.path().join("a.safetensors"), b"")?;
        fs::write(dir.path().join("notes.txt"), b"")?;
        fs::write(dir.path().join("model.ckpt"), b"")?;
        fs::write(nested.join("c.safetensors"), b"")?;

        let files = FileCollector::new("safetensors", true).collect_files(dir.path())?;

        assert_eq!(
            files,
            vec![
                dir.path().join("a.safetensors"),
                dir.path().join("b.safetensors"),
                nested.join("c.safetensors"),
            ]
        );
        Ok(())
    }

    #[test]
    fn directories_named_like_files_are_ignored() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir(dir.path().join("odd.safetensors"))?;

        let files = FileCollector::new("safetensors", true).collect_files(dir.path())?;

        assert!(files.is_empty());
        Ok(())
    }
}
