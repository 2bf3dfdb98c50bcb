use std::path::{Path, PathBuf};
use anyhow::{Result, bail};
use log::{debug, info};

use crate::utils::file_utils;

/// Moves classified files into per-tag directories under a root
#[derive(Debug)]
pub struct Sorter {
    root: PathBuf,
}

impl Sorter {
    /// Create a sorter whose tag directories live directly under `root`
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Destination of `file` for `tag`, keeping the file name
    pub fn destination(&self, file: &Path, tag: &str) -> Result<PathBuf> {
        if !file_utils::is_single_component(tag) {
            bail!("tag '{}' cannot be used as a directory name", tag);
        }
        let Some(file_name) = file.file_name() else {
            bail!("{} has no file name", file.display());
        };
        Ok(self.root.join(tag).join(file_name))
    }

    /// Move `file` into `root/<tag>/`.
    ///
    /// Returns the new path, or `None` if the file already sits there.
    /// The move is not undone if a later file fails.
    pub fn sort_file(&self, file: &Path, tag: &str) -> Result<Option<PathBuf>> {
        let destination = self.destination(file, tag)?;
        if destination == file {
            debug!("{} is already sorted", file.display());
            return Ok(None);
        }

        file_utils::ensure_dir_exists(self.root.join(tag))?;
        file_utils::move_file(file, &destination)?;
        info!("Moved {} -> {}", file.display(), destination.display());
        Ok(Some(destination))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn moves_into_tag_directory() -> Result<()> {
        let dir = tempdir()?;
        let nested = dir.path().join("incoming");
        fs::create_dir(&nested)?;
        let file = nested.join("style.safetensors");
        fs::write(&file, b"x")?;

        let moved = Sorter::new(dir.path()).sort_file(&file, "networks.lora")?;

        let expected = dir.path().join("networks.lora").join("style.safetensors");
        assert_eq!(moved, Some(expected.clone()));
        assert!(expected.is_file());
        assert!(!file.exists());
        Ok(())
    }

    #[test]
    fn already_sorted_file_stays() -> Result<()> {
        let dir = tempdir()?;
        let tag_dir = dir.path().join("LoRA");
        fs::create_dir(&tag_dir)?;
        let file = tag_dir.join("a.safetensors");
        fs::write(&file, b"x")?;

        assert_eq!(Sorter::new(dir.path()).sort_file(&file, "LoRA")?, None);
        assert!(file.is_file());
        Ok(())
    }

    #[test]
    fn refuses_path_like_tags() -> Result<()> {
        let dir = tempdir()?;
        let file = dir.path().join("a.safetensors");
        fs::write(&file, b"x")?;

        let sorter = Sorter::new(dir.path());
        assert!(sorter.sort_file(&file, "../escape").is_err());
        assert!(sorter.sort_file(&file, "").is_err());
        assert!(file.is_file());
        Ok(())
    }
}
