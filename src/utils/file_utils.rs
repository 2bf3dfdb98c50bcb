use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use anyhow::{Result, Context};
use log::{debug, trace, warn};

/// Create a directory if it doesn't exist
pub fn ensure_dir_exists(dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        debug!("Creating directory: {}", dir.display());
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }
    Ok(())
}

/// Check if a file name ends with `.{extension}`.
///
/// The match is case-sensitive: `model.SAFETENSORS` is not a candidate.
/// Names that are not valid UTF-8 are compared byte-wise.
pub fn has_extension(path: impl AsRef<Path>, extension: &str) -> bool {
    let Some(name) = path.as_ref().file_name() else {
        return false;
    };
    name.as_encoded_bytes()
        .strip_suffix(extension.as_bytes())
        .is_some_and(|stem| stem.ends_with(b"."))
}

/// Make `path` absolute and drop `.` and `..` components without touching symlinks
pub fn normalize_path(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let absolute = std::path::absolute(path)
        .with_context(|| format!("Failed to resolve {}", path.display()))?;

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    Ok(normalized)
}

/// Check whether the current process can open the file for reading
pub fn is_readable(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    match File::open(path) {
        Ok(_) => true,
        Err(e) => {
            trace!("Open check failed for {}: {}", path.display(), e);
            false
        }
    }
}

/// Check that `name` is usable as a single directory name directly under a root
pub fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(c)), None) if c == name
    )
}

/// Move a file, falling back to copy and delete across filesystems
pub fn move_file(from: impl AsRef<Path>, to: impl AsRef<Path>) -> Result<()> {
    let (from, to) = (from.as_ref(), to.as_ref());
    debug!("Moving {} -> {}", from.display(), to.display());

    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            warn!("{} is on another filesystem, copying instead", to.display());
            fs::copy(from, to)
                .with_context(|| format!("Failed to copy {} to {}", from.display(), to.display()))?;
            fs::remove_file(from)
                .with_context(|| format!("Failed to remove {} after copy", from.display()))
        }
        Err(e) => Err(e)
            .with_context(|| format!("Failed to move {} to {}", from.display(), to.display())),
    }
}
