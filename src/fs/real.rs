use super::{DirEntry, FileSystem, FileType};
use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RealFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for RealFileSystem {
    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let entries = fs::read_dir(path).context(format!("Failed to read directory {:?}", path))?;

        let mut result = Vec::new();
        for entry in readable_entries(path, entries) {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();

            // fs::metadata follows symlinks; a dangling link has no target metadata
            let (file_type, modified) = match fs::metadata(&path) {
                Ok(meta) if meta.is_file() => (FileType::File, meta.modified().ok()),
                Ok(meta) if meta.is_dir() => (FileType::Directory, meta.modified().ok()),
                Ok(meta) => (FileType::Symlink, meta.modified().ok()),
                Err(_) => (FileType::Symlink, None),
            };

            result.push(DirEntry {
                path,
                name,
                file_type,
                modified,
            });
        }

        Ok(result)
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        path.canonicalize()
            .context(format!("Failed to canonicalize path {:?}", path))
    }
}

/// Drops entries that fail to read so the rest of the listing survives
fn readable_entries<'a, T: 'a>(
    dir: &'a Path,
    entries: impl Iterator<Item = io::Result<T>> + 'a,
) -> impl Iterator<Item = T> + 'a {
    entries.filter_map(move |entry| match entry {
        Ok(entry) => Some(entry),
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "Skipping unreadable directory entry");
            None
        }
    })
}
