use super::{DirEntry, FileSystem, FileType};
use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::SystemTime;

#[derive(Debug, Clone)]
pub struct MockEntry {
    pub file_type: FileType,
    pub modified: Option<SystemTime>,
    /// Set for symlinks; listing reports the target's type and mtime
    pub link_target: Option<PathBuf>,
}

/// In-memory file system whose contents can change between listings
pub struct MockFileSystem {
    files: RwLock<HashMap<PathBuf, MockEntry>>,
    unreadable: RwLock<HashSet<PathBuf>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            unreadable: RwLock::new(HashSet::new()),
        }
    }

    pub fn add_file(&self, path: impl AsRef<Path>, modified: Option<SystemTime>) {
        self.insert(
            path.as_ref(),
            MockEntry {
                file_type: FileType::File,
                modified,
                link_target: None,
            },
        );
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        let mut files = self.files.write().unwrap();
        Self::ensure_parents(&mut files, &path);
        files.insert(
            path,
            MockEntry {
                file_type: FileType::Directory,
                modified: None,
                link_target: None,
            },
        );
    }

    pub fn add_symlink(&self, link: impl AsRef<Path>, target: impl AsRef<Path>) {
        self.insert(
            link.as_ref(),
            MockEntry {
                file_type: FileType::Symlink,
                modified: None,
                link_target: Some(target.as_ref().to_path_buf()),
            },
        );
    }

    /// Updates the modification time of an existing file
    pub fn touch(&self, path: impl AsRef<Path>, modified: SystemTime) {
        if let Some(entry) = self.files.write().unwrap().get_mut(path.as_ref()) {
            entry.modified = Some(modified);
        }
    }

    /// Makes read_dir fail for the given directory
    pub fn make_unreadable(&self, path: impl AsRef<Path>) {
        self.unreadable
            .write()
            .unwrap()
            .insert(path.as_ref().to_path_buf());
    }

    fn insert(&self, path: &Path, entry: MockEntry) {
        let mut files = self.files.write().unwrap();
        if let Some(parent) = path.parent() {
            Self::ensure_parents(&mut files, parent);
        }
        files.insert(path.to_path_buf(), entry);
    }

    fn ensure_parents(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            files.entry(current.clone()).or_insert(MockEntry {
                file_type: FileType::Directory,
                modified: None,
                link_target: None,
            });
        }
    }

    fn resolve<'a>(
        files: &'a HashMap<PathBuf, MockEntry>,
        path: &Path,
    ) -> Option<(PathBuf, &'a MockEntry)> {
        let mut current = path.to_path_buf();
        // Bounded to guard against link cycles
        for _ in 0..16 {
            let entry = files.get(&current)?;
            match &entry.link_target {
                Some(target) => current = target.clone(),
                None => return Some((current, entry)),
            }
        }
        None
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFileSystem {
    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        if self.unreadable.read().unwrap().contains(path) {
            return Err(anyhow!("Permission denied: {:?}", path));
        }

        let files = self.files.read().unwrap();
        match files.get(path) {
            Some(entry) if entry.file_type == FileType::Directory => {}
            _ => return Err(anyhow!("Directory not found: {:?}", path)),
        }

        let mut entries: Vec<DirEntry> = files
            .keys()
            .filter(|file_path| file_path.parent() == Some(path))
            .map(|file_path| {
                let (file_type, modified) = match Self::resolve(&files, file_path) {
                    Some((_, target)) => (target.file_type, target.modified),
                    None => (FileType::Symlink, None),
                };
                DirEntry {
                    path: file_path.clone(),
                    name: file_path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or("")
                        .to_string(),
                    file_type,
                    modified,
                }
            })
            .collect();

        // HashMap order is arbitrary; listing order should be stable across calls
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        let files = self.files.read().unwrap();
        Self::resolve(&files, path)
            .map(|(resolved, _)| resolved)
            .ok_or_else(|| anyhow!("Path not found: {:?}", path))
    }
}
