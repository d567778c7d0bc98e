use std::path::{Path, PathBuf};

/// The two directories Xcode may write build logs to for a given `BUILD_DIR`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildLogDirectories {
    /// Log directory for a regular build
    pub build: PathBuf,
    /// Log directory when archiving
    pub archive: PathBuf,
}

impl BuildLogDirectories {
    /// Derives both candidate log directories from a build-output directory.
    ///
    /// For a regular build `BUILD_DIR` looks like
    /// `~/Library/Developer/Xcode/DerivedData/App-abc/Build/Products`, whose logs
    /// live in `~/Library/Developer/Xcode/DerivedData/App-abc/Logs/Build`.
    ///
    /// When archiving it looks like
    /// `<repo>/build/DerivedData/Build/Intermediates.noindex/ArchiveIntermediates/App/BuildProductsPath`,
    /// whose logs live in `<repo>/build/DerivedData/Logs/Build`.
    pub fn for_build_dir(build_dir: impl AsRef<Path>) -> Self {
        let build_dir = build_dir.as_ref();
        Self {
            build: logs_dir(ascend(build_dir, 2)),
            archive: logs_dir(ascend(build_dir, 5)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        [self.build.as_path(), self.archive.as_path()].into_iter()
    }
}

fn ascend(path: &Path, levels: usize) -> &Path {
    let mut current = path;
    for _ in 0..levels {
        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }
    current
}

fn logs_dir(base: &Path) -> PathBuf {
    base.join("Logs").join("Build")
}
