use super::clock::Clock;
use super::locator::BuildLogDirectories;
use crate::fs::FileSystem;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use thiserror::Error;
use tracing::{debug, info, warn};

pub const ACTIVITY_LOG_EXTENSION: &str = "xcactivitylog";

/// A log whose modification time is closer to "now" than this is taken as-is
const MAXIMUM_CURRENT_LOG_AGE: Duration = Duration::from_secs(2);
const POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("No build log found after waiting {timeout_secs}s (searched {searched:?})")]
    NoLogFound {
        timeout_secs: u64,
        searched: Vec<PathBuf>,
    },
}

/// A candidate build log and its modification time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFileEntry {
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
}

#[derive(Clone)]
pub struct LogDiscovery {
    fs: Arc<dyn FileSystem>,
    clock: Arc<dyn Clock>,
}

impl LogDiscovery {
    pub fn new(fs: Arc<dyn FileSystem>, clock: Arc<dyn Clock>) -> Self {
        Self { fs, clock }
    }

    /// Returns the newest build log for `build_dir`, waiting up to
    /// `timeout_secs` one-second ticks for Xcode to write a newer one.
    pub fn locate_latest_log(
        &self,
        build_dir: &Path,
        timeout_secs: u64,
    ) -> Result<PathBuf, DiscoveryError> {
        let directories = BuildLogDirectories::for_build_dir(build_dir);

        let baseline = self.sorted_logs(&directories).into_iter().next();
        let baseline_modified = baseline.as_ref().and_then(|entry| entry.modified);

        if let (Some(entry), Some(modified)) = (&baseline, baseline_modified) {
            if self.is_current(modified) {
                debug!(path = %entry.path.display(), "Most recent log is current");
                return Ok(entry.path.clone());
            }
        }

        debug!(
            baseline = ?baseline.as_ref().map(|entry| &entry.path),
            timeout_secs,
            "Waiting for a newer build log"
        );

        let mut ticks = 0;
        while ticks < timeout_secs {
            self.clock.sleep(POLL_INTERVAL);
            ticks += 1;

            if let Some(path) = self.newer_log(&directories, baseline_modified) {
                info!(path = %path.display(), ticks, "Latest log found");
                return Ok(path);
            }
            debug!(tick = ticks, "No newer log yet");
        }

        warn!(timeout_secs, "Timed out waiting for a build log");
        Err(DiscoveryError::NoLogFound {
            timeout_secs,
            searched: directories.iter().map(Path::to_path_buf).collect(),
        })
    }

    /// All candidate logs in both directories, newest first.
    ///
    /// Entries without a modification time sort last; ties keep listing order.
    pub fn sorted_logs(&self, directories: &BuildLogDirectories) -> Vec<LogFileEntry> {
        let mut logs: Vec<LogFileEntry> = directories
            .iter()
            .flat_map(|dir| self.logs_in_directory(dir))
            .collect();
        // None orders before any Some, so untimestamped entries land last
        logs.sort_by(|lhs, rhs| rhs.modified.cmp(&lhs.modified));
        logs
    }

    fn newer_log(
        &self,
        directories: &BuildLogDirectories,
        after: Option<SystemTime>,
    ) -> Option<PathBuf> {
        let newest = self.sorted_logs(directories).into_iter().next()?;
        match after {
            // No log existed before polling started, so any log is the first one
            None => Some(newest.path),
            Some(after) => match newest.modified {
                Some(modified) if modified > after => Some(newest.path),
                _ => None,
            },
        }
    }

    fn logs_in_directory(&self, dir: &Path) -> Vec<LogFileEntry> {
        let entries = match self.fs.read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir = %dir.display(), error = %e, "Skipping log directory");
                return Vec::new();
            }
        };

        entries
            .into_iter()
            .filter(|entry| {
                entry.is_file()
                    && !entry.is_hidden()
                    && entry.extension() == Some(ACTIVITY_LOG_EXTENSION)
            })
            .map(|entry| LogFileEntry {
                path: self
                    .fs
                    .canonicalize(&entry.path)
                    .unwrap_or_else(|_| entry.path.clone()),
                modified: entry.modified,
            })
            .collect()
    }

    fn is_current(&self, modified: SystemTime) -> bool {
        match self.clock.now().duration_since(modified) {
            Ok(age) => age < MAXIMUM_CURRENT_LOG_AGE,
            // Modified in the future relative to our clock
            Err(_) => true,
        }
    }
}
