//! Build log discovery
//!
//! Finds the most recent `.xcactivitylog` written for a build-output directory.
//! Xcode flushes the log asynchronously after a build finishes, so discovery
//! either returns a log that landed within the last couple of seconds or polls
//! once per second until a newer log appears or the timeout is exhausted.

pub mod clock;
pub mod engine;
pub mod locator;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{DiscoveryError, LogDiscovery, LogFileEntry, ACTIVITY_LOG_EXTENSION};
pub use locator::BuildLogDirectories;
