use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const DEFAULT_LOOKBACK_HOURS: i64 = 24;

/// The single persisted record. The file is always rewritten whole.
#[derive(Debug, Serialize, Deserialize)]
struct SyncState {
    last_run_timestamp: i64,
}

/// The local last-run marker, stored as one small JSON file in the home
/// directory. An absent file means "no stored boundary".
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A malformed or unreadable file is treated as absent, with a warning.
    pub fn load(&self) -> Option<i64> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("Could not load state file: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<SyncState>(&content) {
            Ok(state) => Some(state.last_run_timestamp),
            Err(e) => {
                tracing::warn!("Could not load state file: {}", e);
                None
            }
        }
    }

    pub fn save(&self, timestamp: i64) -> Result<()> {
        let state = SyncState {
            last_run_timestamp: timestamp,
        };
        fs::write(&self.path, serde_json::to_string(&state)?)?;
        Ok(())
    }

    /// Delete the file. Returns true when something was actually removed.
    pub fn reset(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Where the resolved since-boundary came from, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundarySource {
    HoursOverride(i64),
    LocalState,
    RemoteDatapoint,
    Default,
}

/// Resolve the "count items since" boundary for the since-last-run variant.
///
/// Precedence: explicit hours override, then the local state file, then the
/// newest remote datapoint, then a fixed 24-hour lookback. The remote lookup
/// is a closure so it only happens when the cheaper sources come up empty.
pub fn resolve_since(
    hours_override: Option<i64>,
    local: Option<i64>,
    remote: impl FnOnce() -> Option<i64>,
    now: i64,
) -> (i64, BoundarySource) {
    if let Some(hours) = hours_override {
        return (now - hours * 3600, BoundarySource::HoursOverride(hours));
    }
    if let Some(timestamp) = local {
        return (timestamp, BoundarySource::LocalState);
    }
    if let Some(timestamp) = remote() {
        return (timestamp, BoundarySource::RemoteDatapoint);
    }
    (
        now - DEFAULT_LOOKBACK_HOURS * 3600,
        BoundarySource::Default,
    )
}
