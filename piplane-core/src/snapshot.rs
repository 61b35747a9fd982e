//! Snapshot source: reads the aircraft.json file written by dump1090-fa.
//!
//! The receiver process rewrites the file on its own schedule; every read
//! here is a full, independent snapshot. Read failures are reported, never
//! panicked on, so the poll loop can skip a cycle and retry.

use std::path::{Path, PathBuf};

use crate::types::{AircraftSnapshot, PiplaneError, Result};

/// Reads aircraft-state snapshots from a local JSON file.
pub struct SnapshotReader {
    path: PathBuf,
}

impl SnapshotReader {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        SnapshotReader {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse one full snapshot.
    ///
    /// Distinguishes a missing file (receiver not running yet) from an
    /// unreadable or structurally invalid one.
    pub fn read(&self) -> Result<AircraftSnapshot> {
        if !self.path.exists() {
            return Err(PiplaneError::SourceMissing(self.path.display().to_string()));
        }

        let bytes = std::fs::read(&self.path).map_err(|e| {
            PiplaneError::SourceUnavailable(format!("{}: {e}", self.path.display()))
        })?;

        serde_json::from_slice(&bytes).map_err(|e| {
            PiplaneError::MalformedSnapshot(format!("{}: {e}", self.path.display()))
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
