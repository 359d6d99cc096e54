//! Farm persistence snapshots.
//!
//! A snapshot carries the farm clock and every registered plot. The binary
//! form is the magic bytes followed by bincode data; restoring it is
//! [`Farm::restore`](crate::farm::Farm::restore)'s job.

use crate::plot::FarmPlot;
use crate::registry::RegistryError;
use homestead_common::{MagicBytes, PlotCoord, SchemaVersion};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Errors that can occur while writing or restoring a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Missing or wrong magic bytes
    #[error("Invalid farm snapshot format")]
    InvalidFormat,

    /// Bytes after the header could not be decoded
    #[error("Farm snapshot corrupted: {0}")]
    Corrupted(String),

    /// Written by an incompatible schema
    #[error("Incompatible snapshot version: expected {expected}, found {found}")]
    VersionMismatch {
        /// Version this build writes
        expected: SchemaVersion,
        /// Version found in the data
        found: SchemaVersion,
    },

    /// A plot breaks the per-plot invariants
    #[error("Plot at {0} is inconsistent")]
    InconsistentPlot(PlotCoord),

    /// A planted plot's stage does not match its stored progress
    #[error("Plot at {position} is at stage {stage_index}, its progress puts it at {expected}")]
    StageMismatch {
        /// Plot position
        position: PlotCoord,
        /// Stage index found in the snapshot
        stage_index: usize,
        /// Stage index the stored progress resolves to
        expected: usize,
    },

    /// Registry rejected a plot (duplicate or over capacity)
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Result type for snapshot operations.
pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Persistent state of a farm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmSnapshot {
    /// Schema version
    pub version: SchemaVersion,
    /// Farm clock in seconds
    pub clock: f64,
    /// Every registered plot, locked ones included
    pub plots: Vec<FarmPlot>,
}

impl FarmSnapshot {
    /// Creates a snapshot at the current schema version.
    #[must_use]
    pub fn new(clock: f64, plots: Vec<FarmPlot>) -> Self {
        Self {
            version: SchemaVersion::FARM_SNAPSHOT,
            clock,
            plots,
        }
    }

    /// Serializes to binary format.
    pub fn to_bytes(&self) -> SnapshotResult<Vec<u8>> {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(&MagicBytes::FARM_SNAPSHOT.0);

        let data =
            bincode::serialize(self).map_err(|e| SnapshotError::Serialization(e.to_string()))?;
        buffer.extend(data);

        Ok(buffer)
    }

    /// Deserializes from binary format.
    pub fn from_bytes(bytes: &[u8]) -> SnapshotResult<Self> {
        if !MagicBytes::FARM_SNAPSHOT.matches(bytes) {
            return Err(SnapshotError::InvalidFormat);
        }

        let snapshot: Self = bincode::deserialize(&bytes[4..])
            .map_err(|e| SnapshotError::Corrupted(e.to_string()))?;

        if !SchemaVersion::FARM_SNAPSHOT.can_read(&snapshot.version) {
            return Err(SnapshotError::VersionMismatch {
                expected: SchemaVersion::FARM_SNAPSHOT,
                found: snapshot.version,
            });
        }

        Ok(snapshot)
    }

    /// Human-readable form for debugging and tooling.
    pub fn to_json(&self) -> SnapshotResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SnapshotError::Serialization(e.to_string()))
    }

    /// Writes the binary form to `path`, creating parent directories.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> SnapshotResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = self.to_bytes()?;
        fs::write(path, &bytes)?;
        info!(
            "Saved farm snapshot ({} plots, {} bytes) to {}",
            self.plots.len(),
            bytes.len(),
            path.display()
        );
        Ok(())
    }

    /// Reads a snapshot written by [`save_to`](Self::save_to).
    pub fn load_from<P: AsRef<Path>>(path: P) -> SnapshotResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let snapshot = Self::from_bytes(&bytes)?;
        info!(
            "Loaded farm snapshot ({} plots) from {}",
            snapshot.plots.len(),
            path.display()
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homestead_common::crops;
    use tempfile::TempDir;

    fn sample() -> FarmSnapshot {
        let mut growing = FarmPlot::planted(PlotCoord::new(10, 0, 0), crops::WHEAT, 3.5);
        growing.growth_progress = 0.4;
        growing.current_stage_index = 1;
        FarmSnapshot::new(
            27.0,
            vec![
                FarmPlot::empty(PlotCoord::new(0, 0, 0)),
                growing,
                FarmPlot::locked(PlotCoord::new(20, 0, 0)),
            ],
        )
    }

    #[test]
    fn test_bytes_roundtrip() {
        let snapshot = sample();
        let bytes = snapshot.to_bytes().expect("encode");
        assert_eq!(&bytes[0..4], b"HSFM");

        let loaded = FarmSnapshot::from_bytes(&bytes).expect("decode");
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn test_invalid_format() {
        assert!(matches!(
            FarmSnapshot::from_bytes(b"GNSV1234"),
            Err(SnapshotError::InvalidFormat)
        ));
        assert!(matches!(
            FarmSnapshot::from_bytes(b"HS"),
            Err(SnapshotError::InvalidFormat)
        ));
    }

    #[test]
    fn test_truncated_is_corrupted() {
        let bytes = sample().to_bytes().expect("encode");
        assert!(matches!(
            FarmSnapshot::from_bytes(&bytes[..bytes.len() / 2]),
            Err(SnapshotError::Corrupted(_))
        ));
    }

    #[test]
    fn test_newer_major_version_rejected() {
        let mut snapshot = sample();
        snapshot.version = SchemaVersion::new(2, 0, 0);
        let bytes = snapshot.to_bytes().expect("encode");
        assert!(matches!(
            FarmSnapshot::from_bytes(&bytes),
            Err(SnapshotError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn test_file_roundtrip() {
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join("saves").join("farm.hsfm");

        let snapshot = sample();
        snapshot.save_to(&path).expect("save");
        assert_eq!(FarmSnapshot::load_from(&path).expect("load"), snapshot);
    }

    #[test]
    fn test_json_contains_plots() {
        let json = sample().to_json().expect("json");
        assert!(json.contains("UnlockedPlanted"));
        assert!(json.contains("\"clock\": 27.0"));
    }
}
