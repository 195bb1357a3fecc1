//! Snapshot stream I/O.
//!
//! Snapshots are serialized as a single JSON document mirroring the model
//! exactly. They are read from arbitrary byte streams (file or stdin); the
//! schema version is checked by the diff engine, not here, so that an
//! outdated snapshot still loads for inspection.

use std::io::{Read, Write};

use tracing::warn;

use super::{Snapshot, SCHEMA_VERSION};

/// Errors surfaced while loading or writing a snapshot document.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot stream: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed snapshot document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Deserialize a snapshot from a byte stream.
///
/// Logs a warning when the document declares an unexpected schema version;
/// the caller decides whether that matters (the diff engine treats it as
/// "nothing to report").
pub fn read_snapshot<R: Read>(reader: R) -> Result<Snapshot, SnapshotError> {
    let snapshot: Snapshot = serde_json::from_reader(reader)?;
    if snapshot.schema_version != SCHEMA_VERSION {
        warn!(
            found = %snapshot.schema_version,
            expected = SCHEMA_VERSION,
            "snapshot declares an unexpected schema version"
        );
    }
    Ok(snapshot)
}

/// Serialize a snapshot to a byte stream.
pub fn write_snapshot<W: Write>(writer: W, snapshot: &Snapshot) -> Result<(), SnapshotError> {
    serde_json::to_writer(writer, snapshot)?;
    Ok(())
}
