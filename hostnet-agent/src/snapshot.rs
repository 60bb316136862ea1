//! Metadata snapshot file reader
//!
//! Whatever syncs the cluster metadata to this host drops it as a single
//! document `{ "host": ..., "networks": [...], "services": [...] }`. A reconcile
//! cycle loads it once and resolves from that copy, so host, networks and
//! services always come from the same version of the file.

use hostnet_resolver::MetadataSnapshot;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read metadata snapshot {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid metadata snapshot {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone)]
pub struct SnapshotClient {
    path: PathBuf,
}

impl SnapshotClient {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Read and parse the whole snapshot
    pub fn load(&self) -> Result<MetadataSnapshot, SnapshotError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| SnapshotError::Read {
            path: self.path.clone(),
            source,
        })?;

        let snapshot = serde_json::from_str(&content).map_err(|source| SnapshotError::Parse {
            path: self.path.clone(),
            source,
        })?;

        debug!("Loaded metadata snapshot from {}", self.path.display());
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_reads_snapshot_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"host": {{"uuid": "host-a", "labels": {{"zone": "eu"}}}}, "networks": [{{"uuid": "net-1"}}]}}"#
        )
        .unwrap();

        let snapshot = SnapshotClient::new(file.path()).load().unwrap();
        assert_eq!(snapshot.host.uuid, "host-a");
        assert_eq!(snapshot.host.labels["zone"], "eu");
        assert_eq!(snapshot.networks[0].uuid, "net-1");
        assert!(snapshot.services.is_empty());
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let client = SnapshotClient::new(dir.path().join("missing.json"));

        assert!(matches!(client.load(), Err(SnapshotError::Read { .. })));
    }

    #[test]
    fn test_garbage_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let client = SnapshotClient::new(file.path());
        assert!(matches!(client.load(), Err(SnapshotError::Parse { .. })));
    }
}
