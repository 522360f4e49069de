//! Checkpoint trait and error handling for codebook persistence.
//!
//! Learned codebooks round-trip through a versioned, deterministic binary
//! snapshot at a caller-supplied path; the core never decides where state
//! lives. Incompatible snapshot versions are rejected during load, and a
//! failed load leaves the caller free to fall back to learning from
//! scratch.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use bincode::Options;

/// Current codebook snapshot schema version.
pub const CODEBOOK_SNAPSHOT_VERSION: u32 = 1;

/// Errors that can occur while saving or loading checkpoints.
#[derive(Debug)]
pub enum CheckpointError {
    /// Underlying I/O failure while reading or writing checkpoint files.
    Io(std::io::Error),
    /// Serialization or deserialization error from the binary codec.
    Serialization(bincode::Error),
    /// The checkpoint file was well formed but carries an incompatible schema version.
    VersionMismatch { expected: u32, found: u32 },
    /// The checkpoint file did not match the expected structure.
    InvalidFormat(String),
}

impl fmt::Display for CheckpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckpointError::Io(err) => write!(f, "I/O error while accessing checkpoint: {err}"),
            CheckpointError::Serialization(err) => {
                write!(f, "Failed to (de)serialize checkpoint payload: {err}")
            }
            CheckpointError::VersionMismatch { expected, found } => write!(
                f,
                "Checkpoint version mismatch: expected {expected}, found {found}",
            ),
            CheckpointError::InvalidFormat(msg) => {
                write!(f, "Checkpoint file has invalid structure: {msg}")
            }
        }
    }
}

impl std::error::Error for CheckpointError {}

impl From<std::io::Error> for CheckpointError {
    fn from(err: std::io::Error) -> Self {
        CheckpointError::Io(err)
    }
}

impl From<bincode::Error> for CheckpointError {
    fn from(err: bincode::Error) -> Self {
        CheckpointError::Serialization(err)
    }
}

/// Deterministic binary codec options shared by all checkpoint implementations.
fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .allow_trailing_bytes()
        .with_little_endian()
}

/// Components that support deterministic persistence implement this trait.
pub trait Checkpointable: Sized {
    /// Save the current state to `path` using the deterministic codec.
    fn save_checkpoint<P: AsRef<Path>>(&self, path: P) -> Result<(), CheckpointError>;

    /// Load a state from `path`, replacing any existing instance.
    fn load_checkpoint<P: AsRef<Path>>(path: P) -> Result<Self, CheckpointError>;

    /// Utility for writing a serializable snapshot with the shared codec.
    fn write_snapshot<P, T>(snapshot: &T, path: P) -> Result<(), CheckpointError>
    where
        P: AsRef<Path>,
        T: serde::Serialize,
    {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        codec().serialize_into(&mut writer, snapshot)?;
        writer.flush()?;
        Ok(())
    }

    /// Utility for reading a serializable snapshot with the shared codec.
    fn read_snapshot<P, T>(path: P) -> Result<T, CheckpointError>
    where
        P: AsRef<Path>,
        T: serde::de::DeserializeOwned,
    {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Ok(codec().deserialize_from(&mut reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codebook::Codebook;

    #[test]
    fn codebook_round_trips_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("walk.codebook");

        let codebook = Codebook::from_seed(12, 6, 0.05, 9).unwrap();
        codebook.save_checkpoint(&path).unwrap();

        let restored = Codebook::load_checkpoint(&path).unwrap();
        assert_eq!(restored.basis(), codebook.basis());
        assert_eq!(restored.alpha(), codebook.alpha());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.codebook");

        let result = Codebook::load_checkpoint(&path);
        assert!(matches!(result, Err(CheckpointError::Io(_))));
    }

    #[test]
    fn corrupt_payload_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.codebook");
        std::fs::write(&path, b"not a checkpoint").unwrap();

        let result = Codebook::load_checkpoint(&path);
        assert!(matches!(
            result,
            Err(CheckpointError::Serialization(_)) | Err(CheckpointError::InvalidFormat(_))
        ));
    }

    #[test]
    fn future_snapshot_version_is_rejected() {
        #[derive(serde::Serialize)]
        struct FutureSnapshot {
            version: u32,
            alpha: f64,
            basis: ndarray::Array2<f64>,
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("future.codebook");
        let snapshot = FutureSnapshot {
            version: CODEBOOK_SNAPSHOT_VERSION + 1,
            alpha: 0.1,
            basis: ndarray::Array2::zeros((2, 2)),
        };
        Codebook::write_snapshot(&snapshot, &path).unwrap();

        let result = Codebook::load_checkpoint(&path);
        assert!(matches!(
            result,
            Err(CheckpointError::VersionMismatch {
                expected: CODEBOOK_SNAPSHOT_VERSION,
                ..
            })
        ));
    }
}
