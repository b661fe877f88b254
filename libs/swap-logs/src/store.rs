//! JSON persistence for scraped swap logs.
//!
//! The document is a single array of records with sorted keys and
//! full-precision integer amounts, so identical runs produce identical,
//! diff-friendly files and `load` is the exact inverse of `save`.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::entity::SwapEvent;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to open {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize swap logs to {}: {source}", .path.display())]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("malformed swap log document {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Serialize `events` to `path`, replacing any existing file.
pub fn save(events: &[SwapEvent], path: impl AsRef<Path>) -> Result<(), StoreError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, events).map_err(|source| StoreError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;

    writer.flush().map_err(|source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a previously saved document back into memory.
pub fn load(path: impl AsRef<Path>) -> Result<Vec<SwapEvent>, StoreError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|source| StoreError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}
