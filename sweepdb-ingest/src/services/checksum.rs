//! Content checksums
//!
//! SHA-256 over file contents, hex-encoded. Exported-result documents are
//! read once: the same bytes are hashed and then parsed.

use crate::error::{IngestError, IngestResult};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

const CHUNK_SIZE: usize = 1024 * 1024;

/// Checksum and size of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDigest {
    pub checksum_sha256: String,
    pub size_bytes: u64,
}

/// Hex SHA-256 of an in-memory buffer
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

impl FileDigest {
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self {
            checksum_sha256: sha256_hex(bytes),
            size_bytes: bytes.len() as u64,
        }
    }
}

/// Stream a file through SHA-256 in 1MB chunks
pub fn digest_file(path: &Path) -> IngestResult<FileDigest> {
    let mut file = File::open(path).map_err(|e| IngestError::unreadable(path, e))?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut size_bytes = 0u64;

    loop {
        let bytes_read = file
            .read(&mut buffer)
            .map_err(|e| IngestError::unreadable(path, e))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
        size_bytes += bytes_read as u64;
    }

    Ok(FileDigest {
        checksum_sha256: format!("{:x}", hasher.finalize()),
        size_bytes,
    })
}

/// [`digest_file`] on the blocking pool
pub async fn digest_file_blocking(path: PathBuf) -> IngestResult<FileDigest> {
    tokio::task::spawn_blocking(move || digest_file(&path))
        .await
        .map_err(|e| IngestError::Internal(format!("Hash task failed: {}", e)))?
}

/// Read a whole file on the blocking pool, returning its bytes and digest
pub async fn read_with_digest(path: PathBuf) -> IngestResult<(Vec<u8>, FileDigest)> {
    tokio::task::spawn_blocking(move || {
        let bytes = std::fs::read(&path).map_err(|e| IngestError::unreadable(&path, e))?;
        let digest = FileDigest::of_bytes(&bytes);
        Ok((bytes, digest))
    })
    .await
    .map_err(|e| IngestError::Internal(format!("Read task failed: {}", e)))?
}
