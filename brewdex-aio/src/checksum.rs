// brewdex-aio/src/checksum.rs
// Verifies fetched artifacts against the digest recorded in a formula.

use std::path::Path;

use brewdex_common::error::{BrewdexError, Result};
use brewdex_common::model::{Checksum, ChecksumAlgorithm};
use sha2::{Digest, Sha256};
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::debug;

/// Computes the hex encoded SHA-256 digest of a file.
pub fn compute_sha256(path: &Path) -> Result<String> {
    let std_file = std::fs::File::open(path)?;
    let mut std_reader = std::io::BufReader::new(std_file);
    let mut hasher = Sha256::new();
    let bytes_copied = std::io::copy(&mut std_reader, &mut hasher)?;
    let actual = hex::encode(hasher.finalize());
    debug!(
        "Sync Calculated SHA256: {} ({} bytes read)",
        actual, bytes_copied
    );
    Ok(actual)
}

/// Asynchronously computes the hex encoded SHA-256 digest of a file.
/// Reads the file asynchronously but performs hashing synchronously.
pub async fn compute_sha256_async(path: &Path) -> Result<String> {
    let mut file = File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buffer = Vec::with_capacity(8192);
    let mut total_bytes_read = 0u64;

    loop {
        buffer.clear();
        let n = file.read_buf(&mut buffer).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
        total_bytes_read += n as u64;
    }

    let actual = hex::encode(hasher.finalize());
    debug!(
        "Async Calculated SHA256: {} ({} bytes read)",
        actual, total_bytes_read
    );
    Ok(actual)
}

fn compare(path: &Path, expected: &Checksum, actual: String) -> Result<()> {
    debug!("Expected {}: {}", expected.algorithm, expected.digest);
    if expected.is_empty() {
        return Err(BrewdexError::ChecksumError(format!(
            "No checksum recorded to verify {} against",
            path.display()
        )));
    }
    if expected.matches(&actual) {
        Ok(())
    } else {
        Err(BrewdexError::ChecksumMismatch {
            path: path.display().to_string(),
            expected: expected.digest.clone(),
            actual,
        })
    }
}

pub fn verify_checksum_sync(path: &Path, expected: &Checksum) -> Result<()> {
    debug!("Sync Verifying checksum for: {}", path.display());
    let actual = match expected.algorithm {
        ChecksumAlgorithm::Sha256 => compute_sha256(path)?,
    };
    compare(path, expected, actual)
}

pub async fn verify_checksum_async(path: &Path, expected: &Checksum) -> Result<()> {
    debug!("Async Verifying checksum for: {}", path.display());
    let actual = match expected.algorithm {
        ChecksumAlgorithm::Sha256 => compute_sha256_async(path).await?,
    };
    compare(path, expected, actual)
}
