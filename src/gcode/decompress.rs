//! Size-capped gzip decompression

use flate2::read::GzDecoder;
use log::{trace, warn};
use std::io::Read;

use crate::exceptions::{Result, SliceLensError};

/// Decompress a gzip stream, refusing output larger than `max_bytes`.
///
/// Decompression stops one byte past the limit, so a gzip bomb costs no
/// more work than a file of exactly `max_bytes`.
///
/// # Errors
///
/// [`SliceLensError::Decompression`] for a corrupt stream,
/// [`SliceLensError::FileTooLarge`] when the output exceeds `max_bytes`.
pub fn gunzip_limited(bytes: &[u8], max_bytes: usize) -> Result<Vec<u8>> {
    trace!("🗜️ Decompressing {} gzip bytes", bytes.len());

    let mut decoder = GzDecoder::new(bytes);
    let mut decompressed = Vec::new();
    (&mut decoder)
        .take((max_bytes as u64).saturating_add(1))
        .read_to_end(&mut decompressed)
        .map_err(|e| SliceLensError::Decompression(e.to_string()))?;

    if decompressed.len() > max_bytes {
        warn!("❌ Decompressed G-code exceeds the {max_bytes} byte limit");
        return Err(SliceLensError::FileTooLarge {
            limit: max_bytes,
            actual: None,
        });
    }

    trace!(
        "✅ Decompressed {} -> {} bytes",
        bytes.len(),
        decompressed.len()
    );
    Ok(decompressed)
}
