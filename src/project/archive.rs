//! In-memory ZIP extraction

use log::{debug, trace, warn};
use sha2::{Digest, Sha256};
use std::io::{Cursor, Read};
use zip::ZipArchive;

use crate::exceptions::ExtractionError;

/// Parts every well-formed 3MF carries. Some producers drop a few, so their
/// absence is only a warning.
pub const STRUCTURE_MARKERS: [&str; 3] = ["3D/3dmodel.model", "_rels/.rels", "[Content_Types].xml"];

/// Path to bytes mapping, in archive order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawArchive {
    entries: Vec<(String, Vec<u8>)>,
}

impl RawArchive {
    pub fn from_entries(entries: Vec<(String, Vec<u8>)>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in archive order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.entries
            .iter()
            .map(|(path, bytes)| (path.as_str(), bytes.as_slice()))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(path, _)| path.as_str())
    }

    /// Exact-case lookup
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, bytes)| bytes.as_slice())
    }

    /// Case-insensitive lookup. Returns the stored path with its bytes; the
    /// first match in archive order wins.
    pub fn get_ignore_case(&self, path: &str) -> Option<(&str, &[u8])> {
        self.entries
            .iter()
            .find(|(p, _)| p.eq_ignore_ascii_case(path))
            .map(|(p, bytes)| (p.as_str(), bytes.as_slice()))
    }

    /// Whether any of the usual 3MF parts are present
    pub fn has_3mf_structure(&self) -> bool {
        self.paths()
            .any(|path| STRUCTURE_MARKERS.iter().any(|marker| path.contains(marker)))
    }
}

/// SHA-256 of an upload, hex encoded
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Open `bytes` as a ZIP container and inflate every file entry.
///
/// Directory entries are skipped. Missing 3MF parts are logged but do not
/// fail the extraction.
pub fn extract_archive(bytes: &[u8]) -> Result<RawArchive, ExtractionError> {
    trace!("Opening archive of {} bytes", bytes.len());

    let mut zip = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractionError::NotAZip(e.to_string()))?;

    if zip.is_empty() {
        return Err(ExtractionError::EmptyArchive);
    }

    let mut entries = Vec::with_capacity(zip.len());
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(|e| ExtractionError::CorruptEntry {
            path: format!("#{i}"),
            reason: e.to_string(),
        })?;

        if entry.is_dir() {
            trace!("Skipping directory entry {}", entry.name());
            continue;
        }

        let path = entry.name().to_string();
        // The declared size comes from the archive itself and may be forged
        let mut data = Vec::new();
        entry
            .read_to_end(&mut data)
            .map_err(|e| ExtractionError::CorruptEntry {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        trace!("📄 {} ({} bytes)", path, data.len());
        entries.push((path, data));
    }

    let archive = RawArchive::from_entries(entries);
    debug!("📦 Extracted {} file entries", archive.len());

    if !archive.has_3mf_structure() {
        warn!("⚠️ Archive does not contain standard 3MF structure, continuing anyway");
    }

    Ok(archive)
}
