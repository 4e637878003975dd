//! Error types for slicelens
//!
//! Parsing-layer errors are returned as their own enums so callers can tell
//! "not found" apart from "malformed" and pick a different message for each.
//! [`SliceLensError`] is what the request-level API hands back.

use std::fmt;
use std::time::Duration;

/// Failure to turn an uploaded buffer into a [`crate::project::RawArchive`]
#[derive(Debug)]
pub enum ExtractionError {
    /// The buffer is not a readable ZIP container
    NotAZip(String),

    /// The container declares zero entries
    EmptyArchive,

    /// An entry is listed but its data cannot be inflated
    CorruptEntry { path: String, reason: String },
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionError::NotAZip(reason) => {
                write!(f, "The file is not a valid 3MF file (corrupt ZIP archive): {reason}")
            }
            ExtractionError::EmptyArchive => {
                write!(f, "The file is not a valid 3MF file (empty ZIP archive)")
            }
            ExtractionError::CorruptEntry { path, reason } => {
                write!(f, "Failed to read archive entry {path}: {reason}")
            }
        }
    }
}

impl std::error::Error for ExtractionError {}

/// Failure to locate or parse the project settings document
#[derive(Debug)]
pub enum LocateError {
    /// No archive path matches the settings path, ignoring case
    NotFound { path: String },

    /// The settings file exists but is not a JSON object.
    /// `raw_text` is kept so the caller can show it.
    MalformedSettingsJson {
        path: String,
        raw_text: String,
        reason: String,
    },
}

impl fmt::Display for LocateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocateError::NotFound { path } => write!(f, "Invalid 3mf file. {path} not found"),
            LocateError::MalformedSettingsJson { path, reason, .. } => {
                write!(f, "Error parsing settings file {path}: {reason}")
            }
        }
    }
}

impl std::error::Error for LocateError {}

/// The G-code text carries no usable configuration block.
/// Every variant is a "not found" state, never an empty mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GcodeBlockError {
    /// No line starts with the start marker
    MissingStartMarker,

    /// No line starts with the end marker
    MissingEndMarker,

    /// Both markers exist but no line sits strictly between them
    EmptyBlock { start_line: usize, end_line: usize },

    /// The first end marker comes before the first start marker
    EndBeforeStart { end_line: usize, start_line: usize },
}

impl GcodeBlockError {
    /// Short explanation used in user-facing messages
    pub fn detail(&self) -> String {
        match self {
            GcodeBlockError::MissingStartMarker => "no CONFIG_BLOCK_START marker".to_string(),
            GcodeBlockError::MissingEndMarker => "no CONFIG_BLOCK_END marker".to_string(),
            GcodeBlockError::EmptyBlock {
                start_line,
                end_line,
            } => format!(
                "config block between lines {} and {} is empty",
                start_line + 1,
                end_line + 1
            ),
            GcodeBlockError::EndBeforeStart {
                end_line,
                start_line,
            } => format!(
                "CONFIG_BLOCK_END on line {} precedes CONFIG_BLOCK_START on line {}",
                end_line + 1,
                start_line + 1
            ),
        }
    }
}

impl fmt::Display for GcodeBlockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Not an OrcaSlicer G-code file ({}). Slice the model with OrcaSlicer and upload the resulting .gcode file",
            self.detail()
        )
    }
}

impl std::error::Error for GcodeBlockError {}

/// A single outbound fetch failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The attempt did not finish within the per-attempt timeout
    Timeout { url: String, after: Duration },

    /// The server answered with a non-success status
    Status { url: String, status: u16 },

    /// Connection-level failure
    Transport { url: String, reason: String },

    /// The body is not the JSON we asked for
    Decode { url: String, reason: String },
}

impl FetchError {
    /// Whether another attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Timeout { .. } | FetchError::Transport { .. } => true,
            FetchError::Status { status, .. } => *status >= 500 || *status == 429,
            FetchError::Decode { .. } => false,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            FetchError::Timeout { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::Transport { url, .. }
            | FetchError::Decode { url, .. } => url,
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Timeout { url, after } => {
                write!(f, "Request to {url} timed out after {after:?}")
            }
            FetchError::Status { url, status } => {
                write!(f, "Request to {url} failed with status {status}")
            }
            FetchError::Transport { url, reason } => write!(f, "Request to {url} failed: {reason}"),
            FetchError::Decode { url, reason } => {
                write!(f, "Response from {url} is not valid JSON: {reason}")
            }
        }
    }
}

impl std::error::Error for FetchError {}

/// Failure to resolve a preset name to its detail document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// The catalog could not be fetched after all retries
    CatalogUnavailable(FetchError),

    /// The catalog has no entry with this exact name
    PresetNotFound(String),

    /// The entry exists but its detail document could not be fetched or parsed
    PresetDetailUnavailable { name: String, reason: String },
}

impl fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionError::CatalogUnavailable(err) => {
                write!(f, "Failed to fetch presets: {err}")
            }
            ResolutionError::PresetNotFound(name) => write!(f, "No preset found for ID: {name}"),
            ResolutionError::PresetDetailUnavailable { name, reason } => {
                write!(f, "Failed to fetch detailed settings for {name}: {reason}")
            }
        }
    }
}

impl std::error::Error for ResolutionError {}

/// Failure talking to the LLM provider
#[derive(Debug, Clone)]
pub enum ProviderError {
    /// Provider name or credentials missing
    NotConfigured(String),

    /// The client could not be constructed
    Build(String),

    /// The request itself failed
    Request(String),

    /// The provider answered with no text
    EmptyResponse,
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::NotConfigured(msg) => write!(f, "LLM provider not configured: {msg}"),
            ProviderError::Build(msg) => write!(f, "Failed to build LLM client: {msg}"),
            ProviderError::Request(msg) => write!(f, "LLM request failed: {msg}"),
            ProviderError::EmptyResponse => write!(f, "LLM returned no text"),
        }
    }
}

impl std::error::Error for ProviderError {}

/// LLM output that does not match the analysis contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation(pub String);

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Analysis output violates schema: {}", self.0)
    }
}

impl std::error::Error for SchemaViolation {}

/// Main error type for slicelens requests
#[derive(Debug)]
pub enum SliceLensError {
    /// Upload rejected before any parsing (wrong extension, empty problem text)
    InvalidInput(String),

    /// Upload exceeds the configured size limit. `actual` is `None` when
    /// decompression stopped at the limit without learning the full size.
    FileTooLarge { limit: usize, actual: Option<usize> },

    /// Archive could not be extracted
    Extraction(ExtractionError),

    /// Project settings missing or malformed
    Locate(LocateError),

    /// G-code has no configuration block
    GcodeBlock(GcodeBlockError),

    /// Gzip stream is corrupt
    Decompression(String),

    /// IO error
    IoError(std::io::Error),

    /// JSON error
    JsonError(serde_json::Error),

    /// Generic error with message
    Generic(String),
}

impl fmt::Display for SliceLensError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SliceLensError::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
            SliceLensError::FileTooLarge {
                limit,
                actual: Some(actual),
            } => write!(f, "File size {actual} bytes exceeds the {limit} byte limit"),
            SliceLensError::FileTooLarge {
                limit,
                actual: None,
            } => write!(f, "Decompressed size exceeds the {limit} byte limit"),
            SliceLensError::Extraction(err) => write!(f, "{err}"),
            SliceLensError::Locate(err) => write!(f, "{err}"),
            SliceLensError::GcodeBlock(err) => write!(f, "{err}"),
            SliceLensError::Decompression(msg) => {
                write!(f, "Failed to decompress G-code upload: {msg}")
            }
            SliceLensError::IoError(err) => write!(f, "IO error: {err}"),
            SliceLensError::JsonError(err) => write!(f, "JSON error: {err}"),
            SliceLensError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for SliceLensError {}

impl From<ExtractionError> for SliceLensError {
    fn from(err: ExtractionError) -> Self {
        SliceLensError::Extraction(err)
    }
}

impl From<LocateError> for SliceLensError {
    fn from(err: LocateError) -> Self {
        SliceLensError::Locate(err)
    }
}

impl From<GcodeBlockError> for SliceLensError {
    fn from(err: GcodeBlockError) -> Self {
        SliceLensError::GcodeBlock(err)
    }
}

impl From<std::io::Error> for SliceLensError {
    fn from(err: std::io::Error) -> Self {
        SliceLensError::IoError(err)
    }
}

impl From<serde_json::Error> for SliceLensError {
    fn from(err: serde_json::Error) -> Self {
        SliceLensError::JsonError(err)
    }
}

impl From<anyhow::Error> for SliceLensError {
    fn from(err: anyhow::Error) -> Self {
        SliceLensError::Generic(err.to_string())
    }
}

/// Result type for slicelens operations
pub type Result<T> = std::result::Result<T, SliceLensError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_retryable() {
        let url = "https://example.invalid/presets.json".to_string();
        assert!(
            FetchError::Timeout {
                url: url.clone(),
                after: Duration::from_secs(5)
            }
            .is_retryable()
        );
        assert!(FetchError::Status { url: url.clone(), status: 503 }.is_retryable());
        assert!(FetchError::Status { url: url.clone(), status: 429 }.is_retryable());
        assert!(!FetchError::Status { url: url.clone(), status: 404 }.is_retryable());
        assert!(
            !FetchError::Decode {
                url,
                reason: "eof".into()
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_gcode_block_message_names_slicer() {
        let err = SliceLensError::from(GcodeBlockError::MissingStartMarker);
        let msg = err.to_string();
        assert!(msg.contains("OrcaSlicer"));
        assert!(msg.contains("CONFIG_BLOCK_START"));
    }

    #[test]
    fn test_empty_block_detail_is_one_based() {
        let err = GcodeBlockError::EmptyBlock {
            start_line: 9,
            end_line: 10,
        };
        assert_eq!(err.detail(), "config block between lines 10 and 11 is empty");
    }
}
