//! Finds and parses the project settings document inside a 3MF

use log::{debug, warn};
use serde_json::Value;

use super::archive::RawArchive;
use super::settings::ProjectSettings;
use crate::exceptions::LocateError;

/// Where slicers store the project configuration, compared ignoring case
pub const PROJECT_SETTINGS_PATH: &str = "Metadata/project_settings.config";

/// Decode bytes as UTF-8, replacing invalid sequences and dropping a BOM
pub(crate) fn decode_text(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    text.strip_prefix('\u{feff}').unwrap_or(&*text).to_string()
}

/// Locate `Metadata/project_settings.config` and parse it as a JSON object.
///
/// A file that is present but not valid JSON (or not an object) yields
/// [`LocateError::MalformedSettingsJson`] carrying the decoded text.
pub fn locate_project_settings(archive: &RawArchive) -> Result<ProjectSettings, LocateError> {
    let Some((path, bytes)) = archive.get_ignore_case(PROJECT_SETTINGS_PATH) else {
        debug!("🔍 No {} among {} entries", PROJECT_SETTINGS_PATH, archive.len());
        return Err(LocateError::NotFound {
            path: PROJECT_SETTINGS_PATH.to_string(),
        });
    };

    debug!("📖 Reading settings from {} ({} bytes)", path, bytes.len());
    let raw_text = decode_text(bytes);

    let value: Value = match serde_json::from_str(&raw_text) {
        Ok(value) => value,
        Err(e) => {
            warn!("❌ {} is not valid JSON: {}", path, e);
            return Err(LocateError::MalformedSettingsJson {
                path: path.to_string(),
                raw_text,
                reason: e.to_string(),
            });
        }
    };

    ProjectSettings::from_value(value).ok_or_else(|| LocateError::MalformedSettingsJson {
        path: path.to_string(),
        raw_text,
        reason: "top-level value is not a JSON object".to_string(),
    })
}
