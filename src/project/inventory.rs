//! Listing of what an archive contains, for the report

use log::{debug, warn};
use serde::Serialize;
use serde_json::{Value, json};

use super::archive::RawArchive;
use super::locator::decode_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Xml,
    Json,
    Text,
    Binary,
}

impl FileKind {
    /// Classify by extension
    pub fn from_path(path: &str) -> Self {
        let lower = path.to_ascii_lowercase();
        if lower.ends_with(".xml") || lower.ends_with(".model") || lower.ends_with(".rels") {
            FileKind::Xml
        } else if lower.ends_with(".json") || lower.ends_with(".config") {
            FileKind::Json
        } else if lower.ends_with(".txt") {
            FileKind::Text
        } else {
            FileKind::Binary
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedFile {
    pub name: String,
    pub size: usize,
    pub kind: FileKind,
}

/// A JSON-ish file from a `Metadata/` directory.
///
/// `content` holds the parsed document, or `{"rawContent": .., "parseError": true}`
/// when the text is not valid JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigFile {
    /// File name without directories
    pub name: String,
    pub path: String,
    pub content: Value,
}

/// Every entry with its size and kind, sorted by path
pub fn inventory(archive: &RawArchive) -> Vec<ExtractedFile> {
    let mut files: Vec<ExtractedFile> = archive
        .entries()
        .map(|(path, bytes)| ExtractedFile {
            name: path.to_string(),
            size: bytes.len(),
            kind: FileKind::from_path(path),
        })
        .collect();
    files.sort_by(|a, b| a.name.cmp(&b.name));
    files
}

fn in_metadata_dir(path: &str) -> bool {
    let mut segments: Vec<&str> = path.split(['/', '\\']).collect();
    segments.pop();
    segments.iter().any(|s| s.eq_ignore_ascii_case("metadata"))
}

/// Parsed `.config` / `.json` files found under a `Metadata` directory,
/// sorted by file name
pub fn config_files(archive: &RawArchive) -> Vec<ConfigFile> {
    let mut configs = Vec::new();

    for (path, bytes) in archive.entries() {
        if !in_metadata_dir(path) || FileKind::from_path(path) != FileKind::Json {
            continue;
        }

        let text = decode_text(bytes);
        let content = match serde_json::from_str::<Value>(&text) {
            Ok(value) => value,
            Err(e) => {
                warn!("⚠️ Config file {} is not valid JSON: {}", path, e);
                json!({ "rawContent": text, "parseError": true })
            }
        };

        let name = path.rsplit(['/', '\\']).next().unwrap_or(path).to_string();
        debug!("📋 Config file {}", path);
        configs.push(ConfigFile {
            name,
            path: path.to_string(),
            content,
        });
    }

    configs.sort_by(|a, b| a.name.cmp(&b.name));
    configs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RawArchive {
        RawArchive::from_entries(vec![
            ("Metadata/slice_info.config".to_string(), b"<config/>".to_vec()),
            ("3D/3dmodel.model".to_string(), b"<model/>".to_vec()),
            ("Metadata/project_settings.config".to_string(), br#"{"a":1}"#.to_vec()),
            ("Metadata/plate_1.png".to_string(), vec![0x89, 0x50, 0x4e, 0x47]),
            ("notes.txt".to_string(), b"hi".to_vec()),
            ("project_settings.json".to_string(), b"{}".to_vec()),
        ])
    }

    #[test]
    fn test_inventory_sorted_with_kinds() {
        let files = inventory(&sample());
        let listed: Vec<(&str, FileKind)> = files.iter().map(|f| (f.name.as_str(), f.kind)).collect();
        assert_eq!(
            listed,
            vec![
                ("3D/3dmodel.model", FileKind::Xml),
                ("Metadata/plate_1.png", FileKind::Binary),
                ("Metadata/project_settings.config", FileKind::Json),
                ("Metadata/slice_info.config", FileKind::Json),
                ("notes.txt", FileKind::Text),
                ("project_settings.json", FileKind::Json),
            ]
        );
        assert_eq!(files[1].size, 4);
    }

    #[test]
    fn test_config_files_only_from_metadata() {
        let configs = config_files(&sample());
        assert_eq!(configs.len(), 2);

        assert_eq!(configs[0].name, "project_settings.config");
        assert_eq!(configs[0].content, json!({"a": 1}));

        assert_eq!(configs[1].name, "slice_info.config");
        assert_eq!(configs[1].path, "Metadata/slice_info.config");
        assert_eq!(configs[1].content["parseError"], json!(true));
        assert_eq!(configs[1].content["rawContent"], json!("<config/>"));
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_value(FileKind::Xml).unwrap(), json!("xml"));
    }
}
