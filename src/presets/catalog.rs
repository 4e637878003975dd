//! The preset catalog document

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One catalog entry. Only `name` and `sub_path` are interpreted; the rest
/// is carried along untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetCatalogEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_path: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PresetCatalogEntry {
    /// `sub_path`, if present and non-empty
    pub fn detail_path(&self) -> Option<&str> {
        self.sub_path.as_deref().filter(|p| !p.trim().is_empty())
    }
}

/// Decode one element. A non-string `sub_path` is discarded so the entry
/// still answers lookups by name.
fn parse_entry(index: usize, mut item: Value) -> Option<PresetCatalogEntry> {
    if let Some(map) = item.as_object_mut() {
        if map.get("sub_path").is_some_and(|p| !p.is_string() && !p.is_null()) {
            warn!(
                "⚠️ Catalog entry {index} ({}) has a non-string sub_path; ignoring it",
                map.get("name").unwrap_or(&Value::Null)
            );
            map.remove("sub_path");
        }
    }

    match serde_json::from_value::<PresetCatalogEntry>(item) {
        Ok(entry) => Some(entry),
        Err(e) => {
            warn!("⚠️ Skipping catalog element {index}: {e}");
            None
        }
    }
}

/// Decode the catalog. Elements that are not entries (no string `name`) are
/// dropped with a warning rather than failing the whole document.
pub fn parse_catalog(value: Value) -> Result<Vec<PresetCatalogEntry>, String> {
    let Value::Array(items) = value else {
        return Err("catalog is not a JSON array".to_string());
    };

    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| parse_entry(index, item))
        .collect())
}

/// First entry whose name is exactly `name`
pub fn find_entry<'a>(catalog: &'a [PresetCatalogEntry], name: &str) -> Option<&'a PresetCatalogEntry> {
    catalog.iter().find(|entry| entry.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_and_find() {
        let catalog = parse_catalog(json!([
            {"name": "A", "sub_path": "a.json", "vendor": "Generic"},
            {"name": "B"},
            {"sub_path": "orphan.json"},
            "junk",
            {"name": "A", "sub_path": "second.json"}
        ]))
        .unwrap();
        assert_eq!(catalog.len(), 3);

        let a = find_entry(&catalog, "A").unwrap();
        assert_eq!(a.detail_path(), Some("a.json"));
        assert_eq!(a.extra.get("vendor"), Some(&json!("Generic")));

        assert_eq!(find_entry(&catalog, "B").unwrap().detail_path(), None);
        assert!(find_entry(&catalog, "a").is_none());
    }

    #[test]
    fn test_non_string_sub_path_keeps_entry() {
        let catalog = parse_catalog(json!([
            {"name": "PLA", "sub_path": 42},
            {"name": "PETG", "sub_path": ["filament/petg.json"]}
        ]))
        .unwrap();
        assert_eq!(catalog.len(), 2);

        let pla = find_entry(&catalog, "PLA").unwrap();
        assert_eq!(pla.detail_path(), None);
        assert!(!pla.extra.contains_key("sub_path"));
        assert!(find_entry(&catalog, "PETG").is_some());
    }

    #[test]
    fn test_catalog_must_be_array() {
        assert!(parse_catalog(json!({"name": "A"})).is_err());
    }

    #[test]
    fn test_blank_sub_path_is_absent() {
        let entry: PresetCatalogEntry =
            serde_json::from_value(json!({"name": "C", "sub_path": " "})).unwrap();
        assert_eq!(entry.detail_path(), None);
    }
}
