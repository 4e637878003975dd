//! Open-ended slicer settings documents
//!
//! Slicers define their own keys, so both documents are kept as raw JSON maps.
//! Only the handful of keys the comparison depends on get typed accessors.

use serde::Serialize;
use serde_json::{Map, Value};

pub const FILAMENT_SETTINGS_ID: &str = "filament_settings_id";
pub const PRINT_SETTINGS_ID: &str = "print_settings_id";
pub const DIFFERENT_SETTINGS_TO_SYSTEM: &str = "different_settings_to_system";

/// Settings decoded from a project's `project_settings.config`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProjectSettings(Map<String, Value>);

/// The per-category key lists from `different_settings_to_system`.
/// Each list is a `;`-separated string of setting keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DifferingKeys<'a> {
    /// Index 0: print/process keys
    pub print: Option<&'a str>,
    /// Index 1: filament keys
    pub filament: Option<&'a str>,
}

impl ProjectSettings {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Wrap a JSON value, which must be an object
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// First element of `filament_settings_id`. A bare string is accepted too.
    pub fn filament_settings_id(&self) -> Option<&str> {
        match self.0.get(FILAMENT_SETTINGS_ID)? {
            Value::Array(items) => items.first().and_then(Value::as_str),
            Value::String(name) => Some(name),
            _ => None,
        }
    }

    pub fn print_settings_id(&self) -> Option<&str> {
        self.0.get(PRINT_SETTINGS_ID).and_then(Value::as_str)
    }

    /// `None` when the key is absent or not an array. Non-string elements
    /// read as missing.
    pub fn different_settings_to_system(&self) -> Option<DifferingKeys<'_>> {
        let items = self.0.get(DIFFERENT_SETTINGS_TO_SYSTEM)?.as_array()?;
        Some(DifferingKeys {
            print: items.first().and_then(Value::as_str),
            filament: items.get(1).and_then(Value::as_str),
        })
    }
}

impl From<Map<String, Value>> for ProjectSettings {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// An unmodified reference preset fetched from the catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResolvedPreset(Map<String, Value>);

impl ResolvedPreset {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings(value: Value) -> ProjectSettings {
        ProjectSettings::from_value(value).unwrap()
    }

    #[test]
    fn test_typed_accessors() {
        let s = settings(json!({
            "filament_settings_id": ["PETG", "PLA"],
            "print_settings_id": "0.2mm",
            "different_settings_to_system": ["infill_density;", "temp;"],
            "layer_height": 0.2
        }));
        assert_eq!(s.filament_settings_id(), Some("PETG"));
        assert_eq!(s.print_settings_id(), Some("0.2mm"));
        let keys = s.different_settings_to_system().unwrap();
        assert_eq!(keys.print, Some("infill_density;"));
        assert_eq!(keys.filament, Some("temp;"));
        assert_eq!(s.get("layer_height"), Some(&json!(0.2)));
    }

    #[test]
    fn test_missing_and_odd_shapes() {
        let s = settings(json!({
            "filament_settings_id": [],
            "print_settings_id": 7,
            "different_settings_to_system": "layer_height;"
        }));
        assert_eq!(s.filament_settings_id(), None);
        assert_eq!(s.print_settings_id(), None);
        assert_eq!(s.different_settings_to_system(), None);

        let s = settings(json!({"different_settings_to_system": [42, "temp"]}));
        let keys = s.different_settings_to_system().unwrap();
        assert_eq!(keys.print, None);
        assert_eq!(keys.filament, Some("temp"));
    }

    #[test]
    fn test_from_value_requires_object() {
        assert!(ProjectSettings::from_value(json!([1, 2])).is_none());
        assert!(ResolvedPreset::from_value(json!("preset")).is_none());
        assert_eq!(
            ResolvedPreset::from_value(json!({"foo": 1})).unwrap().get("foo"),
            Some(&json!(1))
        );
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let s = settings(json!({"a": 1}));
        assert_eq!(serde_json::to_value(&s).unwrap(), json!({"a": 1}));
    }
}
