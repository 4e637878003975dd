//! Diff a project's overridden settings against its reference presets

use log::debug;
use serde::Serialize;
use serde_json::Value;

use crate::project::{ProjectSettings, ResolvedPreset};

/// Which preset category a compared key belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingSource {
    Print,
    Filament,
}

/// One overridden key. `None` values mean the key is absent on that side.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonItem {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_value: Option<Value>,
    /// Whether the reference preset defines the key at all
    pub found: bool,
    pub source: SettingSource,
}

/// Tokens of a `;`-separated key list, trimmed, empties dropped
fn split_keys(list: &str) -> impl Iterator<Item = &str> {
    list.split(';').map(str::trim).filter(|key| !key.is_empty())
}

/// Filament settings are per-extruder arrays; only the first extruder's
/// value is compared.
fn first_element(value: Option<&Value>) -> Option<Value> {
    match value {
        Some(Value::Array(items)) if !items.is_empty() => Some(items[0].clone()),
        other => other.cloned(),
    }
}

fn compare_key(
    key: &str,
    source: SettingSource,
    preset: &ResolvedPreset,
    project: &ProjectSettings,
) -> ComparisonItem {
    let (original_value, changed_value) = match source {
        SettingSource::Print => (preset.get(key).cloned(), project.get(key).cloned()),
        SettingSource::Filament => (first_element(preset.get(key)), first_element(project.get(key))),
    };

    ComparisonItem {
        key: key.to_string(),
        original_value,
        changed_value,
        found: preset.contains_key(key),
        source,
    }
}

/// Build the comparison list from `different_settings_to_system`.
///
/// Print keys (list 0) come first, then filament keys (list 1), each in the
/// order listed. A category whose preset did not resolve is skipped. A key
/// named in both lists appears twice.
pub fn reconcile(
    print: Option<&ResolvedPreset>,
    filament: Option<&ResolvedPreset>,
    project: &ProjectSettings,
) -> Vec<ComparisonItem> {
    let Some(lists) = project.different_settings_to_system() else {
        debug!("📭 No different_settings_to_system list in project settings");
        return Vec::new();
    };

    let mut items = Vec::new();
    let categories = [
        (SettingSource::Print, lists.print, print),
        (SettingSource::Filament, lists.filament, filament),
    ];

    for (source, keys, preset) in categories {
        let (Some(keys), Some(preset)) = (keys, preset) else {
            continue;
        };
        let before = items.len();
        items.extend(split_keys(keys).map(|key| compare_key(key, source, preset, project)));
        debug!("🔍 {:?}: {} keys compared", source, items.len() - before);
    }

    items
}
