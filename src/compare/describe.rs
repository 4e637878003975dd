//! Plain-text descriptions handed to the LLM

use serde_json::Value;
use std::fmt::Write;

use super::reconcile::ComparisonItem;
use crate::gcode::GcodeConfigBlock;
use crate::project::ProjectSettings;

/// Shown when the project does not name a preset
pub const UNKNOWN_PRESET: &str = "Unknown";

/// Shown for a value absent on one side of a comparison
pub const MISSING_VALUE: &str = "N/A";

/// Render a comparison value: strings bare, other scalars as literals,
/// arrays and objects as compact JSON
pub fn format_value(value: Option<&Value>) -> String {
    match value {
        None => MISSING_VALUE.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Describe a project and its overrides. Output is deterministic and never
/// truncated.
pub fn describe(project: &ProjectSettings, items: &[ComparisonItem]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Filament Preset: {}",
        project.filament_settings_id().unwrap_or(UNKNOWN_PRESET)
    );
    let _ = writeln!(
        out,
        "Print Process Preset: {}",
        project.print_settings_id().unwrap_or(UNKNOWN_PRESET)
    );

    if items.is_empty() {
        out.push_str("\nNo slicing parameters differ from the presets.\n");
        return out;
    }

    out.push_str(
        "\nThe following slicing parameters are further finetuned to be different from those in the presets:\n\n",
    );
    for item in items {
        let _ = writeln!(
            out,
            "{}: {} -> {}",
            item.key,
            format_value(item.original_value.as_ref()),
            format_value(item.changed_value.as_ref())
        );
    }
    out
}

/// Describe a troubleshooting request: the user's problem, then the slicer
/// configuration in key order
pub fn describe_troubleshooting(problem: &str, block: &GcodeConfigBlock) -> String {
    let mut out = String::new();
    out.push_str("Problem description:\n");
    out.push_str(problem.trim());
    out.push_str("\n\nSlicer configuration:\n");
    for (key, value) in block.iter() {
        let _ = writeln!(out, "{key} = {value}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::SettingSource;
    use crate::gcode::locate_gcode_config_block;
    use serde_json::json;

    fn item(key: &str, original: Option<Value>, changed: Option<Value>) -> ComparisonItem {
        ComparisonItem {
            key: key.to_string(),
            original_value: original,
            changed_value: changed,
            found: true,
            source: SettingSource::Print,
        }
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(None), "N/A");
        assert_eq!(format_value(Some(&Value::Null)), "null");
        assert_eq!(format_value(Some(&json!("15%"))), "15%");
        assert_eq!(format_value(Some(&json!(0.28))), "0.28");
        assert_eq!(format_value(Some(&json!(true))), "true");
        assert_eq!(format_value(Some(&json!([1, "a"]))), r#"[1,"a"]"#);
        assert_eq!(format_value(Some(&json!({"x": 1}))), r#"{"x":1}"#);
    }

    #[test]
    fn test_describe_lists_every_item() {
        let project = ProjectSettings::from_value(json!({
            "filament_settings_id": ["PETG"],
            "print_settings_id": "0.2mm"
        }))
        .unwrap();
        let items = vec![
            item("infill_density", Some(json!("15%")), Some(json!("40%"))),
            item("ghost", None, Some(json!(1))),
        ];

        let text = describe(&project, &items);
        assert!(text.starts_with("Filament Preset: PETG\nPrint Process Preset: 0.2mm\n"));
        assert!(text.contains("\ninfill_density: 15% -> 40%\n"));
        assert!(text.contains("\nghost: N/A -> 1\n"));
    }

    #[test]
    fn test_describe_placeholders() {
        let text = describe(&ProjectSettings::default(), &[]);
        assert!(text.contains("Filament Preset: Unknown"));
        assert!(text.contains("Print Process Preset: Unknown"));
        assert!(!text.contains("->"));
    }

    #[test]
    fn test_describe_troubleshooting() {
        let block = locate_gcode_config_block(
            "; CONFIG_BLOCK_START\n; z_hop = 0.4\n; bed_temperature = 60\n; CONFIG_BLOCK_END\n",
        )
        .unwrap();
        let text = describe_troubleshooting("  Stringing everywhere \n", &block);
        assert_eq!(
            text,
            "Problem description:\nStringing everywhere\n\nSlicer configuration:\nbed_temperature = 60\nz_hop = 0.4\n"
        );
    }
}
