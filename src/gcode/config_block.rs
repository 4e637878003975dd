//! Parser for the `; CONFIG_BLOCK_START` / `; CONFIG_BLOCK_END` region that
//! OrcaSlicer-family slicers append to their G-code.

use log::{debug, trace};
use std::collections::BTreeMap;

use crate::exceptions::GcodeBlockError;

pub const START_MARKER: &str = "; CONFIG_BLOCK_START";
pub const END_MARKER: &str = "; CONFIG_BLOCK_END";

/// Flat `key = value` settings from the config block, ordered by key.
/// A key listed twice keeps its last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GcodeConfigBlock {
    entries: BTreeMap<String, String>,
    /// Lines inside the block that had no `=`
    skipped_lines: usize,
}

impl GcodeConfigBlock {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn skipped_lines(&self) -> usize {
        self.skipped_lines
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }
}

/// Match a marker ignoring surrounding whitespace and the space after `;`
fn is_marker(line: &str, marker: &str) -> bool {
    let token = marker.trim_start_matches(';').trim_start();
    line.trim_start()
        .strip_prefix(';')
        .is_some_and(|rest| rest.trim_start().starts_with(token))
}

/// Strip the `;` comment prefix a config line carries
fn strip_comment(line: &str) -> &str {
    let line = line.trim();
    line.strip_prefix(';').map(str::trim_start).unwrap_or(line)
}

/// Locate the config block and parse its `key = value` lines.
///
/// Scanning is top to bottom and stops at the first end marker. A missing
/// marker, an end marker before the start marker, or a block with no lines
/// between the markers are all reported as errors, never as an empty block.
pub fn locate_gcode_config_block(text: &str) -> Result<GcodeConfigBlock, GcodeBlockError> {
    let lines: Vec<&str> = text.lines().collect();

    let mut start = None;
    let mut end = None;
    for (index, line) in lines.iter().enumerate() {
        if start.is_none() && is_marker(line, START_MARKER) {
            start = Some(index);
        } else if is_marker(line, END_MARKER) {
            end = Some(index);
            break;
        }
    }

    let Some(start) = start else {
        debug!("🔍 No {START_MARKER} line before the first {END_MARKER}");
        let later_start = end.and_then(|end_line| {
            lines[end_line + 1..]
                .iter()
                .position(|line| is_marker(line, START_MARKER))
                .map(|offset| (end_line, end_line + 1 + offset))
        });
        return Err(match later_start {
            Some((end_line, start_line)) => GcodeBlockError::EndBeforeStart {
                end_line,
                start_line,
            },
            None => GcodeBlockError::MissingStartMarker,
        });
    };
    let Some(end) = end else {
        debug!("🔍 {START_MARKER} at line {} has no matching end", start + 1);
        return Err(GcodeBlockError::MissingEndMarker);
    };
    if start + 1 >= end {
        return Err(GcodeBlockError::EmptyBlock {
            start_line: start,
            end_line: end,
        });
    }

    let mut block = GcodeConfigBlock::default();
    for (offset, raw) in lines[start + 1..end].iter().enumerate() {
        let line = strip_comment(raw);
        match line.split_once('=') {
            Some((key, value)) => {
                block
                    .entries
                    .insert(key.trim().to_string(), value.trim().to_string());
            }
            None => {
                debug!(
                    "Skipping config line {} without '=': {:?}",
                    start + 2 + offset,
                    line
                );
                block.skipped_lines += 1;
            }
        }
    }

    trace!(
        "✅ Config block lines {}..{}: {} settings, {} skipped",
        start + 1,
        end + 1,
        block.len(),
        block.skipped_lines
    );
    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_block() {
        let text = "; CONFIG_BLOCK_START\n; key1 = value1\n; key2=value2\n; CONFIG_BLOCK_END\n";
        let block = locate_gcode_config_block(text).unwrap();
        assert_eq!(block.len(), 2);
        assert_eq!(block.get("key1"), Some("value1"));
        assert_eq!(block.get("key2"), Some("value2"));
        assert_eq!(block.skipped_lines(), 0);
    }

    #[test]
    fn test_block_after_gcode_body() {
        let text = "\
; HEADER_BLOCK_START
; generated by OrcaSlicer 2.1.1
; HEADER_BLOCK_END
G28
G1 Z0.2 F3000
; filament used [mm] = 1234.5
; CONFIG_BLOCK_START
; nozzle_temperature = 220,215
; layer_height = 0.2
; post_process =
; filament_start_gcode = \"; filament start gcode\\nM106 P3 S150\"
; CONFIG_BLOCK_END
";
        let block = locate_gcode_config_block(text).unwrap();
        assert_eq!(block.get("nozzle_temperature"), Some("220,215"));
        assert_eq!(block.get("post_process"), Some(""));
        assert_eq!(
            block.get("filament_start_gcode"),
            Some("\"; filament start gcode\\nM106 P3 S150\"")
        );
        assert!(block.get("filament used [mm]").is_none());
    }

    #[test]
    fn test_value_keeps_later_equals_signs() {
        let text = "; CONFIG_BLOCK_START\n; expr = a=b=c\n; CONFIG_BLOCK_END";
        let block = locate_gcode_config_block(text).unwrap();
        assert_eq!(block.get("expr"), Some("a=b=c"));
    }

    #[test]
    fn test_lines_without_equals_are_skipped() {
        let text = "; CONFIG_BLOCK_START\r\n; just a note\r\n;\r\n; speed = 60\r\n; CONFIG_BLOCK_END\r\n";
        let block = locate_gcode_config_block(text).unwrap();
        assert_eq!(block.len(), 1);
        assert_eq!(block.get("speed"), Some("60"));
        assert_eq!(block.skipped_lines(), 2);
    }

    #[test]
    fn test_duplicates_last_wins_and_order_by_key() {
        let text = "; CONFIG_BLOCK_START\n; b = 1\n; a = 2\n; b = 3\n; CONFIG_BLOCK_END\n";
        let block = locate_gcode_config_block(text).unwrap();
        let pairs: Vec<(&str, &str)> = block.iter().collect();
        assert_eq!(pairs, vec![("a", "2"), ("b", "3")]);
    }

    #[test]
    fn test_marker_spacing_is_tolerated() {
        let text = "  ;CONFIG_BLOCK_START\n;k=v\n;   CONFIG_BLOCK_END  \n";
        let block = locate_gcode_config_block(text).unwrap();
        assert_eq!(block.get("k"), Some("v"));
    }

    #[test]
    fn test_missing_start() {
        let text = "G28\n; key = value\n; CONFIG_BLOCK_END\n";
        assert_eq!(
            locate_gcode_config_block(text),
            Err(GcodeBlockError::MissingStartMarker)
        );
        assert_eq!(
            locate_gcode_config_block(""),
            Err(GcodeBlockError::MissingStartMarker)
        );
    }

    #[test]
    fn test_missing_end() {
        let text = "; CONFIG_BLOCK_START\n; key = value\n";
        assert_eq!(
            locate_gcode_config_block(text),
            Err(GcodeBlockError::MissingEndMarker)
        );
    }

    #[test]
    fn test_adjacent_markers_are_not_an_empty_block() {
        let text = "G28\n; CONFIG_BLOCK_START\n; CONFIG_BLOCK_END\n";
        assert_eq!(
            locate_gcode_config_block(text),
            Err(GcodeBlockError::EmptyBlock {
                start_line: 1,
                end_line: 2
            })
        );
    }

    #[test]
    fn test_end_before_start() {
        let text = "; CONFIG_BLOCK_END\n; a = 1\n; CONFIG_BLOCK_START\n; b = 2\n";
        let err = locate_gcode_config_block(text).unwrap_err();
        assert_eq!(
            err,
            GcodeBlockError::EndBeforeStart {
                end_line: 0,
                start_line: 2
            }
        );
        assert!(err.detail().contains("precedes"));
        assert!(!err.detail().contains("no CONFIG_BLOCK_START"));
    }
}
