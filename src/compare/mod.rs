//! Preset comparison and the text descriptions built from it

pub mod describe;
pub mod reconcile;

pub use describe::{describe, describe_troubleshooting, format_value};
pub use reconcile::{ComparisonItem, SettingSource, reconcile};
