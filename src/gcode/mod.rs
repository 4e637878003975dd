//! G-code handling: gunzip the upload, then read the embedded config block

pub mod config_block;
pub mod decompress;

pub use config_block::{END_MARKER, GcodeConfigBlock, START_MARKER, locate_gcode_config_block};
pub use decompress::gunzip_limited;
