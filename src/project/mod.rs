//! 3MF project handling
//!
//! An upload goes through [`extract_archive`] into a [`RawArchive`], then
//! [`locate_project_settings`] pulls `Metadata/project_settings.config` out of
//! it as [`ProjectSettings`].

pub mod archive;
pub mod inventory;
pub mod locator;
pub mod settings;

pub use archive::{RawArchive, extract_archive};
pub use inventory::{ConfigFile, ExtractedFile, FileKind, config_files, inventory};
pub use locator::{PROJECT_SETTINGS_PATH, locate_project_settings};
pub use settings::{ProjectSettings, ResolvedPreset};
