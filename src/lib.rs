//! slicelens - slicer project inspector
//!
//! Pulls the embedded slicer configuration out of 3MF project archives and
//! G-code files, diffs a project against the reference presets it was based
//! on, and hands a plain-text description of the changes to an LLM.

// Enforce strict code quality and reliability
#![deny(
    // Safety
    unsafe_code,

    // Correctness
    missing_debug_implementations,

    // Future compatibility
    future_incompatible,

    // Rust 2018 idioms
    rust_2018_idioms,
)]
#![warn(
    // Error handling best practices
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::unimplemented,
    clippy::todo,

    // Performance
    clippy::inefficient_to_string,
    clippy::large_enum_variant,

    // Code clarity and maintainability
    clippy::cognitive_complexity,
    clippy::type_complexity,

    // Best practices
    clippy::clone_on_ref_ptr,
    clippy::wildcard_imports,
    clippy::enum_glob_use,
    clippy::if_not_else,
    clippy::needless_continue,
    clippy::explicit_iter_loop,
    clippy::explicit_into_iter_loop,
)]

pub mod analysis;
pub mod api;
pub mod compare;
pub mod config;
pub mod exceptions;
pub mod exit_codes;
pub mod gcode;
pub mod logger;
pub mod presets;
pub mod project;
pub mod version;

// Re-export main API types
pub use api::{AnalysisReport, Analyzer, PreparedProject, PreparedTroubleshooting, TroubleshootReport};
pub use config::AnalyzerConfig;
pub use exceptions::{Result, SliceLensError};
