//! Standard exit codes for the slicelens binary

/// Successful execution
pub const EXIT_SUCCESS: i32 = 0;

/// Generic error (avoid using - be more specific)
pub const EXIT_ERROR: i32 = 1;

/// Panic or unrecoverable error
pub const EXIT_PANIC: i32 = 101;

/// Upload rejected (wrong extension, empty problem text, too large)
pub const EXIT_INPUT_ERROR: i32 = 102;

/// Archive could not be opened or inflated
pub const EXIT_EXTRACTION_ERROR: i32 = 103;

/// Project settings file missing or malformed
pub const EXIT_SETTINGS_ERROR: i32 = 104;

/// G-code carries no configuration block, or the gzip stream is corrupt
pub const EXIT_GCODE_ERROR: i32 = 105;

/// I/O error (file not found, permission denied, disk error)
pub const EXIT_IO_ERROR: i32 = 106;

/// Configuration error (bad runtime setup)
pub const EXIT_CONFIG_ERROR: i32 = 109;
