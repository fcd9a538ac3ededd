//! Standard exit codes for CLI operations
//!
//! These exit codes follow sysexits.h where applicable.

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Service unavailable - the Kubernetes API could not be reached
pub const UNAVAILABLE: i32 = 69;

/// IO error - writing output failed
pub const IO_ERROR: i32 = 74;

/// Configuration error - invalid flags or environment
pub const CONFIG_ERROR: i32 = 78;
