//! Build environment variable handling.
//!
//! The C compiler itself (`CC`, `CFLAGS`, `CC_<target>`) is resolved by the
//! `cc` crate; this module covers the variables wheelwright reads directly.

use std::env;
use std::path::PathBuf;

// Helper for boolean environment variables that accept "1", "true", "yes"
fn is_enabled(var: &str) -> bool {
    env::var(var).ok().is_some_and(|s| {
        let s = s.to_lowercase();
        s == "1" || s == "true" || s == "yes"
    })
}

// Helper for variables where an empty value means "unset"
fn non_empty(var: &str) -> Option<String> {
    env::var(var).ok().filter(|s| !s.trim().is_empty())
}

/// Get the C compiler override (`CC`), reported by `wheelwright platform`.
pub fn cc() -> Option<String> {
    non_empty("CC")
}

/// Get extra linker flags (`LDFLAGS`), split on whitespace.
pub fn ldflags() -> Vec<String> {
    non_empty("LDFLAGS").map_or_else(Vec::new, |s| split_flags(&s))
}

/// Get the Python interpreter to introspect (`PYTHON`).
pub fn python() -> Option<String> {
    non_empty("PYTHON")
}

/// Get the platform tag override (`WHEELWRIGHT_PLATFORM`), e.g. `manylinux2014_x86_64`.
pub fn plat_name() -> Option<String> {
    non_empty("WHEELWRIGHT_PLATFORM")
}

/// Get the build directory override (`WHEELWRIGHT_BUILD_DIR`).
pub fn build_dir() -> Option<PathBuf> {
    non_empty("WHEELWRIGHT_BUILD_DIR").map(PathBuf::from)
}

/// Get the wheel output directory override (`WHEELWRIGHT_DIST_DIR`).
pub fn dist_dir() -> Option<PathBuf> {
    non_empty("WHEELWRIGHT_DIST_DIR").map(PathBuf::from)
}

/// Check if the user-level config file should be ignored (`WHEELWRIGHT_NO_CONFIG`).
pub fn no_user_config() -> bool {
    is_enabled("WHEELWRIGHT_NO_CONFIG")
}

/// Split a flags string the way a shell would for simple, unquoted values.
pub fn split_flags(value: &str) -> Vec<String> {
    value
        .split_whitespace()
        .map(std::string::ToString::to_string)
        .collect()
}
