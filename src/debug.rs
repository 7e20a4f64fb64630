//! Debug logging utilities
//!
//! Debug output respects the global `--debug` flag and goes to stderr so it
//! never mixes with command output such as the tag printed by `wheelwright tag`.

use std::sync::OnceLock;

static DEBUG_ENABLED: OnceLock<bool> = OnceLock::new();

/// Initialize debug mode from the command-line flag
///
/// Only the first call has an effect.
pub fn init_debug(enabled: bool) {
    let _ = DEBUG_ENABLED.set(enabled);
}

/// Check if debug mode is enabled
pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED.get().copied().unwrap_or(false)
}

/// Macro for debug logging
///
/// Usage: `debug!("compiling {}", spec.module_name)`
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        if $crate::debug::is_debug_enabled() {
            eprintln!("[DEBUG] {}", format_args!($($arg)*));
        }
    };
}
