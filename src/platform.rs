//! Host platform detection
//!
//! The build only distinguishes two platform families: Windows and everything
//! else. The family is resolved once per process and decides which C dialect
//! flags the extension is compiled with.

use std::env;
use std::fmt;
use std::sync::LazyLock;

/// Cached host family (computed once, reused throughout execution)
static CURRENT_FAMILY: LazyLock<PlatformFamily> =
    LazyLock::new(|| PlatformFamily::from_os(env::consts::OS));

/// Strict C dialect requested from non-Windows compilers
pub const C_DIALECT_FLAG: &str = "-std=c99";

/// Platform families relevant to the native compile step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformFamily {
    /// Windows (MSVC-style toolchains, no dialect flag)
    Windows,
    /// Linux, macOS, BSDs and anything unrecognised
    Other,
}

impl PlatformFamily {
    /// Classify an operating system identifier.
    ///
    /// Accepts Rust's `std::env::consts::OS` values as well as Python's
    /// `platform.system()` spelling. Unknown identifiers fall back to `Other`.
    ///
    /// ```
    /// use wheelwright::platform::PlatformFamily;
    ///
    /// assert_eq!(PlatformFamily::from_os("windows"), PlatformFamily::Windows);
    /// assert_eq!(PlatformFamily::from_os("Darwin"), PlatformFamily::Other);
    /// ```
    #[must_use]
    pub fn from_os(os: &str) -> Self {
        match os.trim().to_ascii_lowercase().as_str() {
            "windows" | "win32" | "win64" => Self::Windows,
            _ => Self::Other,
        }
    }

    /// Family of the machine running this process
    #[must_use]
    pub fn current() -> Self {
        *CURRENT_FAMILY
    }

    /// Compiler flags selecting the C dialect for this family
    #[must_use]
    pub const fn dialect_flags(self) -> &'static [&'static str] {
        match self {
            Self::Windows => &[],
            Self::Other => &[C_DIALECT_FLAG],
        }
    }

    /// File suffix of a stable-ABI extension module on this family
    #[must_use]
    pub const fn stable_abi_suffix(self) -> &'static str {
        match self {
            Self::Windows => ".pyd",
            Self::Other => ".abi3.so",
        }
    }

    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Platform tag derived from Rust's view of the host.
///
/// Used only when no interpreter is available to report
/// `sysconfig.get_platform()`. Examples: `linux_x86_64`, `macosx_11_0_arm64`,
/// `win_amd64`.
#[must_use]
pub fn fallback_platform_tag() -> String {
    platform_tag_for(env::consts::OS, env::consts::ARCH)
}

fn platform_tag_for(os: &str, arch: &str) -> String {
    match (os, arch) {
        ("windows", "x86_64") => "win_amd64".to_string(),
        ("windows", "x86") => "win32".to_string(),
        ("windows", "aarch64") => "win_arm64".to_string(),
        ("macos", "aarch64") => "macosx_11_0_arm64".to_string(),
        ("macos", _) => format!("macosx_10_9_{arch}"),
        _ => format!("{os}_{arch}"),
    }
}
