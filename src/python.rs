//! Python interpreter detection and runtime families
//!
//! Asks a Python interpreter for the facts a build needs (version,
//! implementation, header directory, platform) and classifies interpreter tags
//! into the runtime families that appear in wheel tags.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;
use thiserror::Error;

/// Oldest CPython the stable-ABI artifact supports.
///
/// Drives both the `Py_LIMITED_API` macro value and the rewritten wheel tag.
pub const MINIMUM_STABLE_ABI: PythonVersion = PythonVersion::new(3, 8);

/// Script printing the interpreter facts as one JSON object
const INTROSPECT_SCRIPT: &str = r#"
import json, sys, sysconfig
print(json.dumps({
    "implementation": sys.implementation.name,
    "major": sys.version_info[0],
    "minor": sys.version_info[1],
    "soabi": sysconfig.get_config_var("SOABI"),
    "include_dir": sysconfig.get_paths()["include"],
    "platform": sysconfig.get_platform(),
    "ext_suffix": sysconfig.get_config_var("EXT_SUFFIX"),
    "base_prefix": sys.base_prefix,
}))
"#;

/// Errors that can occur while locating or querying an interpreter
#[derive(Debug, Error)]
pub enum PythonError {
    #[error("no Python interpreter found (set PYTHON or put python3 on PATH)")]
    NotFound,

    #[error("failed to run {python}: {source}")]
    Launch {
        python: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{python} exited with an error:\n{stderr}")]
    Failed { python: String, stderr: String },

    #[error("unexpected interpreter output: {0}")]
    InvalidOutput(#[from] serde_json::Error),

    #[error("invalid Python version: {0}")]
    InvalidVersion(String),
}

/// Runtime families, keyed by the marker that opens an interpreter tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeFamily {
    /// Reference implementation (`cp`)
    CPython,
    /// `PyPy` (`pp`)
    PyPy,
    /// `GraalPy` (`gp`)
    GraalPy,
    /// `IronPython` (`ip`)
    IronPython,
    /// Jython (`jy`)
    Jython,
    /// Implementation-independent tag such as `py3` (`py`)
    Generic,
    /// Anything without a known marker, including empty tags
    Unknown,
}

impl RuntimeFamily {
    /// Classify an interpreter tag by its two-letter marker.
    ///
    /// ```
    /// use wheelwright::python::RuntimeFamily;
    ///
    /// assert_eq!(RuntimeFamily::from_interpreter_tag("cp312"), RuntimeFamily::CPython);
    /// assert_eq!(RuntimeFamily::from_interpreter_tag("pp39"), RuntimeFamily::PyPy);
    /// assert_eq!(RuntimeFamily::from_interpreter_tag(""), RuntimeFamily::Unknown);
    /// ```
    #[must_use]
    pub fn from_interpreter_tag(tag: &str) -> Self {
        match tag.get(..2) {
            Some("cp") => Self::CPython,
            Some("pp") => Self::PyPy,
            Some("gp") => Self::GraalPy,
            Some("ip") => Self::IronPython,
            Some("jy") => Self::Jython,
            Some("py") => Self::Generic,
            _ => Self::Unknown,
        }
    }

    /// Classify `sys.implementation.name`.
    #[must_use]
    pub fn from_implementation(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "cpython" => Self::CPython,
            "pypy" => Self::PyPy,
            "graalpy" | "graalpython" => Self::GraalPy,
            "ironpython" => Self::IronPython,
            "jython" => Self::Jython,
            _ => Self::Unknown,
        }
    }

    /// Two-letter interpreter tag marker, if the family has one
    #[inline]
    pub const fn marker(self) -> Option<&'static str> {
        match self {
            Self::CPython => Some("cp"),
            Self::PyPy => Some("pp"),
            Self::GraalPy => Some("gp"),
            Self::IronPython => Some("ip"),
            Self::Jython => Some("jy"),
            Self::Generic => Some("py"),
            Self::Unknown => None,
        }
    }

    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CPython => "cpython",
            Self::PyPy => "pypy",
            Self::GraalPy => "graalpy",
            Self::IronPython => "ironpython",
            Self::Jython => "jython",
            Self::Generic => "generic",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RuntimeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `major.minor` Python version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PythonVersion {
    pub major: u8,
    pub minor: u8,
}

impl PythonVersion {
    #[must_use]
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    /// Value for `Py_LIMITED_API` (`PY_VERSION_HEX` layout, e.g. `0x03080000`)
    #[must_use]
    pub fn limited_api_hex(self) -> String {
        format!("0x{:02X}{:02X}0000", self.major, self.minor)
    }

    /// Digits used in interpreter tags (`38` for 3.8, `312` for 3.12)
    #[must_use]
    pub fn tag_digits(self) -> String {
        format!("{}{}", self.major, self.minor)
    }
}

impl FromStr for PythonVersion {
    type Err = PythonError;

    /// Parse `3.8`, `3.12.1` or `3.13.0rc1`; anything past the minor is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PythonError::InvalidVersion(s.to_string());
        let mut parts = s.trim().split('.');

        let major = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;
        let minor_digits: String = parts
            .next()
            .unwrap_or_default()
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        let minor = minor_digits.parse().map_err(|_| invalid())?;

        Ok(Self::new(major, minor))
    }
}

impl fmt::Display for PythonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Facts reported by a Python interpreter
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InterpreterInfo {
    /// `sys.implementation.name` (e.g. "cpython", "pypy")
    pub implementation: String,
    pub major: u8,
    pub minor: u8,
    /// `SOABI` config var (absent on Windows CPython)
    #[serde(default)]
    pub soabi: Option<String>,
    /// Directory holding `Python.h`
    pub include_dir: PathBuf,
    /// `sysconfig.get_platform()` (e.g. "linux-x86_64", "win-amd64")
    pub platform: String,
    #[serde(default)]
    pub ext_suffix: Option<String>,
    pub base_prefix: PathBuf,
}

impl InterpreterInfo {
    /// Parse the JSON printed by the introspection script
    pub fn parse(json: &str) -> Result<Self, PythonError> {
        Ok(serde_json::from_str(json.trim())?)
    }

    #[must_use]
    pub const fn version(&self) -> PythonVersion {
        PythonVersion::new(self.major, self.minor)
    }

    #[must_use]
    pub fn family(&self) -> RuntimeFamily {
        RuntimeFamily::from_implementation(&self.implementation)
    }

    /// Directory holding `python3.lib`, needed when linking with MSVC
    #[must_use]
    pub fn windows_libs_dir(&self) -> PathBuf {
        self.base_prefix.join("libs")
    }
}

/// A Python interpreter executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreter {
    executable: PathBuf,
}

impl Interpreter {
    /// Use a specific executable
    #[must_use]
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Find an interpreter.
    ///
    /// Priority order:
    /// 1. Explicit executable (from `--python`)
    /// 2. `PYTHON` environment variable
    /// 3. `python3` in PATH
    /// 4. `python` in PATH
    pub fn locate(explicit: Option<&str>) -> Result<Self, PythonError> {
        if let Some(python) = explicit.map(str::to_string).or_else(crate::env_vars::python) {
            return Ok(Self::new(python));
        }

        ["python3", "python"]
            .into_iter()
            .find(|candidate| {
                Command::new(candidate)
                    .arg("--version")
                    .output()
                    .is_ok_and(|out| out.status.success())
            })
            .map(Self::new)
            .ok_or(PythonError::NotFound)
    }

    #[must_use]
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Run the introspection script and parse its report
    pub fn introspect(&self) -> Result<InterpreterInfo, PythonError> {
        let python = self.executable.display().to_string();
        crate::debug!("introspecting {python}");

        let output = Command::new(&self.executable)
            .args(["-c", INTROSPECT_SCRIPT])
            .output()
            .map_err(|source| PythonError::Launch {
                python: python.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(PythonError::Failed {
                python,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        InterpreterInfo::parse(&String::from_utf8_lossy(&output.stdout))
    }
}
