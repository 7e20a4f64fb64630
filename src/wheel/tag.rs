//! Wheel compatibility tags
//!
//! Computes the default `interpreter-abi-platform` triple for an interpreter
//! and rewrites CPython triples to the stable-ABI form, so one compiled wheel
//! installs on every CPython from the minimum supported version onwards.

use crate::python::{InterpreterInfo, MINIMUM_STABLE_ABI, PythonVersion, RuntimeFamily};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// ABI tag claimed by stable-ABI wheels
pub const STABLE_ABI_TAG: &str = "abi3";

#[derive(Debug, Error)]
pub enum TagError {
    #[error("malformed wheel tag `{0}` (expected interpreter-abi-platform)")]
    Malformed(String),
}

/// The `(interpreter, abi, platform)` compatibility triple of a wheel
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagTriple {
    pub interpreter: String,
    pub abi: String,
    pub platform: String,
}

impl TagTriple {
    #[must_use]
    pub fn new(interpreter: &str, abi: &str, platform: &str) -> Self {
        Self {
            interpreter: interpreter.to_string(),
            abi: abi.to_string(),
            platform: platform.to_string(),
        }
    }

    /// Tag of a wheel without compiled code (`py3-none-any`)
    #[must_use]
    pub fn pure() -> Self {
        Self::new("py3", "none", "any")
    }

    /// Default triple for an interpreter, as the packaging driver computes it.
    ///
    /// `plat_name` replaces the interpreter's platform when given (e.g. a
    /// `manylinux` tag after auditing).
    #[must_use]
    pub fn for_interpreter(info: &InterpreterInfo, plat_name: Option<&str>) -> Self {
        let family = info.family();
        let digits = info.version().tag_digits();
        let marker = family.marker().unwrap_or(info.implementation.as_str());
        let interpreter = format!("{marker}{digits}");

        let abi = info
            .soabi
            .as_deref()
            .and_then(|soabi| abi_tag_from_soabi(family, soabi))
            .unwrap_or_else(|| match family {
                RuntimeFamily::CPython => format!("cp{digits}"),
                _ => "none".to_string(),
            });

        let platform = plat_name.map_or_else(
            || normalize_platform(&info.platform),
            normalize_platform,
        );

        Self {
            interpreter,
            abi,
            platform,
        }
    }
}

impl fmt::Display for TagTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.interpreter, self.abi, self.platform)
    }
}

impl FromStr for TagTriple {
    type Err = TagError;

    /// Parse `cp312-cp312-linux_x86_64`. Platform tags never contain `-`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || TagError::Malformed(s.to_string());
        let mut parts = s.trim().splitn(3, '-');
        let interpreter = parts.next().filter(|p| !p.is_empty()).ok_or_else(malformed)?;
        let abi = parts.next().filter(|p| !p.is_empty()).ok_or_else(malformed)?;
        let platform = parts
            .next()
            .filter(|p| !p.is_empty() && !p.contains('-'))
            .ok_or_else(malformed)?;
        Ok(Self::new(interpreter, abi, platform))
    }
}

/// Normalise `sysconfig.get_platform()` output into a platform tag
///
/// `linux-x86_64` -> `linux_x86_64`, `macosx-11.0-arm64` -> `macosx_11_0_arm64`
#[must_use]
pub fn normalize_platform(platform: &str) -> String {
    platform.trim().replace(['-', '.', ' '], "_")
}

/// ABI tag from the interpreter's `SOABI`
///
/// - `cpython-312-x86_64-linux-gnu` -> `cp312`
/// - `cpython-313t-x86_64-linux-gnu` -> `cp313t`
/// - `pypy39-pp73-x86_64-linux-gnu` -> `pypy39_pp73`
#[must_use]
pub fn abi_tag_from_soabi(family: RuntimeFamily, soabi: &str) -> Option<String> {
    let mut parts = soabi.split('-').filter(|p| !p.is_empty());
    let first = parts.next()?;
    let second = parts.next()?;

    Some(match family {
        RuntimeFamily::CPython if first == "cpython" => format!("cp{second}"),
        _ => format!("{first}_{second}").replace('.', "_"),
    })
}

/// Rewrites default tags to claim the stable ABI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelTagRewriter {
    minimum: PythonVersion,
}

impl Default for WheelTagRewriter {
    fn default() -> Self {
        Self::new(MINIMUM_STABLE_ABI)
    }
}

impl WheelTagRewriter {
    #[must_use]
    pub const fn new(minimum: PythonVersion) -> Self {
        Self { minimum }
    }

    /// Interpreter tag of the oldest supported CPython (`cp38`)
    #[must_use]
    pub fn stable_interpreter_tag(&self) -> String {
        format!("cp{}", self.minimum.tag_digits())
    }

    /// Rewrite a default triple.
    ///
    /// CPython triples get the fixed `(cp38, abi3)` pair; every other runtime
    /// family is returned as is. The platform tag is never touched, and
    /// rewriting an already rewritten triple changes nothing.
    ///
    /// ```
    /// use wheelwright::wheel::tag::{TagTriple, WheelTagRewriter};
    ///
    /// let rewriter = WheelTagRewriter::default();
    /// let tag = rewriter.rewrite(TagTriple::new("cp312", "cp312", "linux_x86_64"));
    /// assert_eq!(tag.to_string(), "cp38-abi3-linux_x86_64");
    /// ```
    #[must_use]
    pub fn rewrite(&self, triple: TagTriple) -> TagTriple {
        match RuntimeFamily::from_interpreter_tag(&triple.interpreter) {
            RuntimeFamily::CPython => {
                crate::debug!("rewriting {triple} to the stable ABI");
                TagTriple {
                    interpreter: self.stable_interpreter_tag(),
                    abi: STABLE_ABI_TAG.to_string(),
                    platform: triple.platform,
                }
            }
            // No stable-ABI wheel tag exists for these families.
            RuntimeFamily::PyPy
            | RuntimeFamily::GraalPy
            | RuntimeFamily::IronPython
            | RuntimeFamily::Jython
            | RuntimeFamily::Generic
            | RuntimeFamily::Unknown => triple,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn info(implementation: &str, minor: u8, soabi: Option<&str>, platform: &str) -> InterpreterInfo {
        InterpreterInfo {
            implementation: implementation.to_string(),
            major: 3,
            minor,
            soabi: soabi.map(str::to_string),
            include_dir: PathBuf::from("/usr/include"),
            platform: platform.to_string(),
            ext_suffix: None,
            base_prefix: PathBuf::from("/usr"),
        }
    }

    #[test]
    fn cpython_tag_is_rewritten() {
        let rewritten =
            WheelTagRewriter::default().rewrite(TagTriple::new("cp312", "cp312", "linux_x86_64"));
        assert_eq!(rewritten, TagTriple::new("cp38", "abi3", "linux_x86_64"));
    }

    #[test]
    fn pypy_tag_is_left_alone() {
        let triple = TagTriple::new("pp39", "pypy39_pp73", "linux_x86_64");
        assert_eq!(WheelTagRewriter::default().rewrite(triple.clone()), triple);
    }

    #[test]
    fn pure_and_malformed_tags_pass_through() {
        let rewriter = WheelTagRewriter::default();
        for triple in [
            TagTriple::pure(),
            TagTriple::new("", "", ""),
            TagTriple::new("c", "weird", "linux_x86_64"),
        ] {
            assert_eq!(rewriter.rewrite(triple.clone()), triple);
        }
    }

    #[test]
    fn custom_minimum() {
        let rewriter = WheelTagRewriter::new(PythonVersion::new(3, 10));
        assert_eq!(
            rewriter.rewrite(TagTriple::new("cp313", "cp313", "win_amd64")),
            TagTriple::new("cp310", "abi3", "win_amd64")
        );
    }

    #[test]
    fn default_tag_for_cpython() {
        let tag = TagTriple::for_interpreter(
            &info("cpython", 12, Some("cpython-312-x86_64-linux-gnu"), "linux-x86_64"),
            None,
        );
        assert_eq!(tag, TagTriple::new("cp312", "cp312", "linux_x86_64"));
    }

    #[test]
    fn default_tag_for_windows_cpython_without_soabi() {
        let tag = TagTriple::for_interpreter(&info("cpython", 11, None, "win-amd64"), None);
        assert_eq!(tag.to_string(), "cp311-cp311-win_amd64");
    }

    #[test]
    fn default_tag_for_pypy() {
        let tag = TagTriple::for_interpreter(
            &info("pypy", 9, Some("pypy39-pp73-x86_64-linux-gnu"), "linux-x86_64"),
            None,
        );
        assert_eq!(tag, TagTriple::new("pp39", "pypy39_pp73", "linux_x86_64"));
    }

    #[test]
    fn platform_override() {
        let tag = TagTriple::for_interpreter(
            &info("cpython", 12, Some("cpython-312-x86_64-linux-gnu"), "linux-x86_64"),
            Some("manylinux2014_x86_64"),
        );
        assert_eq!(tag.platform, "manylinux2014_x86_64");
    }

    #[test]
    fn unknown_implementation_uses_its_name() {
        let tag = TagTriple::for_interpreter(&info("micropython", 4, None, "linux-armv7l"), None);
        assert_eq!(tag, TagTriple::new("micropython34", "none", "linux_armv7l"));
    }

    #[test]
    fn normalizes_platforms() {
        assert_eq!(normalize_platform("macosx-11.0-arm64"), "macosx_11_0_arm64");
        assert_eq!(normalize_platform("linux-x86_64"), "linux_x86_64");
        assert_eq!(normalize_platform("win-amd64"), "win_amd64");
    }

    #[test]
    fn soabi_parsing() {
        assert_eq!(
            abi_tag_from_soabi(RuntimeFamily::CPython, "cpython-313t-x86_64-linux-gnu").as_deref(),
            Some("cp313t")
        );
        assert_eq!(
            abi_tag_from_soabi(RuntimeFamily::GraalPy, "graalpy-242-native-x86_64-linux").as_deref(),
            Some("graalpy_242")
        );
        assert_eq!(abi_tag_from_soabi(RuntimeFamily::CPython, "cpython"), None);
    }

    #[test]
    fn parse_and_display() {
        let triple: TagTriple = "cp312-cp312-linux_x86_64".parse().unwrap();
        assert_eq!(triple, TagTriple::new("cp312", "cp312", "linux_x86_64"));
        assert_eq!(triple.to_string(), "cp312-cp312-linux_x86_64");

        assert!("cp312-cp312".parse::<TagTriple>().is_err());
        assert!("cp312--linux".parse::<TagTriple>().is_err());
        assert!("a-b-c-d".parse::<TagTriple>().is_err());
    }
}
