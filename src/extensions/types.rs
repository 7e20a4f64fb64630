//! Extension type definitions
//!
//! A project declares its native modules by name and source files; the
//! descriptor turns each declaration into a complete [`ExtensionSpec`] that
//! the compiler toolchain consumes.

use crate::platform::PlatformFamily;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A native module as declared in `wheelwright.toml`
///
/// ```toml
/// [[extension]]
/// name = "_binding"
/// parser-source = "src/parser.c"
/// binding-source = "bindings/python/tree_sitter_freebasic/binding.c"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DeclaredModule {
    /// Module name inside the extension package (e.g. `_binding`)
    pub name: String,

    /// Source generated by the grammar compiler (e.g. `src/parser.c`)
    pub parser_source: PathBuf,

    /// Hand-written shim exposing the parser to Python
    pub binding_source: PathBuf,

    /// Further sources compiled after the shim, such as an external scanner
    #[serde(default)]
    pub extra_sources: Vec<PathBuf>,
}

/// Complete compile specification for one native module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionSpec {
    /// Module name (e.g. `_binding`)
    pub module_name: String,

    /// Dotted package the compiled module is placed in
    pub ext_package: Option<String>,

    /// Sources in compile order: parser, binding shim, extras
    pub sources: Vec<PathBuf>,

    /// Include directories, relative to the project root
    pub include_dirs: Vec<PathBuf>,

    /// Preprocessor macros; `None` defines the name without a value
    pub macros: BTreeMap<String, Option<String>>,

    /// Extra compiler flags (platform dependent)
    pub compile_flags: Vec<String>,

    /// Whether the module binds only to the limited (stable) C API
    pub stable_interface: bool,
}

impl ExtensionSpec {
    /// Fully qualified module name (e.g. `tree_sitter_freebasic._binding`)
    #[must_use]
    pub fn full_name(&self) -> String {
        match &self.ext_package {
            Some(package) if !package.is_empty() => format!("{package}.{}", self.module_name),
            _ => self.module_name.clone(),
        }
    }

    /// Check whether a macro is defined, with or without a value
    #[must_use]
    pub fn defines(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    /// Value of a macro, if it is defined with one
    #[must_use]
    pub fn macro_value(&self, name: &str) -> Option<&str> {
        self.macros.get(name).and_then(Option::as_deref)
    }

    /// File name of the compiled module.
    ///
    /// Stable-ABI modules use the version-free suffix so every supported
    /// interpreter imports the same file.
    #[must_use]
    pub fn artifact_file_name(&self, platform: PlatformFamily) -> String {
        let suffix = if self.stable_interface {
            platform.stable_abi_suffix()
        } else {
            match platform {
                PlatformFamily::Windows => ".pyd",
                PlatformFamily::Other => ".so",
            }
        };
        format!("{}{suffix}", self.module_name)
    }

    /// Where the compiled module lands inside the staging directory
    #[must_use]
    pub fn artifact_path(&self, build_lib: &Path, platform: PlatformFamily) -> PathBuf {
        let mut path = build_lib.to_path_buf();
        if let Some(package) = &self.ext_package {
            path.extend(package.split('.').filter(|part| !part.is_empty()));
        }
        path.join(self.artifact_file_name(platform))
    }
}

/// Result of compiling one extension
#[derive(Debug)]
pub struct BuildResult {
    /// Module name
    pub module_name: String,

    /// Whether the build succeeded
    pub success: bool,

    /// Build duration
    pub duration: Duration,

    /// Error message if failed
    pub error: Option<String>,

    /// Compiler output (stdout + stderr)
    pub output: String,

    /// Compiled module, if the build succeeded
    pub artifact: Option<PathBuf>,
}

impl BuildResult {
    /// Create a successful build result
    #[must_use]
    pub const fn success(
        module_name: String,
        duration: Duration,
        output: String,
        artifact: PathBuf,
    ) -> Self {
        Self {
            module_name,
            success: true,
            duration,
            error: None,
            output,
            artifact: Some(artifact),
        }
    }

    /// Create a failed build result
    #[must_use]
    pub const fn failure(
        module_name: String,
        duration: Duration,
        error: String,
        output: String,
    ) -> Self {
        Self {
            module_name,
            success: false,
            duration,
            error: Some(error),
            output,
            artifact: None,
        }
    }
}
