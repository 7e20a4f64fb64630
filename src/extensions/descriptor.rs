//! Extension descriptor
//!
//! Turns a declared module into the full compile specification. Everything
//! beyond the module's name and sources is fixed here: the generated parser's
//! include directory, the stable-ABI macros and the platform's dialect flags.

use super::types::{DeclaredModule, ExtensionSpec};
use crate::platform::PlatformFamily;
use crate::python::{MINIMUM_STABLE_ABI, PythonVersion};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// Directory holding the generated parser and its `tree_sitter/*.h` headers
pub const GENERATED_INCLUDE_DIR: &str = "src";

/// Macro pinning the limited C API to a minimum version
pub const LIMITED_API_MACRO: &str = "Py_LIMITED_API";

/// Macro selecting the `Py_ssize_t` variants of the argument-parsing API
pub const SSIZE_T_CLEAN_MACRO: &str = "PY_SSIZE_T_CLEAN";

/// Configuration errors caught before any compiler runs
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("extension module declared without a name")]
    MissingName,

    #[error("extension `{module}` has no {role} source")]
    MissingSource { module: String, role: &'static str },

    #[error("extension `{module}` has no sources to compile")]
    NoSources { module: String },

    #[error("extension `{module}` is stable-ABI but does not define Py_LIMITED_API")]
    MissingLimitedApi { module: String },
}

/// Builds [`ExtensionSpec`]s for one host platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtensionDescriptor {
    platform: PlatformFamily,
    minimum: PythonVersion,
}

impl ExtensionDescriptor {
    #[must_use]
    pub const fn new(platform: PlatformFamily) -> Self {
        Self {
            platform,
            minimum: MINIMUM_STABLE_ABI,
        }
    }

    /// Descriptor for the machine running the build
    #[must_use]
    pub fn for_host() -> Self {
        Self::new(PlatformFamily::current())
    }

    #[must_use]
    pub const fn platform(&self) -> PlatformFamily {
        self.platform
    }

    /// Describe one declared module.
    ///
    /// Sources are ordered parser, binding shim, then any extra sources.
    pub fn describe(
        &self,
        module: &DeclaredModule,
        ext_package: Option<&str>,
    ) -> Result<ExtensionSpec, DescriptorError> {
        let name = module.name.trim();
        if name.is_empty() {
            return Err(DescriptorError::MissingName);
        }

        let required = [
            ("parser", &module.parser_source),
            ("binding", &module.binding_source),
        ];
        for (role, path) in required {
            if path.as_os_str().is_empty() {
                return Err(DescriptorError::MissingSource {
                    module: name.to_string(),
                    role,
                });
            }
        }

        let sources: Vec<PathBuf> = [&module.parser_source, &module.binding_source]
            .into_iter()
            .chain(&module.extra_sources)
            .filter(|path| !path.as_os_str().is_empty())
            .cloned()
            .collect();

        let spec = ExtensionSpec {
            module_name: name.to_string(),
            ext_package: ext_package
                .filter(|package| !package.is_empty())
                .map(str::to_string),
            sources,
            include_dirs: vec![PathBuf::from(GENERATED_INCLUDE_DIR)],
            macros: self.macros(),
            compile_flags: self
                .platform
                .dialect_flags()
                .iter()
                .map(|flag| (*flag).to_string())
                .collect(),
            stable_interface: true,
        };

        validate(&spec)?;
        crate::debug!(
            "described {} for {} platform: {} sources, flags {:?}",
            spec.full_name(),
            self.platform,
            spec.sources.len(),
            spec.compile_flags
        );

        Ok(spec)
    }

    /// Describe every declared module, in declaration order
    pub fn describe_all(
        &self,
        modules: &[DeclaredModule],
        ext_package: Option<&str>,
    ) -> Result<Vec<ExtensionSpec>, DescriptorError> {
        modules
            .iter()
            .map(|module| self.describe(module, ext_package))
            .collect()
    }

    fn macros(&self) -> BTreeMap<String, Option<String>> {
        BTreeMap::from([
            (
                LIMITED_API_MACRO.to_string(),
                Some(self.minimum.limited_api_hex()),
            ),
            (SSIZE_T_CLEAN_MACRO.to_string(), None),
        ])
    }
}

/// Check the invariants every compile specification must hold
pub fn validate(spec: &ExtensionSpec) -> Result<(), DescriptorError> {
    if spec.sources.is_empty() {
        return Err(DescriptorError::NoSources {
            module: spec.module_name.clone(),
        });
    }
    if spec.stable_interface && spec.macro_value(LIMITED_API_MACRO).is_none() {
        return Err(DescriptorError::MissingLimitedApi {
            module: spec.module_name.clone(),
        });
    }
    Ok(())
}
