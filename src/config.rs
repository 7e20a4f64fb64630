//! Configuration file management
//!
//! Reads the project's `wheelwright.toml` (package metadata, package layout
//! and declared native modules) and the optional user-level defaults file.

use crate::env_vars;
use crate::extensions::types::DeclaredModule;
use crate::package::PackageLayout;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Project configuration file name
pub const PROJECT_FILE: &str = "wheelwright.toml";

/// Default staging directory, relative to the project root
pub const DEFAULT_BUILD_DIR: &str = "build";

/// Default wheel output directory, relative to the project root
pub const DEFAULT_DIST_DIR: &str = "dist";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no wheelwright.toml found at {}", path.display())]
    Missing { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// `[package]`: metadata passed through to the wheel plus the package layout
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PackageSection {
    pub name: String,
    pub version: String,

    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default)]
    pub requires_python: Option<String>,

    /// Dotted package compiled modules are placed in
    #[serde(default)]
    pub ext_package: Option<String>,

    #[serde(flatten)]
    pub layout: PackageLayout,
}

/// `[build]`: output locations
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BuildSection {
    #[serde(default)]
    pub build_dir: Option<PathBuf>,

    #[serde(default)]
    pub dist_dir: Option<PathBuf>,
}

/// Contents of `wheelwright.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProjectConfig {
    pub package: PackageSection,

    /// `[[extension]]` tables, in declaration order
    #[serde(default, rename = "extension")]
    pub extensions: Vec<DeclaredModule>,

    #[serde(default)]
    pub build: BuildSection,
}

impl ProjectConfig {
    /// Load `wheelwright.toml` from a project root
    pub fn load(project_root: &Path) -> Result<Self, ConfigError> {
        let path = project_root.join(PROJECT_FILE);
        if !path.is_file() {
            return Err(ConfigError::Missing { path });
        }

        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        crate::debug!("loading project config from {}", path.display());
        Self::parse(&contents, &path)
    }

    /// Parse and validate configuration text; `path` is used in messages only
    pub fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check fields the build cannot proceed without
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.package.name.trim().is_empty() {
            return Err(ConfigError::Invalid("package name is empty".to_string()));
        }
        if self.package.version.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "package `{}` has no version",
                self.package.name
            )));
        }

        let mut seen = BTreeSet::new();
        for module in &self.extensions {
            if !module.name.trim().is_empty() && !seen.insert(module.name.trim()) {
                return Err(ConfigError::Invalid(format!(
                    "extension `{}` is declared more than once",
                    module.name
                )));
            }
        }
        Ok(())
    }

    /// Whether any native module is declared
    pub fn has_ext_modules(&self) -> bool {
        !self.extensions.is_empty()
    }

    /// Staging directory.
    ///
    /// Priority: command line, `WHEELWRIGHT_BUILD_DIR`, `[build] build-dir`,
    /// user defaults, then `build`. Relative paths resolve against the project.
    pub fn build_dir(
        &self,
        project_root: &Path,
        cli: Option<&Path>,
        defaults: &UserDefaults,
    ) -> PathBuf {
        let dir = cli
            .map(Path::to_path_buf)
            .or_else(env_vars::build_dir)
            .or_else(|| self.build.build_dir.clone())
            .or_else(|| defaults.build_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BUILD_DIR));
        project_root.join(dir)
    }

    /// Wheel output directory, resolved like [`Self::build_dir`]
    pub fn dist_dir(
        &self,
        project_root: &Path,
        cli: Option<&Path>,
        defaults: &UserDefaults,
    ) -> PathBuf {
        let dir = cli
            .map(Path::to_path_buf)
            .or_else(env_vars::dist_dir)
            .or_else(|| self.build.dist_dir.clone())
            .or_else(|| defaults.dist_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DIST_DIR));
        project_root.join(dir)
    }
}

/// User-level defaults from `~/.config/wheelwright/config.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct UserDefaults {
    #[serde(default)]
    pub build_dir: Option<PathBuf>,

    #[serde(default)]
    pub dist_dir: Option<PathBuf>,
}

impl UserDefaults {
    /// Load the user defaults file, or empty defaults when there is none.
    ///
    /// Skipped entirely when `WHEELWRIGHT_NO_CONFIG` is set.
    pub fn load() -> Result<Self, ConfigError> {
        if env_vars::no_user_config() {
            return Ok(Self::default());
        }

        match Self::user_config_dir().map(|dir| dir.join("config.toml")) {
            Some(path) if path.is_file() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })
    }

    fn user_config_dir() -> Option<PathBuf> {
        // Check XDG_CONFIG_HOME first
        if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
            return Some(PathBuf::from(xdg_config).join("wheelwright"));
        }

        dirs::home_dir().map(|home| home.join(".config").join("wheelwright"))
    }
}
