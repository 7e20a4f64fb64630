//! Pure-source package staging
//!
//! The generic build step: copies each declared package's Python modules and
//! its package-data files into the staging directory, resolving source
//! locations through the `package-dir` remapping.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while staging package files
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("source directory for package `{package}` not found: {}", path.display())]
    MissingPackage { package: String, path: PathBuf },

    #[error("invalid package-data pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to copy {} to {}: {source}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Package list and file mappings passed through from the project config
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PackageLayout {
    /// Dotted package names (e.g. `tree_sitter_freebasic`)
    #[serde(default)]
    pub packages: Vec<String>,

    /// Package name -> source directory; the `""` key is the root of all packages
    #[serde(default)]
    pub package_dir: BTreeMap<String, PathBuf>,

    /// Package name -> glob patterns of non-Python files to ship; the `""`
    /// key applies to every package
    #[serde(default)]
    pub package_data: BTreeMap<String, Vec<String>>,
}

impl PackageLayout {
    /// Source directory of a package, relative to the project root.
    ///
    /// Looks for the longest dotted prefix with an explicit mapping, then the
    /// `""` root mapping, then falls back to the package path itself.
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use std::path::PathBuf;
    /// use wheelwright::package::PackageLayout;
    ///
    /// let layout = PackageLayout {
    ///     package_dir: BTreeMap::from([(String::new(), PathBuf::from("bindings/python"))]),
    ///     ..PackageLayout::default()
    /// };
    /// assert_eq!(
    ///     layout.source_dir("tree_sitter_freebasic"),
    ///     PathBuf::from("bindings/python/tree_sitter_freebasic")
    /// );
    /// ```
    #[must_use]
    pub fn source_dir(&self, package: &str) -> PathBuf {
        let parts: Vec<&str> = package.split('.').filter(|p| !p.is_empty()).collect();

        for split in (1..=parts.len()).rev() {
            let (head, tail) = parts.split_at(split);
            if let Some(dir) = self.package_dir.get(&head.join(".")) {
                let mut path = dir.clone();
                path.extend(tail);
                return path;
            }
        }

        let mut path = self.package_dir.get("").cloned().unwrap_or_default();
        path.extend(&parts);
        path
    }

    /// Package-data patterns that apply to a package
    fn data_patterns(&self, package: &str) -> impl Iterator<Item = &String> {
        let shared = self.package_data.get("").into_iter().flatten();
        let own = if package.is_empty() {
            None
        } else {
            self.package_data.get(package)
        };
        shared.chain(own.into_iter().flatten())
    }

    /// Copy every package into `build_lib`, returning the staged files
    pub fn stage(&self, project_root: &Path, build_lib: &Path) -> Result<Vec<PathBuf>, PackageError> {
        let mut staged = Vec::new();

        for package in &self.packages {
            let source = project_root.join(self.source_dir(package));
            if !source.is_dir() {
                return Err(PackageError::MissingPackage {
                    package: package.clone(),
                    path: source,
                });
            }

            let mut dest = build_lib.to_path_buf();
            dest.extend(package.split('.').filter(|p| !p.is_empty()));

            for module in python_modules(&source)? {
                staged.push(copy_into(&source, &module, &dest)?);
            }

            for pattern in self.data_patterns(package) {
                for file in matching_files(&source, pattern)? {
                    staged.push(copy_into(&source, &file, &dest)?);
                }
            }

            crate::debug!("staged package {package} from {}", source.display());
        }

        staged.sort();
        staged.dedup();
        Ok(staged)
    }
}

/// `*.py` files directly inside a package directory
fn python_modules(dir: &Path) -> Result<Vec<PathBuf>, PackageError> {
    let read_error = |source| PackageError::Read {
        path: dir.to_path_buf(),
        source,
    };

    let mut modules = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_error)? {
        let path = entry.map_err(read_error)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "py") {
            modules.push(path);
        }
    }
    modules.sort();
    Ok(modules)
}

/// Files under `dir` matching a package-data glob
fn matching_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, PackageError> {
    let full = format!(
        "{}/{pattern}",
        glob::Pattern::escape(&dir.to_string_lossy())
    );
    let paths = glob::glob(&full).map_err(|source| PackageError::Pattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| PackageError::Read {
            path: e.path().to_path_buf(),
            source: io::Error::from(e),
        })?;
        if path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}

/// Copy `file` (somewhere under `source_root`) to the same relative path under `dest_root`
fn copy_into(source_root: &Path, file: &Path, dest_root: &Path) -> Result<PathBuf, PackageError> {
    let relative = file.strip_prefix(source_root).unwrap_or(file);
    let target = dest_root.join(relative);

    let copy_error = |source| PackageError::Copy {
        from: file.to_path_buf(),
        to: target.clone(),
        source,
    };

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(copy_error)?;
    }
    fs::copy(file, &target).map_err(copy_error)?;

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures::create_test_project;

    fn layout() -> PackageLayout {
        PackageLayout {
            packages: vec!["tree_sitter_demo".to_string()],
            package_dir: BTreeMap::from([(String::new(), PathBuf::from("bindings/python"))]),
            package_data: BTreeMap::from([(
                "tree_sitter_demo".to_string(),
                vec!["*.pyi".to_string(), "py.typed".to_string()],
            )]),
        }
    }

    #[test]
    fn source_dir_uses_root_mapping() {
        assert_eq!(
            layout().source_dir("tree_sitter_demo"),
            PathBuf::from("bindings/python/tree_sitter_demo")
        );
    }

    #[test]
    fn source_dir_prefers_longest_prefix() {
        let layout = PackageLayout {
            package_dir: BTreeMap::from([
                (String::new(), PathBuf::from("lib")),
                ("outer".to_string(), PathBuf::from("src/outer_pkg")),
            ]),
            ..PackageLayout::default()
        };
        assert_eq!(
            layout.source_dir("outer.inner"),
            PathBuf::from("src/outer_pkg/inner")
        );
        assert_eq!(layout.source_dir("other"), PathBuf::from("lib/other"));
    }

    #[test]
    fn source_dir_without_mapping() {
        assert_eq!(
            PackageLayout::default().source_dir("a.b"),
            PathBuf::from("a/b")
        );
    }

    #[test]
    fn stage_copies_modules_and_package_data() {
        let (temp, root) = create_test_project();
        let build_lib = temp.path().join("build/lib");

        let staged = layout().stage(&root, &build_lib).unwrap();
        let pkg = build_lib.join("tree_sitter_demo");

        assert!(pkg.join("__init__.py").is_file());
        assert!(pkg.join("__init__.pyi").is_file());
        assert!(pkg.join("py.typed").is_file());
        assert!(!pkg.join("binding.c").exists(), "C sources are not package data");
        assert_eq!(staged.len(), 3);
    }

    #[test]
    fn shared_patterns_apply_to_every_package() {
        let (temp, root) = create_test_project();
        let build_lib = temp.path().join("build/lib");
        let mut layout = layout();
        layout.package_data = BTreeMap::from([(String::new(), vec!["*.c".to_string()])]);

        layout.stage(&root, &build_lib).unwrap();
        assert!(build_lib.join("tree_sitter_demo/binding.c").is_file());
        assert!(!build_lib.join("tree_sitter_demo/py.typed").exists());
    }

    #[test]
    fn missing_package_directory() {
        let (temp, root) = create_test_project();
        let mut layout = layout();
        layout.packages = vec!["not_there".to_string()];

        let result = layout.stage(&root, &temp.path().join("build/lib"));
        assert!(matches!(
            result,
            Err(PackageError::MissingPackage { package, .. }) if package == "not_there"
        ));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let (temp, root) = create_test_project();
        let mut layout = layout();
        layout.package_data = BTreeMap::from([(String::new(), vec!["[".to_string()])]);

        let result = layout.stage(&root, &temp.path().join("build/lib"));
        assert!(matches!(result, Err(PackageError::Pattern { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_data_directory_is_reported() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::TempDir::new().unwrap();
        let locked = temp.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        let readable = fs::read_dir(&locked).is_ok();

        let result = matching_files(temp.path(), "locked/*");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        // Permission bits do not apply to privileged users
        if readable {
            assert!(result.unwrap().is_empty());
            return;
        }
        assert!(matches!(
            result,
            Err(PackageError::Read { path, source }) if path == locked
                && source.kind() == io::ErrorKind::PermissionDenied
        ));
    }
}
