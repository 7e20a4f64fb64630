//! Shared test utilities for wheelwright tests
//!
//! This module provides common test helpers, fixtures, and utilities
//! to reduce code duplication across test modules.

pub(crate) mod fixtures {
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// `wheelwright.toml` of the fixture project
    pub(crate) const PROJECT_TOML: &str = r#"
[package]
name = "tree-sitter-demo"
version = "0.1.0"
summary = "Demo grammar for tree-sitter"
requires-python = ">=3.8"
packages = ["tree_sitter_demo"]
ext-package = "tree_sitter_demo"

[package.package-dir]
"" = "bindings/python"

[package.package-data]
tree_sitter_demo = ["*.pyi", "py.typed"]

[[extension]]
name = "_binding"
parser-source = "src/parser.c"
binding-source = "bindings/python/tree_sitter_demo/binding.c"
"#;

    /// Create a grammar project laid out the way tree-sitter generates it
    ///
    /// Returns the temp dir guard and the project root.
    pub(crate) fn create_test_project() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().join("tree-sitter-demo");
        let package = root.join("bindings/python/tree_sitter_demo");

        fs::create_dir_all(root.join("src/tree_sitter")).expect("Failed to create src");
        fs::create_dir_all(&package).expect("Failed to create package dir");

        let files = [
            (root.join("wheelwright.toml"), PROJECT_TOML),
            (
                root.join("src/parser.c"),
                "#include \"tree_sitter/parser.h\"\n",
            ),
            (
                root.join("src/tree_sitter/parser.h"),
                "typedef struct TSLanguage TSLanguage;\n",
            ),
            (
                package.join("__init__.py"),
                "from ._binding import language\n",
            ),
            (package.join("__init__.pyi"), "def language() -> object: ...\n"),
            (package.join("py.typed"), ""),
            (package.join("binding.c"), "#include <Python.h>\n"),
        ];
        for (path, contents) in files {
            fs::write(&path, contents).expect("Failed to write fixture file");
        }

        (temp_dir, root)
    }
}

pub(crate) mod assertions {
    /// Assert that an error message contains a specific substring
    pub(crate) fn assert_error_contains(error_msg: &str, expected_text: &str) {
        assert!(
            error_msg.to_lowercase().contains(&expected_text.to_lowercase()),
            "Error message '{error_msg}' does not contain '{expected_text}'"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_test_project_layout() {
        let (_temp, root) = fixtures::create_test_project();
        assert!(root.join("wheelwright.toml").is_file());
        assert!(root.join("src/parser.c").is_file());
        assert!(
            root.join("bindings/python/tree_sitter_demo/binding.c")
                .is_file()
        );
    }

    #[test]
    fn assert_error_contains_ignores_case() {
        assertions::assert_error_contains("Failed To Parse", "failed to parse");
    }
}
