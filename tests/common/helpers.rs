//! Shared test helpers and utilities

use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

/// A `wheelwright` invocation isolated from the user's configuration
///
/// Environment overrides are cleared on the child so results do not depend
/// on the shell running the tests.
#[allow(dead_code)]
pub(crate) fn wheelwright_command() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_wheelwright"));
    cmd.env("WHEELWRIGHT_NO_CONFIG", "1")
        .env_remove("WHEELWRIGHT_BUILD_DIR")
        .env_remove("WHEELWRIGHT_DIST_DIR")
        .env_remove("WHEELWRIGHT_PLATFORM");
    cmd
}

/// Write a file, creating its parent directories
fn write(path: PathBuf, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create directory");
    }
    fs::write(&path, contents).expect("Failed to write fixture file");
}

/// Create a project with a Python package and no native modules
///
/// # Returns
/// The project root
#[allow(dead_code)]
pub(crate) fn create_pure_project(temp_dir: &TempDir) -> PathBuf {
    let root = temp_dir.path().join("demo");
    write(
        root.join("wheelwright.toml"),
        r#"
[package]
name = "demo"
version = "0.1.0"
summary = "Pure demo package"
packages = ["demo"]

[package.package-dir]
"" = "python"

[package.package-data]
demo = ["py.typed"]
"#,
    );
    write(root.join("python/demo/__init__.py"), "VALUE = 1\n");
    write(root.join("python/demo/py.typed"), "");
    root
}

/// Create a grammar project declaring one native module
///
/// `with_parser` controls whether the generated `src/parser.c` exists.
///
/// # Returns
/// The project root
#[allow(dead_code)]
pub(crate) fn create_grammar_project(temp_dir: &TempDir, with_parser: bool) -> PathBuf {
    let root = temp_dir.path().join("tree-sitter-demo");
    write(
        root.join("wheelwright.toml"),
        r#"
[package]
name = "tree-sitter-demo"
version = "0.2.0"
requires-python = ">=3.8"
packages = ["tree_sitter_demo"]
ext-package = "tree_sitter_demo"

[package.package-dir]
"" = "bindings/python"

[[extension]]
name = "_binding"
parser-source = "src/parser.c"
binding-source = "bindings/python/tree_sitter_demo/binding.c"
"#,
    );
    if with_parser {
        write(root.join("src/parser.c"), "int tree_sitter_demo_marker;\n");
    }
    write(
        root.join("bindings/python/tree_sitter_demo/__init__.py"),
        "from ._binding import language\n",
    );
    write(
        root.join("bindings/python/tree_sitter_demo/binding.c"),
        "#include <Python.h>\n",
    );
    root
}
