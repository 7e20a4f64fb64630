//! Wheelwright internal library code
//!
//! Compiles a generated tree-sitter parser and its binding shim into one
//! stable-ABI Python extension, stages the package, and packs a wheel tagged
//! `cp38-abi3-<platform>`.

pub mod config;
pub mod debug;
pub mod env_vars;
pub mod extensions;
pub mod lifecycle;
pub mod package;
pub mod platform;
pub mod python;
pub mod wheel;

#[cfg(test)]
mod test_utils;

// Re-export common types for convenience
pub use config::{ConfigError, ProjectConfig, UserDefaults};
pub use debug::{init_debug, is_debug_enabled};
pub use extensions::{
    BuildResult, CExtensionBuilder, CompileContext, DeclaredModule, DescriptorError,
    ExtensionDescriptor, ExtensionSpec, Toolchain,
};
pub use lifecycle::{BuildCommand, BuildError, BuildStep};
pub use package::{PackageError, PackageLayout};
pub use platform::PlatformFamily;
pub use python::{Interpreter, InterpreterInfo, PythonError, PythonVersion, RuntimeFamily};
pub use wheel::{TagTriple, WheelBuilder, WheelError, WheelTagRewriter};
