//! Native extension building
//!
//! A declared module (name plus parser and binding sources) is turned into a
//! full compile specification by the [`descriptor`], then handed to a
//! [`c_extension::Toolchain`] that produces the stable-ABI shared library.

pub mod c_extension;
pub mod descriptor;
pub mod types;

pub use c_extension::{CExtensionBuilder, CompileContext, Toolchain};
pub use descriptor::{DescriptorError, ExtensionDescriptor};
pub use types::{BuildResult, DeclaredModule, ExtensionSpec};
