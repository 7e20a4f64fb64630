//! Build lifecycle orchestration
//!
//! Runs the build steps in a fixed order: compile native extensions first
//! (when any are declared), then stage the pure-source packages. A compile
//! failure stops the lifecycle before anything else is staged.

use crate::extensions::c_extension::{CompileContext, Toolchain};
use crate::extensions::descriptor::{self, DescriptorError};
use crate::extensions::types::ExtensionSpec;
use crate::package::{PackageError, PackageLayout};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that abort a build
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    #[error("source file for extension `{module}` not found: {}", path.display())]
    MissingSource { module: String, path: PathBuf },

    #[error("failed to build extension `{module}`: {message}\n{output}")]
    CompileFailed {
        module: String,
        message: String,
        output: String,
    },

    #[error("failed to stage package files: {0}")]
    Package(#[from] PackageError),
}

/// Steps a lifecycle pass can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildStep {
    /// Compile native extension modules
    BuildExt,
    /// Copy pure-source packages and package data
    BuildPy,
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BuildExt => "build_ext",
            Self::BuildPy => "build_py",
        })
    }
}

/// Check that every extension source exists before any compiler runs
pub fn verify_sources(specs: &[ExtensionSpec], project_root: &Path) -> Result<(), BuildError> {
    for spec in specs {
        descriptor::validate(spec)?;
        if let Some(missing) = spec
            .sources
            .iter()
            .map(|source| project_root.join(source))
            .find(|path| !path.is_file())
        {
            return Err(BuildError::MissingSource {
                module: spec.full_name(),
                path: missing,
            });
        }
    }
    Ok(())
}

/// One build lifecycle pass
///
/// ```rust,ignore
/// let mut build = BuildCommand::new(toolchain, context, specs, layout);
/// build.run()?;                 // build_ext (if modules), then build_py
/// assert_eq!(build.steps(), [BuildStep::BuildExt, BuildStep::BuildPy]);
/// ```
#[derive(Debug)]
pub struct BuildCommand<T> {
    toolchain: T,
    context: CompileContext,
    extensions: Vec<ExtensionSpec>,
    layout: PackageLayout,
    verbose: bool,
    ext_built: bool,
    steps: Vec<BuildStep>,
    artifacts: Vec<PathBuf>,
    staged: Vec<PathBuf>,
}

impl<T: Toolchain> BuildCommand<T> {
    #[must_use]
    pub const fn new(
        toolchain: T,
        context: CompileContext,
        extensions: Vec<ExtensionSpec>,
        layout: PackageLayout,
    ) -> Self {
        Self {
            toolchain,
            context,
            extensions,
            layout,
            verbose: false,
            ext_built: false,
            steps: Vec::new(),
            artifacts: Vec::new(),
            staged: Vec::new(),
        }
    }

    /// Print progress for each step
    #[must_use]
    pub const fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Whether any native module is declared
    #[must_use]
    pub fn has_ext_modules(&self) -> bool {
        !self.extensions.is_empty()
    }

    /// Run the lifecycle: `build_ext` when modules are declared, then `build_py`
    pub fn run(&mut self) -> Result<(), BuildError> {
        if self.has_ext_modules() {
            self.build_ext()?;
        }
        self.build_py()
    }

    /// Compile every declared module in declaration order.
    ///
    /// Runs at most once per lifecycle pass; later calls are no-ops. The
    /// first failing module aborts the remaining ones and removes the modules
    /// this pass already produced.
    pub fn build_ext(&mut self) -> Result<(), BuildError> {
        if self.ext_built {
            crate::debug!("build_ext already ran in this pass, skipping");
            return Ok(());
        }

        verify_sources(&self.extensions, &self.context.project_root)?;
        self.steps.push(BuildStep::BuildExt);

        for spec in &self.extensions {
            if self.verbose {
                println!("running build_ext for {}", spec.full_name());
            }

            let result = self.toolchain.compile(spec, &self.context);
            crate::debug!(
                "compiled {} in {:.2?} (success: {})",
                result.module_name,
                result.duration,
                result.success
            );

            match (result.success, result.artifact) {
                (true, Some(artifact)) => self.artifacts.push(artifact),
                (_, _) => {
                    self.discard_artifacts();
                    return Err(BuildError::CompileFailed {
                        module: result.module_name,
                        message: result
                            .error
                            .unwrap_or_else(|| "compiler produced no module".to_string()),
                        output: result.output,
                    });
                }
            }
        }

        self.ext_built = true;
        Ok(())
    }

    /// Remove modules compiled earlier in a failed pass
    fn discard_artifacts(&mut self) {
        for artifact in self.artifacts.drain(..) {
            if let Err(e) = fs::remove_file(&artifact) {
                crate::debug!("could not remove {}: {e}", artifact.display());
            }
        }
    }

    /// Stage pure-source packages and package data
    pub fn build_py(&mut self) -> Result<(), BuildError> {
        if self.verbose {
            println!("running build_py");
        }
        self.steps.push(BuildStep::BuildPy);

        let staged = self
            .layout
            .stage(&self.context.project_root, &self.context.build_lib)?;
        self.staged.extend(staged);
        Ok(())
    }

    /// Steps executed so far, in order
    #[must_use]
    pub fn steps(&self) -> &[BuildStep] {
        &self.steps
    }

    /// Compiled modules, in declaration order
    #[must_use]
    pub fn artifacts(&self) -> &[PathBuf] {
        &self.artifacts
    }

    /// Files copied by `build_py`
    #[must_use]
    pub fn staged(&self) -> &[PathBuf] {
        &self.staged
    }

    /// Staging directory holding everything this pass produced
    #[must_use]
    pub fn build_lib(&self) -> &Path {
        &self.context.build_lib
    }
}
