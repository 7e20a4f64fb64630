//! C extension compiling
//!
//! Compiles an [`ExtensionSpec`] into a loadable Python module with a single
//! blocking compiler invocation. It's the equivalent of:
//! ```bash
//! cc -DPy_LIMITED_API=0x03080000 -DPY_SSIZE_T_CLEAN -Isrc -I$PY_INCLUDE \
//!    -std=c99 src/parser.c bindings/python/pkg/binding.c \
//!    -shared -o build/lib/pkg/_binding.abi3.so
//! ```
//!
//! The compiler binary and its baseline flags (`-fPIC`, optimisation level,
//! `CC`/`CFLAGS` overrides) come from the `cc` crate, resolved for the target
//! this binary was built for.

use super::types::{BuildResult, ExtensionSpec};
use crate::platform::PlatformFamily;
use crate::python::InterpreterInfo;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

/// Target triple this binary was built for
pub const HOST_TARGET: &str = env!("WHEELWRIGHT_HOST_TARGET");

/// Something that can turn an [`ExtensionSpec`] into a compiled module
///
/// Implementations block until the compiler exits and report the outcome
/// in a [`BuildResult`]; they never retry.
pub trait Toolchain: fmt::Debug {
    fn compile(&self, spec: &ExtensionSpec, context: &CompileContext) -> BuildResult;
}

/// Where a compile reads from and writes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileContext {
    /// Directory all spec paths are relative to
    pub project_root: PathBuf,
    /// Staging directory the compiled module is written into
    pub build_lib: PathBuf,
    /// Scratch directory for intermediate objects
    pub build_temp: PathBuf,
    pub platform: PlatformFamily,
    /// Directory holding `Python.h`
    pub python_include: Option<PathBuf>,
    /// Directory holding `python3.lib` (MSVC only)
    pub python_libs: Option<PathBuf>,
}

impl CompileContext {
    /// Context using `<build_dir>/lib` and `<build_dir>/temp`
    #[must_use]
    pub fn new(project_root: &Path, build_dir: &Path, platform: PlatformFamily) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            build_lib: build_dir.join("lib"),
            build_temp: build_dir.join("temp"),
            platform,
            python_include: None,
            python_libs: None,
        }
    }

    /// Take header and library locations from an interpreter report
    #[must_use]
    pub fn with_interpreter(mut self, info: &InterpreterInfo) -> Self {
        self.python_include = Some(info.include_dir.clone());
        self.python_libs = Some(info.windows_libs_dir());
        self
    }
}

/// Command-line conventions of the resolved compiler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompilerStyle {
    /// GCC or Clang producing an ELF shared object
    Gnu,
    /// Clang on Apple targets producing a loadable bundle
    Apple,
    /// `cl.exe` producing a DLL
    Msvc,
}

impl CompilerStyle {
    fn of(tool: &cc::Tool, target: &str) -> Self {
        if tool.is_like_msvc() {
            Self::Msvc
        } else if target.contains("apple") {
            Self::Apple
        } else {
            Self::Gnu
        }
    }
}

/// Arguments appended to the compiler's own baseline flags
#[must_use]
pub fn compile_args(
    spec: &ExtensionSpec,
    context: &CompileContext,
    output: &Path,
    style: CompilerStyle,
    ldflags: &[String],
) -> Vec<OsString> {
    let msvc = style == CompilerStyle::Msvc;
    let mut args: Vec<OsString> = Vec::new();

    for (name, value) in &spec.macros {
        let prefix = if msvc { "/D" } else { "-D" };
        args.push(match value {
            Some(value) => format!("{prefix}{name}={value}").into(),
            None => format!("{prefix}{name}").into(),
        });
    }

    let include_dirs = spec
        .include_dirs
        .iter()
        .map(|dir| context.project_root.join(dir))
        .chain(context.python_include.clone());
    for dir in include_dirs {
        let mut arg = OsString::from(if msvc { "/I" } else { "-I" });
        arg.push(dir);
        args.push(arg);
    }

    args.extend(spec.compile_flags.iter().map(OsString::from));
    args.extend(
        spec.sources
            .iter()
            .map(|source| context.project_root.join(source).into_os_string()),
    );

    match style {
        CompilerStyle::Gnu => {
            args.push("-shared".into());
            args.push("-o".into());
            args.push(output.into());
            args.extend(ldflags.iter().map(OsString::from));
        }
        CompilerStyle::Apple => {
            args.extend(["-bundle", "-undefined", "dynamic_lookup", "-o"].map(OsString::from));
            args.push(output.into());
            args.extend(ldflags.iter().map(OsString::from));
        }
        CompilerStyle::Msvc => {
            args.push("/LD".into());
            let mut fe = OsString::from("/Fe");
            fe.push(output);
            args.push(fe);
            let mut fo = OsString::from("/Fo");
            fo.push(&context.build_temp);
            fo.push("\\");
            args.push(fo);
            args.push("/link".into());
            if let Some(libs) = &context.python_libs {
                let mut libpath = OsString::from("/LIBPATH:");
                libpath.push(libs);
                args.push(libpath);
            }
            args.extend(ldflags.iter().map(OsString::from));
        }
    }

    args
}

/// Program and arguments of a compiler invocation, leaving out its environment
fn command_line(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|arg| arg.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

/// C extension builder backed by the host C compiler
///
/// Handles the compile in three steps:
/// 1. Resolve the compiler through `cc` (honours `CC` and `CFLAGS`)
/// 2. Compile and link every source in one invocation
/// 3. Check the exit status and report the compiler output
#[derive(Debug, Clone)]
pub struct CExtensionBuilder {
    /// Target triple handed to `cc`
    target: String,
    /// Optimisation level (`-O2` by default)
    opt_level: u32,
    /// Enable verbose output
    verbose: bool,
}

impl CExtensionBuilder {
    /// Builder for the host this binary was compiled for
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self::for_target(HOST_TARGET, verbose)
    }

    /// Builder for an explicit Rust target triple
    #[must_use]
    pub fn for_target(target: &str, verbose: bool) -> Self {
        Self {
            target: target.to_string(),
            opt_level: 2,
            verbose,
        }
    }

    /// Locate the C compiler `cc` would use for this target
    pub fn resolve_compiler(&self) -> Result<cc::Tool, cc::Error> {
        cc::Build::new()
            .target(&self.target)
            .host(&self.target)
            .opt_level(self.opt_level)
            .debug(false)
            .warnings(false)
            .cargo_metadata(false)
            .emit_rerun_if_env_changed(false)
            .try_get_compiler()
    }
}

impl Toolchain for CExtensionBuilder {
    fn compile(&self, spec: &ExtensionSpec, context: &CompileContext) -> BuildResult {
        let start_time = Instant::now();
        let module = spec.full_name();

        let tool = match self.resolve_compiler() {
            Ok(tool) => tool,
            Err(e) => {
                return BuildResult::failure(
                    module,
                    start_time.elapsed(),
                    format!("C compiler not found for {}: {e}", self.target),
                    String::new(),
                );
            }
        };

        let artifact = spec.artifact_path(&context.build_lib, context.platform);
        let output_dirs = [artifact.parent(), Some(context.build_temp.as_path())];
        for dir in output_dirs.into_iter().flatten() {
            if let Err(e) = fs::create_dir_all(dir) {
                return BuildResult::failure(
                    module,
                    start_time.elapsed(),
                    format!("Failed to create {}: {e}", dir.display()),
                    String::new(),
                );
            }
        }

        let style = CompilerStyle::of(&tool, &self.target);
        let ldflags = crate::env_vars::ldflags();
        let mut cmd = tool.to_command();
        cmd.args(compile_args(spec, context, &artifact, style, &ldflags));

        if self.verbose {
            println!("Building C extension {module}");
            println!("  Running: {}", command_line(&cmd));
        }
        crate::debug!("compiler style {style:?} for target {}", self.target);

        let compiler_output = match cmd.output() {
            Ok(out) => out,
            Err(e) => {
                return BuildResult::failure(
                    module,
                    start_time.elapsed(),
                    format!("Failed to run {}: {e}", tool.path().display()),
                    String::new(),
                );
            }
        };

        let mut output = String::new();
        output.push_str(&String::from_utf8_lossy(&compiler_output.stdout));
        output.push_str(&String::from_utf8_lossy(&compiler_output.stderr));

        if !compiler_output.status.success() {
            return BuildResult::failure(
                module,
                start_time.elapsed(),
                format!(
                    "compiler failed with exit code: {}",
                    compiler_output
                        .status
                        .code()
                        .map_or_else(|| "unknown".to_string(), |c| c.to_string())
                ),
                output,
            );
        }

        if self.verbose {
            println!("  Built {}", artifact.display());
        }

        BuildResult::success(module, start_time.elapsed(), output, artifact)
    }
}
