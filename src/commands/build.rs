//! Build command
//!
//! Compile the declared native modules, then stage the pure-source package

use anyhow::{Context, Result};
use std::path::PathBuf;
use wheelwright::lifecycle::verify_sources;
use wheelwright::{
    BuildCommand, CExtensionBuilder, CompileContext, ExtensionDescriptor, Interpreter,
    InterpreterInfo, ProjectConfig, UserDefaults,
};

/// Options shared by `build` and `bdist-wheel`
pub(crate) struct BuildArgs {
    pub(crate) project: PathBuf,
    pub(crate) build_dir: Option<PathBuf>,
    pub(crate) python: Option<String>,
    pub(crate) verbose: bool,
}

/// What a successful build left behind
pub(crate) struct BuildOutput {
    pub(crate) project_root: PathBuf,
    pub(crate) config: ProjectConfig,
    pub(crate) defaults: UserDefaults,
    pub(crate) build_lib: PathBuf,
    /// Interpreter the modules were compiled against; `None` for pure projects
    pub(crate) interpreter: Option<InterpreterInfo>,
}

/// Run the build lifecycle and report what it produced
pub(crate) fn run(args: &BuildArgs) -> Result<()> {
    let output = build(args)?;
    println!(
        "Built {} {} into {}",
        output.config.package.name,
        output.config.package.version,
        output.build_lib.display()
    );
    Ok(())
}

/// Run the build lifecycle for a project
pub(crate) fn build(args: &BuildArgs) -> Result<BuildOutput> {
    let project_root = args.project.canonicalize().with_context(|| {
        format!("Project directory not found: {}", args.project.display())
    })?;

    let config = ProjectConfig::load(&project_root)?;
    let defaults = UserDefaults::load()?;
    let build_dir = config.build_dir(&project_root, args.build_dir.as_deref(), &defaults);

    let descriptor = ExtensionDescriptor::for_host();
    let specs = descriptor.describe_all(
        &config.extensions,
        config.package.ext_package.as_deref(),
    )?;

    // Report configuration mistakes before looking for an interpreter.
    verify_sources(&specs, &project_root)?;

    let mut context = CompileContext::new(&project_root, &build_dir, descriptor.platform());
    let interpreter = if config.has_ext_modules() {
        let info = introspect(args.python.as_deref())?;
        context = context.with_interpreter(&info);
        Some(info)
    } else {
        None
    };

    let mut command = BuildCommand::new(
        CExtensionBuilder::new(args.verbose),
        context,
        specs,
        config.package.layout.clone(),
    )
    .verbose(args.verbose);
    command.run()?;

    for artifact in command.artifacts() {
        println!("  Compiled {}", artifact.display());
    }
    if args.verbose {
        for file in command.staged() {
            println!("  Staged {}", file.display());
        }
    }

    let build_lib = command.build_lib().to_path_buf();
    Ok(BuildOutput {
        project_root,
        config,
        defaults,
        build_lib,
        interpreter,
    })
}

/// Locate and query the interpreter to build against
pub(crate) fn introspect(python: Option<&str>) -> Result<InterpreterInfo> {
    let interpreter = Interpreter::locate(python)?;
    let info = interpreter.introspect().with_context(|| {
        format!(
            "Failed to query Python interpreter {}",
            interpreter.executable().display()
        )
    })?;
    wheelwright::debug!(
        "building against {} {} ({})",
        info.implementation,
        info.version(),
        info.include_dir.display()
    );
    Ok(info)
}
