//! Wheel command
//!
//! Build the project, then pack the staging directory into a stable-ABI wheel

use super::build::{BuildArgs, build};
use anyhow::{Context, Result};
use std::path::Path;
use wheelwright::{InterpreterInfo, TagTriple, WheelBuilder, WheelTagRewriter, env_vars};

/// Build and pack a wheel
pub(crate) fn run(args: &BuildArgs, dist_dir: Option<&Path>, plat_name: Option<&str>) -> Result<()> {
    let output = build(args)?;
    let package = &output.config.package;

    let plat_name = plat_name.map(str::to_string).or_else(env_vars::plat_name);
    let tag = wheel_tag(output.interpreter.as_ref(), plat_name.as_deref());
    let dist_dir = output
        .config
        .dist_dir(&output.project_root, dist_dir, &output.defaults);

    let wheel = WheelBuilder::new(&package.name, &package.version, tag)
        .summary(package.summary.as_deref())
        .requires_python(package.requires_python.as_deref())
        .build(&output.build_lib, &dist_dir)
        .with_context(|| format!("Failed to write wheel into {}", dist_dir.display()))?;

    println!("Created {}", wheel.display());
    Ok(())
}

/// Tag for the wheel: the interpreter's default rewritten to the stable ABI,
/// or `py3-none-any` when nothing was compiled
fn wheel_tag(info: Option<&InterpreterInfo>, plat_name: Option<&str>) -> TagTriple {
    info.map_or_else(TagTriple::pure, |info| {
        WheelTagRewriter::default().rewrite(TagTriple::for_interpreter(info, plat_name))
    })
}
