//! Platform command
//!
//! Display platform, compiler and interpreter information

use anyhow::Result;
use wheelwright::extensions::c_extension::HOST_TARGET;
use wheelwright::platform::fallback_platform_tag;
use wheelwright::{
    CExtensionBuilder, Interpreter, PlatformFamily, TagTriple, WheelTagRewriter, env_vars,
};

/// Display build platform information
#[allow(
    clippy::unnecessary_wraps,
    reason = "Maintains consistent API with other commands"
)]
pub(crate) fn run(python: Option<&str>) -> Result<()> {
    let family = PlatformFamily::current();

    println!("Platform Information:");
    println!();
    println!("  Family:       {family}");
    println!("  Target:       {HOST_TARGET}");
    println!("  C flags:      {}", family.dialect_flags().join(" "));
    println!("  Module:       <name>{}", family.stable_abi_suffix());

    match CExtensionBuilder::new(false).resolve_compiler() {
        Ok(tool) => println!("  Compiler:     {}", tool.path().display()),
        Err(e) => println!("  Compiler:     (not found: {e})"),
    }
    if let Some(cc) = env_vars::cc() {
        println!("  CC:           {cc}");
    }

    println!();
    println!("Python Information:");

    // A missing interpreter is reported, not fatal
    let info = Interpreter::locate(python).and_then(|interpreter| interpreter.introspect());
    match info {
        Ok(info) => {
            let default = TagTriple::for_interpreter(&info, env_vars::plat_name().as_deref());
            println!("  Implementation: {} ({})", info.implementation, info.family());
            println!("  Version:        {}", info.version());
            println!("  Include:        {}", info.include_dir.display());
            println!("  Default tag:    {default}");
            println!(
                "  Wheel tag:      {}",
                WheelTagRewriter::default().rewrite(default)
            );
        }
        Err(e) => {
            println!("  (not detected: {e})");
            println!("  Platform tag:   {}", fallback_platform_tag());
        }
    }

    Ok(())
}
