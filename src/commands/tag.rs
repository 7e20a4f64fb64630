//! Tag command
//!
//! Print the wheel tag a build would use

use anyhow::{Context, Result};
use wheelwright::wheel::tag::normalize_platform;
use wheelwright::{TagTriple, WheelTagRewriter, env_vars};

/// Print the stable-ABI tag for an explicit triple or the interpreter's default
pub(crate) fn run(from: Option<&str>, plat_name: Option<&str>, python: Option<&str>) -> Result<()> {
    let plat_name = plat_name.map(str::to_string).or_else(env_vars::plat_name);

    let default = match from {
        Some(triple) => {
            let mut parsed: TagTriple = triple.parse().context("Invalid --from tag")?;
            if let Some(platform) = &plat_name {
                parsed.platform = normalize_platform(platform);
            }
            parsed
        }
        None => {
            let info = super::build::introspect(python)?;
            TagTriple::for_interpreter(&info, plat_name.as_deref())
        }
    };

    wheelwright::debug!("default tag {default}");
    println!("{}", WheelTagRewriter::default().rewrite(default));
    Ok(())
}
