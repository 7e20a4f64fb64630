//! Wheelwright command-line interface
//!
//! Builds stable-ABI Python wheels for generated tree-sitter parsers

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::process;

/// Display an error with optional backtrace information
fn display_error(err: &anyhow::Error, backtrace_enabled: bool) {
    eprintln!("error: {err}");

    // Show error chain
    let mut source = err.source();
    while let Some(err) = source {
        eprintln!("caused by: {err}");
        source = err.source();
    }

    // Show backtrace if enabled
    if backtrace_enabled {
        let backtrace = err.backtrace();
        if backtrace.status() == std::backtrace::BacktraceStatus::Captured {
            eprintln!("\nBacktrace:");
            eprintln!("{backtrace}");
        }
    }
}

#[derive(Parser)]
#[command(name = "wheelwright")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Build stable-ABI Python wheels for tree-sitter grammars",
    long_about = None
)]
pub(crate) struct Cli {
    /// Print debug output to stderr
    #[arg(long, global = true)]
    debug: bool,

    /// Show stack backtrace on errors (requires `RUST_BACKTRACE=1`)
    #[arg(long, global = true)]
    backtrace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile the native modules and stage the package
    Build {
        /// Project directory containing wheelwright.toml
        #[arg(long, default_value = ".")]
        project: PathBuf,

        /// Staging directory (default: build)
        #[arg(long)]
        build_dir: Option<PathBuf>,

        /// Python interpreter to build against
        #[arg(long)]
        python: Option<String>,

        /// Print each build step and the compiler command lines
        #[arg(long)]
        verbose: bool,
    },

    /// Build, then pack the staged tree into a wheel
    BdistWheel {
        /// Project directory containing wheelwright.toml
        #[arg(long, default_value = ".")]
        project: PathBuf,

        /// Staging directory (default: build)
        #[arg(long)]
        build_dir: Option<PathBuf>,

        /// Directory the wheel is written to (default: dist)
        #[arg(long)]
        dist_dir: Option<PathBuf>,

        /// Platform tag to use instead of the interpreter's (e.g. `manylinux2014_x86_64`)
        #[arg(long)]
        plat_name: Option<String>,

        /// Python interpreter to build against
        #[arg(long)]
        python: Option<String>,

        /// Print each build step and the compiler command lines
        #[arg(long)]
        verbose: bool,
    },

    /// Print the stable-ABI wheel tag
    Tag {
        /// Rewrite this tag instead of the interpreter's default (e.g. `cp312-cp312-linux_x86_64`)
        #[arg(long = "from", value_name = "PY-ABI-PLAT")]
        from: Option<String>,

        /// Platform tag to use instead of the interpreter's
        #[arg(long)]
        plat_name: Option<String>,

        /// Python interpreter to query
        #[arg(long)]
        python: Option<String>,
    },

    /// Show platform, compiler and interpreter information
    Platform {
        /// Python interpreter to query
        #[arg(long)]
        python: Option<String>,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize debug mode
    wheelwright::init_debug(cli.debug);
    let backtrace = cli.backtrace;

    let result = match cli.command {
        Commands::Build {
            project,
            build_dir,
            python,
            verbose,
        } => commands::build::run(&commands::build::BuildArgs {
            project,
            build_dir,
            python,
            verbose,
        }),
        Commands::BdistWheel {
            project,
            build_dir,
            dist_dir,
            plat_name,
            python,
            verbose,
        } => commands::bdist_wheel::run(
            &commands::build::BuildArgs {
                project,
                build_dir,
                python,
                verbose,
            },
            dist_dir.as_deref(),
            plat_name.as_deref(),
        ),
        Commands::Tag {
            from,
            plat_name,
            python,
        } => commands::tag::run(from.as_deref(), plat_name.as_deref(), python.as_deref()),
        Commands::Platform { python } => commands::platform::run(python.as_deref()),
        Commands::Completion { shell } => commands::completion::run(shell),
    };

    if let Err(e) = result {
        // Display error with formatting
        display_error(&e, backtrace);
        process::exit(1);
    }
}

mod commands;
