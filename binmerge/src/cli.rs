//! Command line interface for binmerge

use crate::VERSION;
use crate::composer::{ImageComposer, human_size};
use crate::manifest::{BuildSystem, resolve_segments};
use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use log::LevelFilter;
use std::path::PathBuf;

/// Command line arguments for binmerge
#[derive(Parser, Debug)]
#[command(name = "binmerge")]
#[command(version = VERSION)]
#[command(
    about = "Merge partition binaries into a single flashable image",
    long_about = None
)]
pub struct Args {
    /// Build system that produced the flasher manifest
    #[arg(value_enum)]
    pub build_system: BuildSystemArg,

    /// Build directory containing the manifest
    pub build_dir: PathBuf,

    /// Output image file
    #[arg(required_unless_present = "list")]
    pub output: Option<PathBuf>,

    /// Print the image layout without writing the output
    #[arg(short, long)]
    pub list: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode - only output errors
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum BuildSystemArg {
    Cmake,
    Make,
    Custom,
}

impl From<BuildSystemArg> for BuildSystem {
    fn from(arg: BuildSystemArg) -> Self {
        match arg {
            BuildSystemArg::Cmake => Self::Cmake,
            BuildSystemArg::Make => Self::Make,
            BuildSystemArg::Custom => Self::Custom,
        }
    }
}

/// Set up `env_logger`; `RUST_LOG` takes precedence over the flags.
pub fn init_logger(verbose: bool, quiet: bool) {
    let level = if quiet {
        LevelFilter::Error
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let _ = env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .parse_default_env()
        .try_init();
}

/// Main CLI handler
pub fn run_cli(args: Args) -> anyhow::Result<()> {
    let build_system = BuildSystem::from(args.build_system);

    let segments = resolve_segments(build_system, &args.build_dir).with_context(|| {
        format!(
            "failed to resolve {} segments in {}",
            build_system,
            args.build_dir.display()
        )
    })?;

    if segments.is_empty() {
        warn!("no segments found, the image will be empty");
    }

    let composer = ImageComposer::new();

    if args.list {
        let image = composer.compose(&segments)?;
        image.layout.print_info();
        return Ok(());
    }

    let Some(output) = args.output else {
        bail!("no output file given");
    };

    let layout = composer
        .compose_to_file(&segments, &output)
        .with_context(|| format!("failed to create image {}", output.display()))?;

    if !args.quiet {
        println!(
            "{}",
            format!(
                "Image created: {} ({} segments, {})",
                output.display(),
                layout.len(),
                human_size(layout.total_size())
            )
            .green()
        );
    }

    Ok(())
}
