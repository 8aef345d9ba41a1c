//! nether-anim - animation retarget tool
//!
//! Converts ssbh_data animation JSON (.nuanmb exports) into Maya ASCII .anim
//! curves, using the matching skeleton JSON for bone order and hierarchy.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use nether_anim::{animation, convert, manifest, skeleton};

#[derive(Parser)]
#[command(name = "nether-anim")]
#[command(about = "Nethercore animation retarget tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an animation to a Maya .anim file
    Convert {
        /// Input animation JSON (exported from ssbh_data)
        animation: PathBuf,

        /// Input skeleton JSON, used for bone order and hierarchy
        skeleton: PathBuf,

        /// Output .anim file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Target frame rate (default: 29.97)
        #[arg(long)]
        fps: Option<f64>,

        /// Keep the source frame rate
        #[arg(long)]
        no_fps_conversion: bool,

        /// Frame rate the animation was sampled at (default: 60)
        #[arg(long)]
        source_fps: Option<f64>,

        /// mayaVersion header value (default: 2020)
        #[arg(long)]
        maya_version: Option<String>,

        /// Fail on degenerate rotations instead of substituting identity
        #[arg(long)]
        strict: bool,

        /// Path to retarget.toml
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// List skeleton bones in hierarchy order
    Bones {
        /// Input skeleton JSON
        skeleton: PathBuf,
    },

    /// List animated bones in an animation
    Tracks {
        /// Input animation JSON
        animation: PathBuf,

        /// Frame rate the animation was sampled at (default: 60)
        #[arg(long)]
        source_fps: Option<f64>,
    },

    /// Validate a retarget.toml without converting
    Check {
        /// Path to retarget.toml
        #[arg(default_value = "retarget.toml")]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match &cli.command {
        Commands::Convert { verbose: true, .. } => tracing::Level::DEBUG,
        _ => tracing::Level::INFO,
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    match cli.command {
        Commands::Convert {
            animation,
            skeleton,
            output,
            fps,
            no_fps_conversion,
            source_fps,
            maya_version,
            strict,
            config,
            verbose: _,
        } => {
            let output = output.unwrap_or_else(|| animation.with_extension("anim"));
            tracing::info!("Converting {:?} -> {:?}", animation, output);

            let options = convert::ConvertOptions {
                fps,
                no_fps_conversion,
                source_fps,
                maya_version,
                strict,
                config,
            };
            convert::convert(&animation, &skeleton, &output, &options)?;
            tracing::info!("Done!");
        }

        Commands::Bones { skeleton } => {
            skeleton::list_bones(&skeleton)?;
        }

        Commands::Tracks {
            animation,
            source_fps,
        } => {
            let source_rate = source_fps.unwrap_or(nethercore_retarget::DEFAULT_SOURCE_RATE);
            animation::list_tracks(&animation, source_rate)?;
        }

        Commands::Check { config } => {
            tracing::info!("Checking config {:?}", config);
            let manifest = manifest::RetargetManifest::load(&config)?;
            manifest.validate()?;
            tracing::info!(
                "Config is valid: {} fps -> {} fps, Maya {}",
                manifest.input.source_rate,
                manifest.target_rate(),
                manifest.output.maya_version
            );
        }
    }

    Ok(())
}
