//! habanero-export - Habanero asset export tool
//!
//! Converts scene documents (.json/.toml) to Habanero binary assets
//! (.smf/.tmf, .saf, .mtf, i2n)

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use habanero_export::{ExportMode, ExportOptions, HABANERO_FORMAT, export_scene, load_scene, manifest};

#[derive(Parser)]
#[command(name = "habanero-export")]
#[command(about = "Habanero asset export tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a single scene
    Export {
        /// Input scene document (.json or .toml)
        scene: PathBuf,

        /// Output mesh file (.smf, or .tmf with --static)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write a static topology mesh (.tmf) without skeleton
        #[arg(short, long = "static")]
        static_mesh: bool,

        /// Keep every sampled keyframe
        #[arg(long)]
        no_optimize: bool,
    },

    /// Build scenes from a manifest file
    Build {
        /// Path to habanero.toml manifest
        #[arg(default_value = "habanero.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate manifest without building
    Check {
        /// Path to habanero.toml manifest
        #[arg(default_value = "habanero.toml")]
        manifest: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Export {
            scene,
            output,
            static_mesh,
            no_optimize,
        } => {
            let options = ExportOptions {
                mode: if static_mesh {
                    ExportMode::Static
                } else {
                    ExportMode::Skinned
                },
                optimize: !no_optimize,
            };
            let ext = match options.mode {
                ExportMode::Skinned => HABANERO_FORMAT.skinned_mesh_ext,
                ExportMode::Static => HABANERO_FORMAT.static_mesh_ext,
            };
            let output = output.unwrap_or_else(|| scene.with_extension(ext));
            tracing::info!("Exporting {:?} -> {:?}", scene, output);

            let document = load_scene(&scene)?;
            let report = export_scene(&document, &output, options)?;
            let written = report.into_result()?;
            tracing::info!("Done! {} files written", written.len());
        }

        Commands::Build { manifest, output } => {
            tracing::info!("Building scenes from {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            manifest::build_all(&config, output.as_deref())?;
            tracing::info!("Build complete!");
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            manifest::validate(&config)?;
            tracing::info!("Manifest is valid!");
        }
    }

    Ok(())
}
