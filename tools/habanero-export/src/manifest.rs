//! Manifest parsing and build orchestration
//!
//! Parses habanero.toml and exports every listed scene.
//!
//! ```toml
//! [output]
//! dir = "assets/"
//!
//! [scenes]
//! hero = "scenes/hero.json"
//! crate = { path = "scenes/crate.toml", static = true }
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use habanero_common::HABANERO_FORMAT;

use crate::context::{ExportMode, ExportOptions, export_scene};
use crate::scene::load_scene;

/// Root manifest structure
#[derive(Debug, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub output: OutputConfig,
    /// Scenes by output name, exported in name order
    #[serde(default)]
    pub scenes: BTreeMap<String, SceneEntry>,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("assets/")
}

fn default_optimize() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SceneEntry {
    Simple(PathBuf),
    Detailed {
        path: PathBuf,
        #[serde(default, rename = "static")]
        static_mesh: bool,
        #[serde(default = "default_optimize")]
        optimize: bool,
    },
}

impl SceneEntry {
    pub fn path(&self) -> &Path {
        match self {
            SceneEntry::Simple(p) => p,
            SceneEntry::Detailed { path, .. } => path,
        }
    }

    pub fn options(&self) -> ExportOptions {
        match self {
            SceneEntry::Simple(_) => ExportOptions::default(),
            SceneEntry::Detailed {
                static_mesh,
                optimize,
                ..
            } => ExportOptions {
                mode: if *static_mesh {
                    ExportMode::Static
                } else {
                    ExportMode::Skinned
                },
                optimize: *optimize,
            },
        }
    }
}

/// Load and parse a manifest file
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {:?}", path))?;
    let manifest: Manifest = toml::from_str(&content)
        .with_context(|| format!("Failed to parse manifest: {:?}", path))?;
    Ok(manifest)
}

/// Validate a manifest without building
///
/// Every scene source must exist and parse.
pub fn validate(manifest: &Manifest) -> Result<()> {
    for (name, entry) in &manifest.scenes {
        if !entry.path().exists() {
            anyhow::bail!("Scene '{}' source not found: {:?}", name, entry.path());
        }
        load_scene(entry.path()).with_context(|| format!("Scene '{}' is invalid", name))?;
    }
    Ok(())
}

/// Output path of a scene: `<dir>/<name>/<name>.<smf|tmf>`
///
/// Each scene gets its own directory since material files and the index are
/// written next to the mesh.
pub fn scene_output(output_dir: &Path, name: &str, options: ExportOptions) -> PathBuf {
    let ext = match options.mode {
        ExportMode::Skinned => HABANERO_FORMAT.skinned_mesh_ext,
        ExportMode::Static => HABANERO_FORMAT.static_mesh_ext,
    };
    output_dir.join(name).join(format!("{}.{}", name, ext))
}

/// Build all scenes from a manifest
pub fn build_all(manifest: &Manifest, output_override: Option<&Path>) -> Result<()> {
    let output_dir = output_override.unwrap_or(&manifest.output.dir);
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    for (name, entry) in &manifest.scenes {
        let options = entry.options();
        let output = scene_output(output_dir, name, options);
        tracing::info!("Exporting scene: {} -> {:?}", name, output);

        let scene = load_scene(entry.path())?;
        let report = export_scene(&scene, &output, options)
            .with_context(|| format!("Failed to export scene '{}'", name))?;
        report
            .into_result()
            .with_context(|| format!("Failed to write scene '{}'", name))?;
    }

    tracing::info!("Exported {} scenes to {:?}", manifest.scenes.len(), output_dir);
    Ok(())
}
