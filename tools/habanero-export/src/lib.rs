//! habanero-export library
//!
//! Converts a normalized 3D scene (meshes, vertex groups, materials,
//! armatures and sampled clips) into Habanero engine binary assets
//! (.smf/.tmf, .saf, .mtf) plus the `i2n` id index.

pub mod animation;
pub mod context;
pub mod error;
pub mod formats;
pub mod index;
mod intern;
pub mod manifest;
pub mod material;
pub mod mesh;
pub mod scene;
pub mod skeleton;

// Re-export the binary contract shared with engine-side loaders
pub use habanero_common::{FileFormat, HABANERO_FORMAT};

// Re-export key types for running an export
pub use context::{ExportContext, ExportMode, ExportOptions, ExportReport, export_scene};
pub use error::{ExportError, Result};
pub use scene::{Scene, load_scene};
