//! Export errors
//!
//! Structural errors abort an export before anything is written. I/O errors
//! are collected per file in [`crate::ExportReport`].

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Material '{0}' is referenced but not defined in the scene")]
    UnknownMaterial(String),

    #[error("Object '{object}' vertex {vertex} references vertex group {group}, but the object declares {count} groups")]
    UnknownGroup {
        object: String,
        vertex: u32,
        group: u32,
        count: usize,
    },

    #[error("Object '{object}' face {face} uses material slot {slot}, but the object has {count} materials")]
    MaterialSlotOutOfRange {
        object: String,
        face: usize,
        slot: usize,
        count: usize,
    },

    #[error("Object '{object}' face {face} references vertex {vertex}, but the object has {count} vertices")]
    VertexOutOfRange {
        object: String,
        face: usize,
        vertex: u32,
        count: usize,
    },

    #[error("Bone '{bone}' in armature '{armature}' has unknown parent '{parent}'")]
    UnknownParentBone {
        armature: String,
        bone: String,
        parent: String,
    },

    #[error("Clip '{clip}' poses bone '{bone}', which is not a skeleton joint")]
    UnknownBone { clip: String, bone: String },

    #[error("Vertex {vertex} references joint {joint}, but the skeleton has {count} joints")]
    DanglingJoint { vertex: u32, joint: u32, count: usize },

    #[error("Submesh {submesh} references material {material}, but {count} materials are registered")]
    DanglingMaterial {
        submesh: usize,
        material: u32,
        count: usize,
    },

    #[error("Submesh {submesh} references vertex {vertex}, but the mesh has {count} vertices")]
    DanglingVertex {
        submesh: usize,
        vertex: u32,
        count: usize,
    },

    #[error("Material name '{0}' cannot be used as a file name")]
    UnsafeMaterialName(String),

    #[error("Failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Export incomplete: {} of {total} files failed ({failed:?})", failed.len())]
    PartialExport { failed: Vec<PathBuf>, total: usize },
}

pub type Result<T> = std::result::Result<T, ExportError>;
