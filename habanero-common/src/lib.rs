//! Shared types and utilities for Habanero engine assets
//!
//! This crate provides the binary contract shared between:
//! - `habanero-export` (asset exporter)
//! - engine-side loaders and inspection tools
//!
//! # Modules
//!
//! - [`encoding`] - Little-endian encoding of vector/quaternion/color values
//! - [`formats`] - File magics, extensions and fixed-size record layouts

pub mod encoding;
pub mod formats;

pub use encoding::{Color, LeEncode, POSE_EPSILON, approx_eq};

pub use formats::{
    AABB_VOLUME_TYPE, BinarySerializable, BoundingVolumeRecord, FileFormat, HABANERO_FORMAT,
    JointRecord, KeyframeRecord, MATERIAL_SLOT_COUNT, MaterialHeader, MeshHeader, NO_PARENT,
    POSE_SIZE, SKELETON_SCHEMA_ID, SKINNED_MESH_VERSION, SKINNED_VERTEX_SIZE, STATIC_VERTEX_SIZE,
    SkeletonHeader, SubMeshHeader,
};
