//! Habanero binary asset formats
//!
//! Every file starts with a 4-byte ASCII magic. All integers are u32
//! little-endian unless noted, floats are f32.
//!
//! File-level constants (magics, extensions) live in [`FileFormat`]; use
//! [`HABANERO_FORMAT`] for the values written by the exporter.
//!
//! Fixed-size records implement [`BinarySerializable`].

pub mod bounds;
pub mod material;
pub mod mesh;
mod serialization;
pub mod skeleton;

pub use bounds::*;
pub use material::*;
pub use mesh::*;
pub use serialization::BinarySerializable;
pub use skeleton::*;

/// File format constants for the Habanero engine.
///
/// Single source of truth for magics and extensions of every exported file.
#[derive(Debug, Clone, Copy)]
pub struct FileFormat {
    /// Skinned mesh magic (`SMF2`)
    pub skinned_mesh_magic: &'static [u8; 4],
    /// Static/topology mesh magic (`TMF2`)
    pub static_mesh_magic: &'static [u8; 4],
    /// Skeleton + animation magic (`SAF2`)
    pub skeleton_magic: &'static [u8; 4],
    /// Material magic (`MTF2`)
    pub material_magic: &'static [u8; 4],

    /// Skinned mesh extension without dot
    pub skinned_mesh_ext: &'static str,
    /// Static mesh extension without dot
    pub static_mesh_ext: &'static str,
    /// Skeleton extension without dot
    pub skeleton_ext: &'static str,
    /// Material extension without dot
    pub material_ext: &'static str,
    /// File name of the index manifest (no extension)
    pub index_file_name: &'static str,
}

/// Habanero (second revision) file format constants.
pub const HABANERO_FORMAT: FileFormat = FileFormat {
    skinned_mesh_magic: b"SMF2",
    static_mesh_magic: b"TMF2",
    skeleton_magic: b"SAF2",
    material_magic: b"MTF2",
    skinned_mesh_ext: "smf",
    static_mesh_ext: "tmf",
    skeleton_ext: "saf",
    material_ext: "mtf",
    index_file_name: "i2n",
};

/// Read a little-endian u32 at `offset`. Caller checks bounds.
#[inline]
pub(crate) fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

/// Read a little-endian f32 at `offset`. Caller checks bounds.
#[inline]
pub(crate) fn read_f32(bytes: &[u8], offset: usize) -> f32 {
    f32::from_bits(read_u32(bytes, offset))
}
