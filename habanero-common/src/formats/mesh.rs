//! Mesh formats (.smf skinned, .tmf static topology)
//!
//! # Layout
//! ```text
//! .smf
//! 0x00: magic "SMF2"
//! 0x04: version u32 (= 1)
//! 0x08: vertex_count u32
//! 0x0C: submesh_count u32
//! 0x10: vertices (vertex_count * 64)
//! var:  submeshes (material_id u32, index_count u32, index_count * u32)
//! var:  bounding volume (25 bytes)
//!
//! .tmf
//! 0x00: magic "TMF2"
//! 0x04: vertex_count u32
//! 0x08: submesh_count u32
//! 0x0C: vertices (vertex_count * 32)
//! var:  submeshes, bounding volume (as above)
//! ```
//!
//! Skinned vertex: position f32x3, normal f32x3, uv f32x2, joints u32x4, weights f32x4.
//! Static vertex: position f32x3, normal f32x3, uv f32x2.

use super::{HABANERO_FORMAT, read_u32};

/// Version field written after the skinned mesh magic.
pub const SKINNED_MESH_VERSION: u32 = 1;

/// Bytes per skinned vertex record.
pub const SKINNED_VERTEX_SIZE: usize = 64;

/// Bytes per static vertex record.
pub const STATIC_VERTEX_SIZE: usize = 32;

/// Header of a mesh file. Skinned meshes carry a version field, static ones don't.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshHeader {
    pub skinned: bool,
    pub vertex_count: u32,
    pub submesh_count: u32,
}

impl MeshHeader {
    pub const SKINNED_SIZE: usize = 16;
    pub const STATIC_SIZE: usize = 12;

    pub fn skinned(vertex_count: u32, submesh_count: u32) -> Self {
        Self {
            skinned: true,
            vertex_count,
            submesh_count,
        }
    }

    pub fn static_topology(vertex_count: u32, submesh_count: u32) -> Self {
        Self {
            skinned: false,
            vertex_count,
            submesh_count,
        }
    }

    /// Serialized size of this header.
    pub fn size(&self) -> usize {
        if self.skinned {
            Self::SKINNED_SIZE
        } else {
            Self::STATIC_SIZE
        }
    }

    /// Bytes per vertex record following this header.
    pub fn vertex_size(&self) -> usize {
        if self.skinned {
            SKINNED_VERTEX_SIZE
        } else {
            STATIC_VERTEX_SIZE
        }
    }

    /// Write header to bytes (magic included)
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.size());
        if self.skinned {
            bytes.extend_from_slice(HABANERO_FORMAT.skinned_mesh_magic);
            bytes.extend_from_slice(&SKINNED_MESH_VERSION.to_le_bytes());
        } else {
            bytes.extend_from_slice(HABANERO_FORMAT.static_mesh_magic);
        }
        bytes.extend_from_slice(&self.vertex_count.to_le_bytes());
        bytes.extend_from_slice(&self.submesh_count.to_le_bytes());
        bytes
    }

    /// Read header from bytes, detecting the variant from the magic.
    ///
    /// Returns `None` on unknown magic, wrong version or short input.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::STATIC_SIZE {
            return None;
        }
        let magic = &bytes[0..4];
        if magic == HABANERO_FORMAT.skinned_mesh_magic {
            if bytes.len() < Self::SKINNED_SIZE || read_u32(bytes, 4) != SKINNED_MESH_VERSION {
                return None;
            }
            Some(Self::skinned(read_u32(bytes, 8), read_u32(bytes, 12)))
        } else if magic == HABANERO_FORMAT.static_mesh_magic {
            Some(Self::static_topology(
                read_u32(bytes, 4),
                read_u32(bytes, 8),
            ))
        } else {
            None
        }
    }
}

/// Header of one submesh record (followed by `index_count` u32 vertex ids).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubMeshHeader {
    pub material_id: u32,
    pub index_count: u32,
}

impl SubMeshHeader {
    pub const SIZE: usize = 8;

    pub fn new(material_id: u32, index_count: u32) -> Self {
        Self {
            material_id,
            index_count,
        }
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.material_id.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.index_count.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self::new(read_u32(bytes, 0), read_u32(bytes, 4)))
    }

    /// Size of the full record including its index list.
    pub fn record_size(&self) -> usize {
        Self::SIZE + self.index_count as usize * 4
    }
}
