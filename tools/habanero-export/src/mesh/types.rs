//! Types and constants for mesh building

use glam::{Vec2, Vec3};

/// Joint influences stored per vertex.
pub const MAX_INFLUENCES: usize = 4;

/// Joint id written into unused influence slots (always with weight 0).
pub const NEUTRAL_JOINT: u32 = 0;

/// Exactly four (joint, weight) pairs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkinBinding {
    pub joints: [u32; MAX_INFLUENCES],
    pub weights: [f32; MAX_INFLUENCES],
}

impl SkinBinding {
    /// All slots neutral, zero weight.
    pub const UNBOUND: Self = Self {
        joints: [NEUTRAL_JOINT; MAX_INFLUENCES],
        weights: [0.0; MAX_INFLUENCES],
    };

    /// Iterate (joint, weight) pairs in slot order.
    pub fn pairs(&self) -> impl Iterator<Item = (u32, f32)> + '_ {
        self.joints.iter().copied().zip(self.weights.iter().copied())
    }
}

/// One emitted vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub id: u32,
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
    pub skin: SkinBinding,
}

/// Index list rendered with one material.
#[derive(Debug, Clone, PartialEq)]
pub struct SubMesh {
    /// 1-based material id
    pub material_id: u32,
    pub indices: Vec<u32>,
}

impl SubMesh {
    pub fn new(material_id: u32) -> Self {
        Self {
            material_id,
            indices: Vec::new(),
        }
    }
}

/// Vertices and submeshes of the whole export.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub submeshes: Vec<SubMesh>,
}

impl Mesh {
    /// Append a vertex and return its id.
    pub fn push_vertex(&mut self, position: Vec3, normal: Vec3, uv: Vec2, skin: SkinBinding) -> u32 {
        let id = self.vertices.len() as u32;
        self.vertices.push(Vertex {
            id,
            position,
            normal,
            uv,
            skin,
        });
        id
    }

    /// Submesh drawn with `material_id`.
    pub fn submesh_mut(&mut self, material_id: u32) -> Option<&mut SubMesh> {
        self.submeshes
            .iter_mut()
            .find(|s| s.material_id == material_id)
    }

    pub fn index_count(&self) -> usize {
        self.submeshes.iter().map(|s| s.indices.len()).sum()
    }
}
