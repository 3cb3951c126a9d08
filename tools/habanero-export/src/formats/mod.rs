//! Binary encoders for Habanero asset files
//!
//! Record layouts and constants come from `habanero_common::formats`.
//! Encoders never mutate their inputs.

pub use habanero_common::formats::*;

use habanero_common::{Color, LeEncode};
use std::io::{self, Write};

use crate::material::{Material, MaterialSlot};
use crate::mesh::{BoundingVolume, Mesh, SubMesh, Vertex};
use crate::skeleton::Skeleton;

fn encode_vertex_static(vertex: &Vertex, out: &mut Vec<u8>) {
    vertex.position.encode(out);
    vertex.normal.encode(out);
    vertex.uv.encode(out);
}

fn encode_vertex_skinned(vertex: &Vertex, out: &mut Vec<u8>) {
    encode_vertex_static(vertex, out);
    for joint in vertex.skin.joints {
        joint.encode(out);
    }
    for weight in vertex.skin.weights {
        weight.encode(out);
    }
}

fn encode_submesh(submesh: &SubMesh, out: &mut Vec<u8>) {
    let header = SubMeshHeader::new(submesh.material_id, submesh.indices.len() as u32);
    out.extend_from_slice(&header.to_bytes());
    for index in &submesh.indices {
        index.encode(out);
    }
}

fn encode_mesh(mesh: &Mesh, bounds: &BoundingVolume, skinned: bool) -> Vec<u8> {
    let vertex_count = mesh.vertices.len() as u32;
    let submesh_count = mesh.submeshes.len() as u32;
    let header = if skinned {
        MeshHeader::skinned(vertex_count, submesh_count)
    } else {
        MeshHeader::static_topology(vertex_count, submesh_count)
    };

    let mut out = Vec::with_capacity(
        header.size()
            + mesh.vertices.len() * header.vertex_size()
            + mesh
                .submeshes
                .iter()
                .map(|s| SubMeshHeader::SIZE + s.indices.len() * 4)
                .sum::<usize>()
            + BoundingVolumeRecord::SIZE,
    );
    out.extend_from_slice(&header.to_bytes());

    for vertex in &mesh.vertices {
        if skinned {
            encode_vertex_skinned(vertex, &mut out);
        } else {
            encode_vertex_static(vertex, &mut out);
        }
    }
    for submesh in &mesh.submeshes {
        encode_submesh(submesh, &mut out);
    }
    out.extend_from_slice(&bounds.to_record().to_bytes());
    out
}

/// Encode a skinned mesh file (.smf)
pub fn encode_skinned_mesh(mesh: &Mesh, bounds: &BoundingVolume) -> Vec<u8> {
    encode_mesh(mesh, bounds, true)
}

/// Encode a static topology mesh file (.tmf): same as .smf minus version and skin.
pub fn encode_static_mesh(mesh: &Mesh, bounds: &BoundingVolume) -> Vec<u8> {
    encode_mesh(mesh, bounds, false)
}

/// Encode a skeleton + animation file (.saf)
pub fn encode_skeleton(skeleton: &Skeleton) -> Vec<u8> {
    let header = SkeletonHeader {
        joint_count: skeleton.joints.len() as u32,
        animation_count: skeleton.animations.len() as u32,
        schema_id: skeleton.schema_id,
    };

    let mut out = Vec::new();
    out.extend_from_slice(&header.to_bytes());

    for joint in &skeleton.joints {
        joint.parent.unwrap_or(NO_PARENT).encode(&mut out);
        joint.bind_pose.encode(&mut out);
    }

    for animation in &skeleton.animations {
        for sequence in &animation.sequences {
            (sequence.frames.len() as u32).encode(&mut out);
            for keyframe in &sequence.frames {
                keyframe.time.encode(&mut out);
                keyframe.pose.encode(&mut out);
            }
        }
    }

    out
}

/// Encode a material file (.mtf)
///
/// Slots 0..=3 are a texture id or an inline color, slot 4 a texture id or a
/// scalar, slots 5..=7 appear only when they hold a texture id.
pub fn encode_material(material: &Material) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&MaterialHeader::new(material.flags()).to_bytes());

    for (i, slot) in material.slots[SLOT_AMBIENT..=SLOT_TRANSPARENCY].iter().enumerate() {
        match slot {
            MaterialSlot::Texture(id) => id.encode(&mut out),
            MaterialSlot::Inline(value) => value.encode(&mut out),
            MaterialSlot::Empty if i == SLOT_TRANSPARENCY => 0f32.encode(&mut out),
            MaterialSlot::Empty => Color::new(0.0, 0.0, 0.0, 0.0).encode(&mut out),
        }
    }

    for slot in &material.slots[SLOT_NORMAL..SERIALIZED_SLOT_COUNT] {
        if let Some(id) = slot.texture_id() {
            id.encode(&mut out);
        }
    }

    out
}

/// Write a complete skinned mesh file
pub fn write_skinned_mesh<W: Write>(w: &mut W, mesh: &Mesh, bounds: &BoundingVolume) -> io::Result<()> {
    w.write_all(&encode_skinned_mesh(mesh, bounds))
}

/// Write a complete static mesh file
pub fn write_static_mesh<W: Write>(w: &mut W, mesh: &Mesh, bounds: &BoundingVolume) -> io::Result<()> {
    w.write_all(&encode_static_mesh(mesh, bounds))
}

/// Write a complete skeleton file
pub fn write_skeleton<W: Write>(w: &mut W, skeleton: &Skeleton) -> io::Result<()> {
    w.write_all(&encode_skeleton(skeleton))
}

/// Write a complete material file
pub fn write_material<W: Write>(w: &mut W, material: &Material) -> io::Result<()> {
    w.write_all(&encode_material(material))
}
