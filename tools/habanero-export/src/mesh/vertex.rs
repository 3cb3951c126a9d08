//! Vertex identity resolution
//!
//! One emitted vertex per source vertex and distinct UV. The first face
//! corner that touches a source vertex creates it with that corner's UV;
//! later corners with a matching UV reuse it, others get a clone that shares
//! position, normal and skin but carries its own UV and id.

use glam::{Vec2, Vec3};
use hashbrown::HashMap;
use hashbrown::hash_map::Entry;

use super::bounds::BoundingVolume;
use super::types::{Mesh, SkinBinding};
use crate::error::Result;
use habanero_common::approx_eq;

/// Bit pattern of a UV, used to key the clone cache.
type UvKey = [u32; 2];

fn uv_key(uv: Vec2) -> UvKey {
    // +0.0 folds -0.0 into 0.0
    [(uv.x + 0.0).to_bits(), (uv.y + 0.0).to_bits()]
}

fn uv_matches(a: Vec2, b: Vec2) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

#[derive(Debug)]
struct SourceSlot {
    /// Id of the vertex created on first reference
    original: u32,
    clones: HashMap<UvKey, u32>,
}

/// Maps (object, source vertex) to emitted vertex ids for one export.
#[derive(Debug, Default)]
pub struct VertexIdentity {
    slots: HashMap<(usize, u32), SourceSlot>,
    clone_count: usize,
}

impl VertexIdentity {
    /// Resolve the emitted vertex for one face corner.
    ///
    /// `create` supplies (position, normal, skin) the first time a source
    /// vertex is seen. Every emitted vertex is appended to `mesh` and folded
    /// into `bounds`.
    pub fn resolve(
        &mut self,
        mesh: &mut Mesh,
        bounds: &mut BoundingVolume,
        object: usize,
        source: u32,
        uv: Vec2,
        create: impl FnOnce() -> Result<(Vec3, Vec3, SkinBinding)>,
    ) -> Result<u32> {
        match self.slots.entry((object, source)) {
            Entry::Vacant(entry) => {
                let (position, normal, skin) = create()?;
                let id = mesh.push_vertex(position, normal, uv, skin);
                bounds.update(position);
                entry.insert(SourceSlot {
                    original: id,
                    clones: HashMap::new(),
                });
                Ok(id)
            }
            Entry::Occupied(entry) => {
                let slot = entry.into_mut();
                let original = mesh.vertices[slot.original as usize];
                if uv_matches(original.uv, uv) {
                    return Ok(slot.original);
                }

                let key = uv_key(uv);
                if let Some(&clone) = slot.clones.get(&key) {
                    return Ok(clone);
                }

                let id = mesh.push_vertex(original.position, original.normal, uv, original.skin);
                bounds.update(original.position);
                slot.clones.insert(key, id);
                self.clone_count += 1;
                tracing::trace!(
                    "Cloned vertex {} -> {} for uv ({}, {})",
                    original.id,
                    id,
                    uv.x,
                    uv.y
                );
                Ok(id)
            }
        }
    }

    /// Number of clones created so far.
    pub fn clone_count(&self) -> usize {
        self.clone_count
    }
}

/// Log emitted vertices that share both position and UV.
///
/// These are legal (distinct source vertices may coincide) but usually point
/// at unwelded geometry in the source scene.
pub fn report_duplicates(mesh: &Mesh) -> usize {
    let mut seen: HashMap<([u32; 3], UvKey), u32> = HashMap::new();
    let mut duplicates = 0;
    for vertex in &mesh.vertices {
        let p = vertex.position;
        let key = (
            [
                (p.x + 0.0).to_bits(),
                (p.y + 0.0).to_bits(),
                (p.z + 0.0).to_bits(),
            ],
            uv_key(vertex.uv),
        );
        if let Some(&first) = seen.get(&key) {
            duplicates += 1;
            tracing::debug!("Duplicated vertex {} (same position and uv as {})", vertex.id, first);
        } else {
            seen.insert(key, vertex.id);
        }
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(
        identity: &mut VertexIdentity,
        mesh: &mut Mesh,
        bounds: &mut BoundingVolume,
        source: u32,
        uv: [f32; 2],
    ) -> u32 {
        identity
            .resolve(mesh, bounds, 0, source, Vec2::from_array(uv), || {
                Ok((
                    Vec3::new(source as f32, 1.0, 2.0),
                    Vec3::Z,
                    SkinBinding {
                        joints: [2, 0, 0, 0],
                        weights: [1.0, 0.0, 0.0, 0.0],
                    },
                ))
            })
            .unwrap()
    }

    #[test]
    fn test_same_uv_reuses_vertex() {
        let (mut identity, mut mesh, mut bounds): (VertexIdentity, Mesh, BoundingVolume) =
            Default::default();
        let a = resolve(&mut identity, &mut mesh, &mut bounds, 0, [0.2, 0.3]);
        let b = resolve(&mut identity, &mut mesh, &mut bounds, 0, [0.2, 0.3]);
        assert_eq!(a, b);
        assert_eq!(mesh.vertices.len(), 1);
    }

    #[test]
    fn test_conflicting_uv_clones_vertex() {
        let (mut identity, mut mesh, mut bounds): (VertexIdentity, Mesh, BoundingVolume) =
            Default::default();
        let a = resolve(&mut identity, &mut mesh, &mut bounds, 0, [0.2, 0.3]);
        let b = resolve(&mut identity, &mut mesh, &mut bounds, 0, [0.8, 0.1]);

        assert_ne!(a, b);
        assert_eq!(mesh.vertices.len(), 2);
        let (va, vb) = (mesh.vertices[a as usize], mesh.vertices[b as usize]);
        assert_eq!(va.position, vb.position);
        assert_eq!(va.normal, vb.normal);
        assert_eq!(va.skin, vb.skin);
        assert_eq!(vb.uv, Vec2::new(0.8, 0.1));
        assert_eq!(identity.clone_count(), 1);
    }

    #[test]
    fn test_clone_cache_prevents_duplicate_clones() {
        let (mut identity, mut mesh, mut bounds): (VertexIdentity, Mesh, BoundingVolume) =
            Default::default();
        resolve(&mut identity, &mut mesh, &mut bounds, 0, [0.2, 0.3]);
        let first = resolve(&mut identity, &mut mesh, &mut bounds, 0, [0.8, 0.1]);
        let again = resolve(&mut identity, &mut mesh, &mut bounds, 0, [0.8, 0.1]);
        let original = resolve(&mut identity, &mut mesh, &mut bounds, 0, [0.2, 0.3]);

        assert_eq!(first, again);
        assert_eq!(original, 0);
        assert_eq!(mesh.vertices.len(), 2);
    }

    #[test]
    fn test_zero_uv_is_a_real_assignment() {
        let (mut identity, mut mesh, mut bounds): (VertexIdentity, Mesh, BoundingVolume) =
            Default::default();
        let a = resolve(&mut identity, &mut mesh, &mut bounds, 0, [0.0, 0.0]);
        let b = resolve(&mut identity, &mut mesh, &mut bounds, 0, [0.5, 0.5]);
        assert_ne!(a, b);
        assert_eq!(mesh.vertices[a as usize].uv, Vec2::ZERO);
    }

    #[test]
    fn test_ids_follow_first_reference_order() {
        let (mut identity, mut mesh, mut bounds): (VertexIdentity, Mesh, BoundingVolume) =
            Default::default();
        assert_eq!(resolve(&mut identity, &mut mesh, &mut bounds, 5, [0.0; 2]), 0);
        assert_eq!(resolve(&mut identity, &mut mesh, &mut bounds, 2, [0.0; 2]), 1);
        assert_eq!(resolve(&mut identity, &mut mesh, &mut bounds, 5, [1.0; 2]), 2);
        assert_eq!(bounds.max.x, 5.0);
        assert_eq!(bounds.min.x, 2.0);
    }

    #[test]
    fn test_report_duplicates() {
        let mut mesh = Mesh::default();
        let skin = SkinBinding::UNBOUND;
        mesh.push_vertex(Vec3::ONE, Vec3::Z, Vec2::ZERO, skin);
        mesh.push_vertex(Vec3::ONE, Vec3::X, Vec2::ZERO, skin);
        mesh.push_vertex(Vec3::ONE, Vec3::Z, Vec2::ONE, skin);
        assert_eq!(report_duplicates(&mesh), 1);
    }
}
