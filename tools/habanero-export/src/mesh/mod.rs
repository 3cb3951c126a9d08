//! Mesh assembly
//!
//! Walks every object's triangles, resolves face corners to emitted vertices
//! and sorts indices into one submesh per material.

mod bounds;
mod skin;
mod types;
mod vertex;

pub use bounds::BoundingVolume;
pub use skin::{bind_vertex, is_unbound, pack_influences};
pub use types::{MAX_INFLUENCES, Mesh, NEUTRAL_JOINT, SkinBinding, SubMesh, Vertex};
pub use vertex::{VertexIdentity, report_duplicates};

use glam::{Mat3, Vec3};

use crate::error::{ExportError, Result};
use crate::material::MaterialRegistry;
use crate::scene::{MeshObject, Scene};
use crate::skeleton::JointRegistry;

/// Accumulates the export-wide mesh across objects.
#[derive(Debug, Default)]
pub struct MeshBuilder {
    mesh: Mesh,
    bounds: BoundingVolume,
    identity: VertexIdentity,
    unbound: usize,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one object's triangles.
    ///
    /// The object's vertex groups must already be registered in `joints`.
    pub fn add_object(
        &mut self,
        object_index: usize,
        object: &MeshObject,
        scene: &Scene,
        materials: &mut MaterialRegistry,
        joints: &mut JointRegistry,
    ) -> Result<()> {
        tracing::info!(
            "Reading object '{}' ({} vertices, {} faces)",
            object.name,
            object.vertices.len(),
            object.faces.len()
        );

        // Every slot material is registered, used or not
        let mut slot_ids = Vec::with_capacity(object.materials.len());
        for name in &object.materials {
            let desc = scene
                .material(name)
                .ok_or_else(|| ExportError::UnknownMaterial(name.clone()))?;
            let (id, created) = materials.add(desc);
            if created {
                self.mesh.submeshes.push(SubMesh::new(id));
                tracing::info!("Read submesh with material {} ('{}')", id, name);
            }
            slot_ids.push(id);
        }

        let world = object.world_matrix();
        let normal_matrix = Mat3::from_mat4(world).inverse().transpose();
        let vertices_before = self.mesh.vertices.len();
        let clones_before = self.identity.clone_count();

        for (face_index, face) in object.faces.iter().enumerate() {
            let material_id =
                *slot_ids
                    .get(face.material)
                    .ok_or_else(|| ExportError::MaterialSlotOutOfRange {
                        object: object.name.clone(),
                        face: face_index,
                        slot: face.material,
                        count: slot_ids.len(),
                    })?;

            let mut triangle = [0u32; 3];
            for (corner, slot) in face.corners.iter().zip(triangle.iter_mut()) {
                let source = object.vertices.get(corner.vertex as usize).ok_or_else(|| {
                    ExportError::VertexOutOfRange {
                        object: object.name.clone(),
                        face: face_index,
                        vertex: corner.vertex,
                        count: object.vertices.len(),
                    }
                })?;

                let unbound = &mut self.unbound;
                *slot = self.identity.resolve(
                    &mut self.mesh,
                    &mut self.bounds,
                    object_index,
                    corner.vertex,
                    corner.uv(),
                    || {
                        let position = world.transform_point3(Vec3::from_array(source.position));
                        let normal = (normal_matrix * Vec3::from_array(source.normal)).normalize_or_zero();
                        let skin = bind_vertex(joints, object_index, object, corner.vertex, &source.groups)?;
                        if is_unbound(&skin) {
                            *unbound += 1;
                        }
                        Ok((position, normal, skin))
                    },
                )?;
            }

            if let Some(submesh) = self.mesh.submesh_mut(material_id) {
                submesh.indices.extend_from_slice(&triangle);
            }
        }

        tracing::info!(
            "Object '{}': {} vertices emitted ({} clones)",
            object.name,
            self.mesh.vertices.len() - vertices_before,
            self.identity.clone_count() - clones_before
        );
        Ok(())
    }

    /// Finished mesh and its bounding volume.
    pub fn finish(self) -> (Mesh, BoundingVolume) {
        tracing::info!(
            "Mesh: {} vertices, {} submeshes, {} indices",
            self.mesh.vertices.len(),
            self.mesh.submeshes.len(),
            self.mesh.index_count()
        );
        if self.unbound > 0 {
            tracing::warn!("{} vertices are not bound to any joint", self.unbound);
        }
        (self.mesh, self.bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Corner, Face, GroupWeight, MaterialDesc, SourceVertex};
    use glam::{Mat4, Vec2};

    fn material(name: &str) -> MaterialDesc {
        MaterialDesc {
            name: name.into(),
            ambient: 0.0,
            diffuse_color: [1.0; 3],
            specular_color: [1.0; 3],
            specular_alpha: 1.0,
            emit: 0.0,
            alpha: 1.0,
            textures: Vec::new(),
        }
    }

    fn vertex(position: [f32; 3]) -> SourceVertex {
        SourceVertex {
            position,
            normal: [0.0, 0.0, 1.0],
            groups: vec![GroupWeight {
                group: 0,
                weight: 1.0,
            }],
        }
    }

    fn face(material: usize, corners: [(u32, [f32; 2]); 3]) -> Face {
        Face {
            material,
            corners: corners.map(|(vertex, uv)| Corner { vertex, uv }),
        }
    }

    /// Two triangles sharing an edge; the second uses a different UV on vertex 0.
    fn quad_object() -> MeshObject {
        MeshObject {
            name: "Quad".into(),
            transform: Mat4::from_translation(Vec3::new(0.0, 0.0, 5.0)).to_cols_array(),
            parent_bone: None,
            vertex_groups: vec!["Root".into()],
            materials: vec!["Red".into(), "Blue".into()],
            vertices: vec![
                vertex([0.0, 0.0, 0.0]),
                vertex([1.0, 0.0, 0.0]),
                vertex([1.0, 1.0, 0.0]),
                vertex([0.0, 1.0, 0.0]),
            ],
            faces: vec![
                face(0, [(0, [0.0, 0.0]), (1, [1.0, 0.0]), (2, [1.0, 1.0])]),
                face(1, [(0, [0.5, 0.5]), (2, [1.0, 1.0]), (3, [0.0, 1.0])]),
            ],
        }
    }

    fn scene() -> Scene {
        Scene {
            materials: vec![material("Red"), material("Blue")],
            objects: vec![quad_object()],
            armatures: Vec::new(),
        }
    }

    fn build(scene: &Scene) -> Result<(Mesh, BoundingVolume, MaterialRegistry)> {
        let mut materials = MaterialRegistry::default();
        let mut joints = JointRegistry::default();
        let mut builder = MeshBuilder::new();
        for (i, object) in scene.objects.iter().enumerate() {
            for (g, name) in object.vertex_groups.iter().enumerate() {
                joints.register_group(i, g as u32, name);
            }
            builder.add_object(i, object, scene, &mut materials, &mut joints)?;
        }
        let (mesh, bounds) = builder.finish();
        Ok((mesh, bounds, materials))
    }

    #[test]
    fn test_submesh_per_material_and_cloning() {
        let scene = scene();
        let (mesh, bounds, materials) = build(&scene).unwrap();

        assert_eq!(materials.len(), 2);
        assert_eq!(mesh.submeshes.len(), 2);
        assert_eq!(mesh.submeshes[0].material_id, 1);
        assert_eq!(mesh.submeshes[0].indices, [0, 1, 2]);
        // Vertex 0 with a new uv is cloned as id 3; vertex 3 becomes id 4
        assert_eq!(mesh.submeshes[1].material_id, 2);
        assert_eq!(mesh.submeshes[1].indices, [3, 2, 4]);
        assert_eq!(mesh.vertices.len(), 5);
        assert_eq!(mesh.vertices[3].position, mesh.vertices[0].position);
        assert_eq!(mesh.vertices[3].uv, Vec2::new(0.5, 0.5));

        // World transform applied
        assert_eq!(bounds.min, Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 1.0, 5.0));
    }

    #[test]
    fn test_unused_material_still_registered() {
        let mut scene = scene();
        scene.materials.push(material("Green"));
        scene.objects[0].materials.push("Green".into());
        let (mesh, _, materials) = build(&scene).unwrap();

        assert_eq!(materials.len(), 3);
        assert_eq!(mesh.submeshes.len(), 3);
        assert!(mesh.submeshes[2].indices.is_empty());
    }

    #[test]
    fn test_shared_material_across_objects() {
        let mut scene = scene();
        let mut second = quad_object();
        second.name = "Quad.001".into();
        second.materials = vec!["Blue".into()];
        second.faces.truncate(1);
        scene.objects.push(second);

        let (mesh, _, materials) = build(&scene).unwrap();
        assert_eq!(materials.len(), 2);
        assert_eq!(mesh.submeshes.len(), 2);
        assert_eq!(mesh.submeshes[1].indices.len(), 6);
    }

    #[test]
    fn test_undefined_material_is_error() {
        let mut scene = scene();
        scene.objects[0].materials.push("Missing".into());
        assert!(matches!(build(&scene), Err(ExportError::UnknownMaterial(name)) if name == "Missing"));
    }

    #[test]
    fn test_out_of_range_face_references() {
        let mut scene = scene();
        scene.objects[0].faces[1].material = 7;
        assert!(matches!(
            build(&scene),
            Err(ExportError::MaterialSlotOutOfRange { slot: 7, .. })
        ));

        let mut scene = self::scene();
        scene.objects[0].faces[0].corners[2].vertex = 42;
        assert!(matches!(
            build(&scene),
            Err(ExportError::VertexOutOfRange { vertex: 42, .. })
        ));
    }

    #[test]
    fn test_normals_follow_rotation() {
        let mut scene = scene();
        scene.objects[0].transform = Mat4::from_rotation_x(std::f32::consts::FRAC_PI_2).to_cols_array();
        let (mesh, _, _) = build(&scene).unwrap();
        assert!(mesh.vertices[0].normal.abs_diff_eq(Vec3::new(0.0, -1.0, 0.0), 1e-5));
    }
}
