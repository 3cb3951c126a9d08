//! Export context and pipeline
//!
//! One [`ExportContext`] per export. It owns every registry, so ids start
//! fresh each time and repeated exports of the same scene are identical.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use habanero_common::HABANERO_FORMAT;

use crate::error::{ExportError, Result};
use crate::formats::{write_material, write_skeleton, write_skinned_mesh, write_static_mesh};
use crate::index::write_index;
use crate::material::MaterialRegistry;
use crate::mesh::{BoundingVolume, Mesh, MeshBuilder, report_duplicates};
use crate::scene::Scene;
use crate::skeleton::{JointRegistry, Skeleton};

/// Which mesh file (and whether a skeleton) is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportMode {
    /// `.smf` + `.saf`
    #[default]
    Skinned,
    /// `.tmf` only, no skeleton
    Static,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    pub mode: ExportMode,
    /// Collapse held poses in animation clips
    pub optimize: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            mode: ExportMode::Skinned,
            optimize: true,
        }
    }
}

/// Outcome of writing an export's file set.
#[derive(Debug, Default)]
pub struct ExportReport {
    pub written: Vec<PathBuf>,
    pub failed: Vec<ExportError>,
}

impl ExportReport {
    pub fn total(&self) -> usize {
        self.written.len() + self.failed.len()
    }

    /// Written paths, or [`ExportError::PartialExport`] if any file failed.
    pub fn into_result(self) -> Result<Vec<PathBuf>> {
        if self.failed.is_empty() {
            return Ok(self.written);
        }
        let total = self.total();
        let failed = self
            .failed
            .into_iter()
            .filter_map(|e| match e {
                ExportError::Io { path, .. } => Some(path),
                _ => None,
            })
            .collect();
        Err(ExportError::PartialExport { failed, total })
    }

    fn record(&mut self, path: PathBuf, result: Result<()>) {
        match result {
            Ok(()) => {
                tracing::info!("Wrote {:?}", path);
                self.written.push(path);
            }
            Err(e) => {
                tracing::error!("{}", e);
                self.failed.push(e);
            }
        }
    }
}

/// Registries and built data for a single export.
#[derive(Debug, Default)]
pub struct ExportContext {
    options: ExportOptions,
    mesh: Mesh,
    bounds: BoundingVolume,
    joints: JointRegistry,
    materials: MaterialRegistry,
    skeleton: Option<Skeleton>,
}

impl ExportContext {
    pub fn new(options: ExportOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    pub fn options(&self) -> ExportOptions {
        self.options
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn bounds(&self) -> &BoundingVolume {
        &self.bounds
    }

    pub fn joints(&self) -> &JointRegistry {
        &self.joints
    }

    pub fn materials(&self) -> &MaterialRegistry {
        &self.materials
    }

    /// `None` in static mode.
    pub fn skeleton(&self) -> Option<&Skeleton> {
        self.skeleton.as_ref()
    }

    /// Run the in-memory pipeline: groups, meshes, skeleton, validation.
    pub fn build(&mut self, scene: &Scene) -> Result<()> {
        for (i, object) in scene.objects.iter().enumerate() {
            for (group, name) in object.vertex_groups.iter().enumerate() {
                self.joints.register_group(i, group as u32, name);
            }
        }
        tracing::info!("Number of groups: {}", self.joints.len());

        let mut builder = MeshBuilder::new();
        for (i, object) in scene.objects.iter().enumerate() {
            builder.add_object(i, object, scene, &mut self.materials, &mut self.joints)?;
        }
        let (mesh, bounds) = builder.finish();
        self.mesh = mesh;
        self.bounds = bounds;

        if self.options.mode == ExportMode::Skinned {
            let skeleton = Skeleton::build(&mut self.joints, &scene.armatures, self.options.optimize)?;
            tracing::info!(
                "Skeleton: {} joints, {} animations",
                skeleton.joints.len(),
                skeleton.animations.len()
            );
            self.skeleton = Some(skeleton);
        }

        let duplicates = report_duplicates(&self.mesh);
        if duplicates > 0 {
            tracing::info!("{} duplicated vertices (same position and uv)", duplicates);
        }

        self.validate()
    }

    /// Check every cross reference before anything is written.
    pub fn validate(&self) -> Result<()> {
        if let Some(skeleton) = &self.skeleton {
            let count = skeleton.joints.len();
            for vertex in &self.mesh.vertices {
                for (joint, weight) in vertex.skin.pairs() {
                    if weight != 0.0 && joint as usize >= count {
                        return Err(ExportError::DanglingJoint {
                            vertex: vertex.id,
                            joint,
                            count,
                        });
                    }
                }
            }
        }

        if let Some(material) = self
            .materials
            .materials()
            .iter()
            .find(|m| !is_safe_file_name(&m.name))
        {
            return Err(ExportError::UnsafeMaterialName(material.name.clone()));
        }

        let vertex_count = self.mesh.vertices.len();
        for (i, submesh) in self.mesh.submeshes.iter().enumerate() {
            if !self.materials.contains_id(submesh.material_id) {
                return Err(ExportError::DanglingMaterial {
                    submesh: i,
                    material: submesh.material_id,
                    count: self.materials.len(),
                });
            }
            if let Some(&vertex) = submesh.indices.iter().find(|&&v| v as usize >= vertex_count) {
                return Err(ExportError::DanglingVertex {
                    submesh: i,
                    vertex,
                    count: vertex_count,
                });
            }
        }

        Ok(())
    }

    /// Write the file set for `output` (`<dir>/<stem>.<ext>`).
    ///
    /// Each file is written independently; a failure is recorded and the
    /// remaining files are still attempted.
    pub fn write(&self, output: &Path) -> ExportReport {
        let dir = output_dir(output);
        let stem = output
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("scene");
        let mut report = ExportReport::default();

        match &self.skeleton {
            Some(skeleton) => {
                let path = output.with_extension(HABANERO_FORMAT.skinned_mesh_ext);
                let result = write_file(&path, |w| write_skinned_mesh(w, &self.mesh, &self.bounds));
                report.record(path, result);

                let path = output.with_extension(HABANERO_FORMAT.skeleton_ext);
                let result = write_file(&path, |w| write_skeleton(w, skeleton));
                report.record(path, result);
            }
            None => {
                let path = output.with_extension(HABANERO_FORMAT.static_mesh_ext);
                let result = write_file(&path, |w| write_static_mesh(w, &self.mesh, &self.bounds));
                report.record(path, result);
            }
        }

        for material in self.materials.materials() {
            let path = dir.join(format!("{}.{}", material.name, HABANERO_FORMAT.material_ext));
            let result = write_file(&path, |w| write_material(w, material));
            report.record(path, result);
        }

        let path = dir.join(HABANERO_FORMAT.index_file_name);
        let skeleton = self.skeleton.as_ref().map(|s| (stem, s));
        let result = write_file(&path, |w| write_index(w, &self.materials, skeleton));
        report.record(path, result);

        report
    }
}

/// Whether `name` is usable as a single path component on all platforms.
fn is_safe_file_name(name: &str) -> bool {
    if name.is_empty() || name == "." || name == ".." {
        return false;
    }
    if name.ends_with('.') || name.ends_with(' ') {
        return false;
    }
    !name.chars().any(|c| {
        c.is_control() || matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|')
    })
}

fn output_dir(output: &Path) -> PathBuf {
    match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn write_file(
    path: &Path,
    write: impl FnOnce(&mut BufWriter<File>) -> io::Result<()>,
) -> Result<()> {
    let io_err = |source: io::Error| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    write(&mut writer).map_err(io_err)?;
    writer.flush().map_err(io_err)
}

/// Export `scene` to `output` in one call.
///
/// Structural problems are returned as errors before any file is touched.
/// I/O problems are reported per file in the returned [`ExportReport`].
pub fn export_scene(scene: &Scene, output: &Path, options: ExportOptions) -> Result<ExportReport> {
    tracing::info!("Saving scene to {:?}", output);
    let mut context = ExportContext::new(options);
    context.build(scene)?;

    let dir = output_dir(output);
    fs::create_dir_all(&dir).map_err(|source| ExportError::Io { path: dir, source })?;

    Ok(context.write(output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{
        Armature, Bone, BonePose, Clip, Corner, Face, GroupWeight, MaterialDesc, MeshObject,
        PoseFrame, SourceVertex,
    };
    use glam::Mat4;

    fn scene() -> Scene {
        let identity = Mat4::IDENTITY.to_cols_array();
        let corner = |vertex, uv| Corner { vertex, uv };
        Scene {
            materials: vec![MaterialDesc {
                name: "Body".into(),
                ambient: 0.2,
                diffuse_color: [0.5; 3],
                specular_color: [1.0; 3],
                specular_alpha: 1.0,
                emit: 0.0,
                alpha: 1.0,
                textures: Vec::new(),
            }],
            objects: vec![MeshObject {
                name: "Hero".into(),
                transform: identity,
                parent_bone: None,
                vertex_groups: vec!["Hip".into()],
                materials: vec!["Body".into()],
                vertices: (0..3)
                    .map(|i| SourceVertex {
                        position: [i as f32, 0.0, 0.0],
                        normal: [0.0, 1.0, 0.0],
                        groups: vec![GroupWeight {
                            group: 0,
                            weight: 1.0,
                        }],
                    })
                    .collect(),
                faces: vec![Face {
                    material: 0,
                    corners: [
                        corner(0, [0.0, 0.0]),
                        corner(1, [1.0, 0.0]),
                        corner(2, [0.0, 1.0]),
                    ],
                }],
            }],
            armatures: vec![Armature {
                name: "Rig".into(),
                transform: identity,
                bones: vec![
                    Bone {
                        name: "Root".into(),
                        parent: None,
                        matrix: identity,
                    },
                    Bone {
                        name: "Hip".into(),
                        parent: Some("Root".into()),
                        matrix: identity,
                    },
                ],
                clips: vec![Clip {
                    name: "Idle".into(),
                    frames: (0..4)
                        .map(|i| PoseFrame {
                            time: i as f32,
                            poses: vec![BonePose {
                                bone: "Hip".into(),
                                rotation: [1.0, 0.0, 0.0, 0.0],
                                translation: [0.0; 3],
                            }],
                        })
                        .collect(),
                }],
            }],
        }
    }

    #[test]
    fn test_build_skinned() {
        let mut context = ExportContext::new(ExportOptions::default());
        context.build(&scene()).unwrap();

        let skeleton = context.skeleton().unwrap();
        // Hip was registered as a group before the armature was read
        assert_eq!(skeleton.joints[0].name, "Hip");
        assert_eq!(skeleton.joints[0].parent, Some(1));
        assert_eq!(skeleton.animations[0].sequences.len(), 2);
        // Held pose collapsed
        assert_eq!(skeleton.animations[0].sequences[0].frames.len(), 1);
        assert_eq!(context.mesh().vertices.len(), 3);
    }

    #[test]
    fn test_optimize_can_be_disabled() {
        let mut context = ExportContext::new(ExportOptions {
            optimize: false,
            ..Default::default()
        });
        context.build(&scene()).unwrap();
        assert_eq!(context.skeleton().unwrap().animations[0].sequences[0].frames.len(), 4);
    }

    #[test]
    fn test_static_mode_has_no_skeleton() {
        let mut context = ExportContext::new(ExportOptions {
            mode: ExportMode::Static,
            optimize: true,
        });
        context.build(&scene()).unwrap();
        assert!(context.skeleton().is_none());
    }

    #[test]
    fn test_unknown_clip_bone_aborts_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let mut scene = scene();
        scene.armatures[0].clips[0].frames[0].poses[0].bone = "Tail".into();

        let output = dir.path().join("hero.smf");
        let err = export_scene(&scene, &output, ExportOptions::default()).unwrap_err();
        assert!(matches!(err, ExportError::UnknownBone { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn test_validate_rejects_dangling_references() {
        let mut context = ExportContext::new(ExportOptions::default());
        context.build(&scene()).unwrap();

        context.mesh.submeshes[0].indices.push(99);
        assert!(matches!(
            context.validate(),
            Err(ExportError::DanglingVertex { vertex: 99, .. })
        ));

        context.mesh.submeshes[0].indices.pop();
        let material_id = context.mesh.submeshes[0].material_id;
        let count = context.materials.len() as u32;
        for bad in [0, count + 1] {
            context.mesh.submeshes[0].material_id = bad;
            assert!(matches!(
                context.validate(),
                Err(ExportError::DanglingMaterial { submesh: 0, material, .. }) if material == bad
            ));
        }

        context.mesh.submeshes[0].material_id = material_id;
        context.mesh.vertices[0].skin.joints[0] = 7;
        assert!(matches!(
            context.validate(),
            Err(ExportError::DanglingJoint { joint: 7, .. })
        ));
    }

    #[test]
    fn test_material_names_must_be_file_names() {
        assert!(is_safe_file_name("Skin.001"));
        assert!(!is_safe_file_name("../Skin"));
        assert!(!is_safe_file_name(""));

        let mut scene = scene();
        scene.materials[0].name = "a/b".into();
        scene.objects[0].materials[0] = "a/b".into();
        let mut context = ExportContext::new(ExportOptions::default());
        assert!(matches!(
            context.build(&scene),
            Err(ExportError::UnsafeMaterialName(name)) if name == "a/b"
        ));
    }

    #[test]
    fn test_write_continues_past_failed_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the material file should go
        fs::create_dir(dir.path().join("Body.mtf")).unwrap();

        let output = dir.path().join("hero.smf");
        let report = export_scene(&scene(), &output, ExportOptions::default()).unwrap();

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.written.len(), 3);
        assert!(dir.path().join("hero.saf").exists());
        assert!(dir.path().join("i2n").exists());

        match report.into_result() {
            Err(ExportError::PartialExport { failed, total }) => {
                assert_eq!(failed, [dir.path().join("Body.mtf")]);
                assert_eq!(total, 4);
            }
            other => panic!("expected partial export, got {:?}", other),
        }
    }
}
