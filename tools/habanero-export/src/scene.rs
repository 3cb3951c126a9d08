//! Scene provider records
//!
//! The exporter core never talks to an authoring tool. It consumes a
//! normalized scene: triangulated mesh objects with per-vertex group weights,
//! a material library, and armatures with sampled pose clips. Scenes are
//! loaded from JSON or TOML documents.

use anyhow::{Context, Result, bail};
use glam::{Mat4, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A complete scene handed to the exporter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    /// Material library, referenced by name from objects
    #[serde(default)]
    pub materials: Vec<MaterialDesc>,
    /// Mesh objects in export order
    #[serde(default)]
    pub objects: Vec<MeshObject>,
    /// Armatures in export order
    #[serde(default)]
    pub armatures: Vec<Armature>,
}

impl Scene {
    pub fn material(&self, name: &str) -> Option<&MaterialDesc> {
        self.materials.iter().find(|m| m.name == name)
    }
}

/// Non-textured material properties plus bound texture slots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialDesc {
    pub name: String,
    #[serde(default)]
    pub ambient: f32,
    #[serde(default = "default_white")]
    pub diffuse_color: [f32; 3],
    #[serde(default = "default_white")]
    pub specular_color: [f32; 3],
    #[serde(default = "default_one")]
    pub specular_alpha: f32,
    #[serde(default)]
    pub emit: f32,
    #[serde(default = "default_one")]
    pub alpha: f32,
    #[serde(default)]
    pub textures: Vec<TextureSlot>,
}

/// One texture and the material channels it drives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextureSlot {
    /// Image path as authored (a leading `//` marks a blend-relative path)
    pub path: String,
    #[serde(default)]
    pub maps: Vec<TextureMap>,
}

/// Material channel a texture can be mapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextureMap {
    Ambient,
    Diffuse,
    Specular,
    Transparency,
    Normal,
    Displacement,
    Gloss,
}

/// A triangulated mesh object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshObject {
    pub name: String,
    /// Column-major object-to-world matrix
    #[serde(default = "identity_matrix")]
    pub transform: [f32; 16],
    /// Bone the whole object is parented to, used for vertices without weights
    #[serde(default)]
    pub parent_bone: Option<String>,
    /// Vertex group names, indexed by `GroupWeight::group`
    #[serde(default)]
    pub vertex_groups: Vec<String>,
    /// Material slot names, indexed by `Face::material`
    #[serde(default)]
    pub materials: Vec<String>,
    pub vertices: Vec<SourceVertex>,
    #[serde(default)]
    pub faces: Vec<Face>,
}

impl MeshObject {
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_cols_array(&self.transform)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceVertex {
    pub position: [f32; 3],
    #[serde(default = "default_up")]
    pub normal: [f32; 3],
    #[serde(default)]
    pub groups: Vec<GroupWeight>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GroupWeight {
    pub group: u32,
    pub weight: f32,
}

/// A triangle. UVs are already flipped into engine convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Face {
    #[serde(default)]
    pub material: usize,
    pub corners: [Corner; 3],
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Corner {
    pub vertex: u32,
    #[serde(default)]
    pub uv: [f32; 2],
}

impl Corner {
    pub fn uv(&self) -> Vec2 {
        Vec2::from_array(self.uv)
    }
}

/// An armature: bone hierarchy plus sampled clips.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Armature {
    pub name: String,
    /// Column-major armature object-to-world matrix
    #[serde(default = "identity_matrix")]
    pub transform: [f32; 16],
    #[serde(default)]
    pub bones: Vec<Bone>,
    #[serde(default)]
    pub clips: Vec<Clip>,
}

impl Armature {
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_cols_array(&self.transform)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bone {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    /// Column-major bone matrix in armature space
    #[serde(default = "identity_matrix")]
    pub matrix: [f32; 16],
}

impl Bone {
    pub fn armature_matrix(&self) -> Mat4 {
        Mat4::from_cols_array(&self.matrix)
    }
}

/// A named clip sampled at discrete times.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clip {
    pub name: String,
    #[serde(default)]
    pub frames: Vec<PoseFrame>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseFrame {
    /// Seconds from clip start
    pub time: f32,
    #[serde(default)]
    pub poses: Vec<BonePose>,
}

/// Local pose of one bone in one sampled frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BonePose {
    pub bone: String,
    /// Quaternion as [w, x, y, z]
    #[serde(default = "identity_rotation")]
    pub rotation: [f32; 4],
    #[serde(default)]
    pub translation: [f32; 3],
}

impl BonePose {
    pub fn rotation(&self) -> Quat {
        let [w, x, y, z] = self.rotation;
        Quat::from_xyzw(x, y, z, w)
    }

    pub fn translation(&self) -> Vec3 {
        Vec3::from_array(self.translation)
    }
}

fn identity_matrix() -> [f32; 16] {
    Mat4::IDENTITY.to_cols_array()
}

fn identity_rotation() -> [f32; 4] {
    [1.0, 0.0, 0.0, 0.0]
}

fn default_white() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn default_one() -> f32 {
    1.0
}

fn default_up() -> [f32; 3] {
    [0.0, 0.0, 1.0]
}

/// Load a scene document, detecting the format by extension (.json or .toml)
pub fn load_scene(path: &Path) -> Result<Scene> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scene: {:?}", path))?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    let scene: Scene = match ext.as_str() {
        "json" => serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse scene: {:?}", path))?,
        "toml" => {
            toml::from_str(&content).with_context(|| format!("Failed to parse scene: {:?}", path))?
        }
        _ => bail!("Unsupported scene format: {:?} (use .json or .toml)", path),
    };

    tracing::debug!(
        "Loaded scene {:?}: {} objects, {} materials, {} armatures",
        path,
        scene.objects.len(),
        scene.materials.len(),
        scene.armatures.len()
    );

    Ok(scene)
}
