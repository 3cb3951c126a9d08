//! Skeleton registry and hierarchy construction
//!
//! Joints live in a flat, append-only arena. Parent links are plain ids.
//! Vertex groups and armature bones correspond 1-to-1 by name, so a joint is
//! created once per distinct name no matter how many objects reference it.

use glam::{Mat4, Quat, Vec3};
use hashbrown::HashMap;
use habanero_common::{LeEncode, POSE_EPSILON, SKELETON_SCHEMA_ID};

use crate::animation::Animation;
use crate::error::{ExportError, Result};
use crate::intern::Interner;
use crate::scene::Armature;

/// Rotation + translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub rotation: Quat,
    pub translation: Vec3,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Self = Self {
        rotation: Quat::IDENTITY,
        translation: Vec3::ZERO,
    };

    pub fn new(rotation: Quat, translation: Vec3) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Rotation and translation of an affine matrix (scale is dropped).
    pub fn from_matrix(matrix: Mat4) -> Self {
        let (_scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self::new(rotation, translation)
    }

    /// Component-wise equality within [`POSE_EPSILON`].
    pub fn approx_eq(&self, other: &Pose) -> bool {
        self.rotation.abs_diff_eq(other.rotation, POSE_EPSILON)
            && self.translation.abs_diff_eq(other.translation, POSE_EPSILON)
    }
}

impl LeEncode for Pose {
    const ENCODED_SIZE: usize = 28;

    fn encode(&self, out: &mut Vec<u8>) {
        self.rotation.encode(out);
        self.translation.encode(out);
    }
}

/// One skeleton bone.
#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    pub id: u32,
    pub name: String,
    /// `None` for roots
    pub parent: Option<u32>,
    /// Rest pose relative to the parent joint (or the armature, for roots)
    pub bind_pose: Pose,
}

/// Joint arena plus the per-object vertex group mapping.
#[derive(Debug, Clone, Default)]
pub struct JointRegistry {
    joints: Interner<Joint>,
    groups: HashMap<(usize, u32), u32>,
}

impl JointRegistry {
    fn intern(&mut self, name: &str) -> u32 {
        let (id, created) = self.joints.intern_with(name, |id| Joint {
            id,
            name: name.to_owned(),
            parent: None,
            bind_pose: Pose::IDENTITY,
        });
        if created {
            tracing::debug!("Joint {}: '{}'", id, name);
        }
        id
    }

    /// Bind vertex group `group` of object `object` to the joint named `name`.
    pub fn register_group(&mut self, object: usize, group: u32, name: &str) -> u32 {
        let id = self.intern(name);
        self.groups.insert((object, group), id);
        id
    }

    /// Joint bound to an object's vertex group.
    pub fn resolve(&self, object: usize, group: u32) -> Option<u32> {
        self.groups.get(&(object, group)).copied()
    }

    /// Joint named `name`, created on first sight.
    pub fn resolve_name(&mut self, name: &str) -> u32 {
        self.intern(name)
    }

    /// Joint named `name`, if any.
    pub fn get(&self, name: &str) -> Option<u32> {
        self.joints.get(name)
    }

    pub fn joint(&self, id: u32) -> Option<&Joint> {
        self.joints.record(id)
    }

    pub fn joints(&self) -> &[Joint] {
        self.joints.records()
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Link the armature's bones into the joint tree and compute bind poses.
    ///
    /// Roots are visited in bone order and each subtree depth-first, so
    /// joints first seen here get ids in pre-order.
    pub fn build_hierarchy(&mut self, armature: &Armature) -> Result<()> {
        let bones = &armature.bones;
        let index: HashMap<&str, usize> = bones
            .iter()
            .enumerate()
            .map(|(i, b)| (b.name.as_str(), i))
            .collect();

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); bones.len()];
        let mut roots = Vec::new();
        for (i, bone) in bones.iter().enumerate() {
            match bone.parent.as_deref() {
                None => roots.push(i),
                Some(parent) => {
                    let &p = index
                        .get(parent)
                        .ok_or_else(|| ExportError::UnknownParentBone {
                            armature: armature.name.clone(),
                            bone: bone.name.clone(),
                            parent: parent.to_owned(),
                        })?;
                    children[p].push(i);
                }
            }
        }

        let world = armature.world_matrix();
        let mut visited = 0;
        let mut stack: Vec<(usize, Option<u32>)> = roots.iter().rev().map(|&r| (r, None)).collect();

        while let Some((bone_index, parent)) = stack.pop() {
            let bone = &bones[bone_index];
            let id = self.intern(&bone.name);
            let matrix = bone.armature_matrix();
            let local = match bone.parent.as_deref().and_then(|p| index.get(p)) {
                Some(&p) => bones[p].armature_matrix().inverse() * matrix,
                None => world * matrix,
            };

            if let Some(joint) = self.joints.record_mut(id) {
                joint.parent = parent;
                joint.bind_pose = Pose::from_matrix(local);
            }
            visited += 1;

            for &child in children[bone_index].iter().rev() {
                stack.push((child, Some(id)));
            }
        }

        if visited < bones.len() {
            tracing::warn!(
                "Armature '{}': {} bones are not reachable from a root and were skipped",
                armature.name,
                bones.len() - visited
            );
        }

        Ok(())
    }
}

/// Joint hierarchy plus its animations.
#[derive(Debug, Clone)]
pub struct Skeleton {
    pub schema_id: u32,
    pub joints: Vec<Joint>,
    pub animations: Vec<Animation>,
}

impl Skeleton {
    /// Build hierarchies for every armature, then assemble every clip.
    ///
    /// Hierarchies come first so all clips see the final joint count.
    pub fn build(joints: &mut JointRegistry, armatures: &[Armature], optimize: bool) -> Result<Self> {
        for armature in armatures {
            tracing::info!(
                "Getting bones from armature '{}' ({} bones)",
                armature.name,
                armature.bones.len()
            );
            joints.build_hierarchy(armature)?;
        }

        let mut animations = Vec::new();
        for armature in armatures {
            for clip in &armature.clips {
                animations.push(crate::animation::assemble_clip(joints, clip)?);
            }
        }

        if optimize {
            crate::animation::optimize_animations(&mut animations);
        }

        Ok(Self {
            schema_id: SKELETON_SCHEMA_ID,
            joints: joints.joints().to_vec(),
            animations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Bone, BonePose, Clip, PoseFrame};

    fn bone(name: &str, parent: Option<&str>, matrix: Mat4) -> Bone {
        Bone {
            name: name.into(),
            parent: parent.map(str::to_owned),
            matrix: matrix.to_cols_array(),
        }
    }

    fn armature(bones: Vec<Bone>, transform: Mat4) -> Armature {
        Armature {
            name: "Rig".into(),
            transform: transform.to_cols_array(),
            bones,
            clips: Vec::new(),
        }
    }

    #[test]
    fn test_group_names_share_joints_across_objects() {
        let mut registry = JointRegistry::default();
        let a = registry.register_group(0, 0, "Spine");
        let b = registry.register_group(0, 1, "Head");
        let c = registry.register_group(1, 0, "Head");

        assert_eq!((a, b, c), (0, 1, 1));
        assert_eq!(registry.resolve(1, 0), Some(1));
        assert_eq!(registry.resolve(1, 1), None);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_hierarchy_preorder_ids_and_parents() {
        let mut registry = JointRegistry::default();
        let arm = armature(
            vec![
                bone("Root", None, Mat4::IDENTITY),
                bone("Leg", Some("Root"), Mat4::IDENTITY),
                bone("Spine", Some("Root"), Mat4::IDENTITY),
                bone("Foot", Some("Leg"), Mat4::IDENTITY),
            ],
            Mat4::IDENTITY,
        );
        registry.build_hierarchy(&arm).unwrap();

        let names: Vec<_> = registry.joints().iter().map(|j| j.name.as_str()).collect();
        assert_eq!(names, ["Root", "Leg", "Foot", "Spine"]);
        let parents: Vec<_> = registry.joints().iter().map(|j| j.parent).collect();
        assert_eq!(parents, [None, Some(0), Some(1), Some(0)]);
    }

    #[test]
    fn test_existing_group_joint_gets_linked() {
        let mut registry = JointRegistry::default();
        registry.register_group(0, 0, "Hand");
        let arm = armature(
            vec![
                bone("Arm", None, Mat4::IDENTITY),
                bone("Hand", Some("Arm"), Mat4::IDENTITY),
            ],
            Mat4::IDENTITY,
        );
        registry.build_hierarchy(&arm).unwrap();

        // Hand kept id 0; its parent got id 1
        assert_eq!(registry.get("Hand"), Some(0));
        assert_eq!(registry.joint(0).unwrap().parent, Some(1));
        assert_eq!(registry.joint(1).unwrap().parent, None);
    }

    #[test]
    fn test_bind_pose_is_relative_to_parent() {
        let mut registry = JointRegistry::default();
        let root = Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0));
        let child = Mat4::from_translation(Vec3::new(0.0, 3.0, 0.0));
        let arm = armature(
            vec![bone("Root", None, root), bone("Child", Some("Root"), child)],
            Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)),
        );
        registry.build_hierarchy(&arm).unwrap();

        let root_pose = registry.joint(0).unwrap().bind_pose;
        let child_pose = registry.joint(1).unwrap().bind_pose;
        // Root is expressed through the armature transform
        assert!(root_pose.translation.abs_diff_eq(Vec3::new(10.0, 1.0, 0.0), 1e-5));
        assert!(child_pose.translation.abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1e-5));
        assert!(child_pose.rotation.abs_diff_eq(Quat::IDENTITY, 1e-5));
    }

    #[test]
    fn test_unknown_parent_is_error() {
        let mut registry = JointRegistry::default();
        let arm = armature(vec![bone("Orphan", Some("Missing"), Mat4::IDENTITY)], Mat4::IDENTITY);
        let err = registry.build_hierarchy(&arm).unwrap_err();
        assert!(matches!(err, ExportError::UnknownParentBone { .. }));
    }

    #[test]
    fn test_every_clip_covers_joints_of_all_armatures() {
        let clip = |name: &str, bone: &str| Clip {
            name: name.into(),
            frames: (0..2)
                .map(|i| PoseFrame {
                    time: i as f32,
                    poses: vec![BonePose {
                        bone: bone.into(),
                        rotation: [1.0, 0.0, 0.0, 0.0],
                        translation: [i as f32, 0.0, 0.0],
                    }],
                })
                .collect(),
        };

        let mut first = armature(vec![bone("Body", None, Mat4::IDENTITY)], Mat4::IDENTITY);
        first.clips.push(clip("Idle", "Body"));
        let mut second = armature(
            vec![
                bone("Tail", None, Mat4::IDENTITY),
                bone("Tip", Some("Tail"), Mat4::IDENTITY),
            ],
            Mat4::IDENTITY,
        );
        second.name = "Tail".into();
        second.clips.push(clip("Wag", "Tip"));

        let mut registry = JointRegistry::default();
        let skeleton = Skeleton::build(&mut registry, &[first, second], false).unwrap();

        assert_eq!(skeleton.joints.len(), 3);
        assert_eq!(skeleton.animations.len(), 2);
        for animation in &skeleton.animations {
            assert_eq!(animation.sequences.len(), 3, "{}", animation.name);
            assert!(animation.sequences.iter().all(|s| s.frames.len() == 2));
        }
        // The first clip was assembled knowing the second armature's joints
        assert_eq!(skeleton.animations[0].sequences[2].frames[1].pose, Pose::IDENTITY);
        assert_eq!(skeleton.animations[1].sequences[2].frames[1].pose.translation.x, 1.0);
    }

    #[test]
    fn test_pose_approx_eq() {
        let a = Pose::new(Quat::IDENTITY, Vec3::ONE);
        let b = Pose::new(Quat::IDENTITY, Vec3::ONE + Vec3::splat(1e-7));
        let c = Pose::new(Quat::IDENTITY, Vec3::new(1.0, 1.0, 1.1));
        assert!(a.approx_eq(&b));
        assert!(!a.approx_eq(&c));
    }
}
