//! Skeleton + animation format (.saf)
//!
//! # Layout
//! ```text
//! 0x00: magic "SAF2"
//! 0x04: joint_count u32
//! 0x08: animation_count u32
//! 0x0C: schema_id u32
//! 0x10: joints (joint_count * 32)
//!         parent u32 (0xFFFFFFFF = root), rotation quat (w,x,y,z), translation f32x3
//! var:  animations, each = joint_count keyframe sequences:
//!         frame_count u32, frames (frame_count * 32)
//!           time f32, rotation quat (w,x,y,z), translation f32x3
//! ```

use super::{HABANERO_FORMAT, read_f32, read_u32};

/// Parent id written for root joints.
pub const NO_PARENT: u32 = 0xFFFF_FFFF;

/// Schema id written into every skeleton header.
pub const SKELETON_SCHEMA_ID: u32 = 1;

/// Bytes per encoded pose (quaternion + translation).
pub const POSE_SIZE: usize = 28;

/// Skeleton file header (16 bytes, magic included)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkeletonHeader {
    pub joint_count: u32,
    pub animation_count: u32,
    pub schema_id: u32,
}

impl SkeletonHeader {
    pub const SIZE: usize = 16;

    pub fn new(joint_count: u32, animation_count: u32) -> Self {
        Self {
            joint_count,
            animation_count,
            schema_id: SKELETON_SCHEMA_ID,
        }
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(HABANERO_FORMAT.skeleton_magic);
        bytes[4..8].copy_from_slice(&self.joint_count.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.animation_count.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.schema_id.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE || &bytes[0..4] != HABANERO_FORMAT.skeleton_magic {
            return None;
        }
        Some(Self {
            joint_count: read_u32(bytes, 4),
            animation_count: read_u32(bytes, 8),
            schema_id: read_u32(bytes, 12),
        })
    }
}

/// Joint record: parent id + bind pose (32 bytes)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointRecord {
    pub parent: u32,
    /// Rotation as stored on disk: [w, x, y, z]
    pub rotation: [f32; 4],
    pub translation: [f32; 3],
}

impl JointRecord {
    pub const SIZE: usize = 4 + POSE_SIZE;

    pub fn is_root(&self) -> bool {
        self.parent == NO_PARENT
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let (rotation, translation) = read_pose(bytes, 4);
        Some(Self {
            parent: read_u32(bytes, 0),
            rotation,
            translation,
        })
    }
}

/// Keyframe record: begin time + pose (32 bytes)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyframeRecord {
    pub time: f32,
    /// Rotation as stored on disk: [w, x, y, z]
    pub rotation: [f32; 4],
    pub translation: [f32; 3],
}

impl KeyframeRecord {
    pub const SIZE: usize = 4 + POSE_SIZE;

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let (rotation, translation) = read_pose(bytes, 4);
        Some(Self {
            time: read_f32(bytes, 0),
            rotation,
            translation,
        })
    }
}

fn read_pose(bytes: &[u8], offset: usize) -> ([f32; 4], [f32; 3]) {
    let f = |i: usize| read_f32(bytes, offset + i * 4);
    ([f(0), f(1), f(2), f(3)], [f(4), f(5), f(6)])
}
