//! Bounding volume record (trailer of .smf / .tmf)
//!
//! # Layout
//! ```text
//! 0x00: volume_type u8 (1 = AABB)
//! 0x01: xmin, ymin, zmin, xmax, ymax, zmax (6 * f32, unaligned)
//! ```

use super::read_f32;

/// Volume type tag for axis-aligned bounding boxes.
pub const AABB_VOLUME_TYPE: u8 = 1;

/// Bounding volume record (25 bytes)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingVolumeRecord {
    pub volume_type: u8,
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl BoundingVolumeRecord {
    pub const SIZE: usize = 25;

    pub fn aabb(min: [f32; 3], max: [f32; 3]) -> Self {
        Self {
            volume_type: AABB_VOLUME_TYPE,
            min,
            max,
        }
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0] = self.volume_type;
        for (i, v) in self.min.iter().chain(self.max.iter()).enumerate() {
            let offset = 1 + i * 4;
            bytes[offset..offset + 4].copy_from_slice(&v.to_le_bytes());
        }
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let f = |i: usize| read_f32(bytes, 1 + i * 4);
        Some(Self {
            volume_type: bytes[0],
            min: [f(0), f(1), f(2)],
            max: [f(3), f(4), f(5)],
        })
    }
}
