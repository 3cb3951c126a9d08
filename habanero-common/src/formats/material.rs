//! Material format (.mtf)
//!
//! # Layout
//! ```text
//! 0x00: magic "MTF2"
//! 0x04: flags u32 (bit i set = slot i holds a 1-based texture id)
//! 0x08: slots 0..=3, each u32 texture id or color f32x4
//! var:  slot 4, u32 texture id or f32 transparency
//! var:  slots 5..=7, u32 texture id, present only when bound
//! ```
//!
//! Slots 8..12 are reserved and never serialized.

use super::{HABANERO_FORMAT, read_u32};

/// Value slots carried by a material.
pub const MATERIAL_SLOT_COUNT: usize = 12;

/// Slots that appear in the file.
pub const SERIALIZED_SLOT_COUNT: usize = 8;

pub const SLOT_AMBIENT: usize = 0;
pub const SLOT_DIFFUSE: usize = 1;
pub const SLOT_SPECULAR: usize = 2;
pub const SLOT_EMISSIVE: usize = 3;
pub const SLOT_TRANSPARENCY: usize = 4;
pub const SLOT_NORMAL: usize = 5;
pub const SLOT_DISPLACEMENT: usize = 6;
pub const SLOT_GLOSS: usize = 7;

/// Material file header (8 bytes, magic included)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialHeader {
    pub flags: u32,
}

impl MaterialHeader {
    pub const SIZE: usize = 8;

    pub fn new(flags: u32) -> Self {
        Self { flags }
    }

    /// Whether `slot` holds a texture id.
    pub fn is_texture(&self, slot: usize) -> bool {
        self.flags & (1 << slot) != 0
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(HABANERO_FORMAT.material_magic);
        bytes[4..8].copy_from_slice(&self.flags.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE || &bytes[0..4] != HABANERO_FORMAT.material_magic {
            return None;
        }
        Some(Self::new(read_u32(bytes, 4)))
    }

    /// Expected body size (after the header) implied by the flags.
    pub fn body_size(&self) -> usize {
        let leading: usize = (SLOT_AMBIENT..=SLOT_EMISSIVE)
            .map(|slot| if self.is_texture(slot) { 4 } else { 16 })
            .sum();
        let trailing = (SLOT_NORMAL..SERIALIZED_SLOT_COUNT)
            .filter(|&slot| self.is_texture(slot))
            .count()
            * 4;
        leading + 4 + trailing
    }
}
