//! Little-endian encoding of geometric primitives
//!
//! Every value written to a Habanero file goes through [`LeEncode`]. Layouts:
//!
//! ```text
//! u8      1 byte
//! u32     4 bytes
//! f32     4 bytes (IEEE-754)
//! Vec2    x, y              8 bytes
//! Vec3    x, y, z          12 bytes
//! Quat    w, x, y, z       16 bytes   (scalar first)
//! Color   r, g, b, a       16 bytes
//! ```

use glam::{Quat, Vec2, Vec3};

/// Absolute per-component tolerance used when comparing poses and UVs.
pub const POSE_EPSILON: f32 = 1e-6;

/// Compare two scalars within [`POSE_EPSILON`].
#[inline]
pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < POSE_EPSILON
}

/// Types with a fixed little-endian binary encoding.
pub trait LeEncode {
    /// Encoded size in bytes.
    const ENCODED_SIZE: usize;

    /// Append the encoding to `out`.
    fn encode(&self, out: &mut Vec<u8>);
}

impl LeEncode for u8 {
    const ENCODED_SIZE: usize = 1;

    fn encode(&self, out: &mut Vec<u8>) {
        out.push(*self);
    }
}

impl LeEncode for u32 {
    const ENCODED_SIZE: usize = 4;

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

impl LeEncode for f32 {
    const ENCODED_SIZE: usize = 4;

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

impl LeEncode for Vec2 {
    const ENCODED_SIZE: usize = 8;

    fn encode(&self, out: &mut Vec<u8>) {
        self.x.encode(out);
        self.y.encode(out);
    }
}

impl LeEncode for Vec3 {
    const ENCODED_SIZE: usize = 12;

    fn encode(&self, out: &mut Vec<u8>) {
        self.x.encode(out);
        self.y.encode(out);
        self.z.encode(out);
    }
}

impl LeEncode for Quat {
    const ENCODED_SIZE: usize = 16;

    fn encode(&self, out: &mut Vec<u8>) {
        // Engine expects scalar-first quaternions
        self.w.encode(out);
        self.x.encode(out);
        self.y.encode(out);
        self.z.encode(out);
    }
}

/// RGBA color, 4 × f32.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from an RGB triple (alpha = 1).
    pub const fn from_rgb(rgb: [f32; 3]) -> Self {
        Self::new(rgb[0], rgb[1], rgb[2], 1.0)
    }

    /// Opaque gray where every channel is `value`.
    pub const fn splat_rgb(value: f32) -> Self {
        Self::new(value, value, value, 1.0)
    }
}

impl LeEncode for Color {
    const ENCODED_SIZE: usize = 16;

    fn encode(&self, out: &mut Vec<u8>) {
        self.r.encode(out);
        self.g.encode(out);
        self.b.encode(out);
        self.a.encode(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded<T: LeEncode>(value: &T) -> Vec<u8> {
        let mut out = Vec::new();
        value.encode(&mut out);
        assert_eq!(out.len(), T::ENCODED_SIZE);
        out
    }

    #[test]
    fn test_quat_is_scalar_first() {
        let q = Quat::from_xyzw(0.1, 0.2, 0.3, 0.9);
        let bytes = encoded(&q);
        assert_eq!(&bytes[0..4], &0.9f32.to_le_bytes());
        assert_eq!(&bytes[4..8], &0.1f32.to_le_bytes());
        assert_eq!(&bytes[12..16], &0.3f32.to_le_bytes());
    }

    #[test]
    fn test_vec3_layout() {
        let bytes = encoded(&Vec3::new(1.0, -2.0, 3.5));
        assert_eq!(&bytes[4..8], &(-2.0f32).to_le_bytes());
        assert_eq!(&bytes[8..12], &3.5f32.to_le_bytes());
    }

    #[test]
    fn test_color_from_rgb_is_opaque() {
        let c = Color::from_rgb([0.2, 0.4, 0.6]);
        assert_eq!(c.a, 1.0);
        let bytes = encoded(&c);
        assert_eq!(&bytes[12..16], &1.0f32.to_le_bytes());
    }

    #[test]
    fn test_approx_eq() {
        assert!(approx_eq(0.5, 0.5 + 1e-7));
        assert!(!approx_eq(0.5, 0.5001));
    }
}
