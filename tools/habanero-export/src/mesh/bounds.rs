//! Axis-aligned bounding volume accumulated from emitted vertices

use glam::Vec3;
use habanero_common::BoundingVolumeRecord;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingVolume {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for BoundingVolume {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl BoundingVolume {
    /// Inverted box: the first update collapses it onto that point.
    pub const EMPTY: Self = Self {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };

    /// Widen to contain `position`. Never shrinks.
    pub fn update(&mut self, position: Vec3) {
        self.min = self.min.min(position);
        self.max = self.max.max(position);
    }

    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    pub fn to_record(&self) -> BoundingVolumeRecord {
        BoundingVolumeRecord::aabb(self.min.to_array(), self.max.to_array())
    }
}
