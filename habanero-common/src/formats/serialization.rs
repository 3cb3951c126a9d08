//! Binary serialization trait for fixed-size records.
//!
//! Each record keeps its own `to_bytes()` returning a fixed-size array; the
//! trait gives generic code (tests, inspection tools) a uniform entry point.

/// Trait for fixed-size binary records.
///
/// Uses `Vec<u8>` for the return type because associated consts can't size
/// array return types on stable Rust.
pub trait BinarySerializable: Sized {
    /// Size of the serialized record in bytes.
    const SIZE: usize;

    /// Serialize to bytes.
    fn serialize(&self) -> Vec<u8>;

    /// Deserialize from bytes. Returns `None` if the slice is too short or invalid.
    fn deserialize(bytes: &[u8]) -> Option<Self>;
}

macro_rules! impl_fixed_record {
    ($ty:ty) => {
        impl BinarySerializable for $ty {
            const SIZE: usize = <$ty>::SIZE;

            fn serialize(&self) -> Vec<u8> {
                self.to_bytes().to_vec()
            }

            fn deserialize(bytes: &[u8]) -> Option<Self> {
                Self::from_bytes(bytes)
            }
        }
    };
}

impl_fixed_record!(super::SubMeshHeader);
impl_fixed_record!(super::BoundingVolumeRecord);
impl_fixed_record!(super::SkeletonHeader);
impl_fixed_record!(super::MaterialHeader);
