//! Skin binder: arbitrary bone-weight sets onto the fixed 4-influence budget

use super::types::{MAX_INFLUENCES, NEUTRAL_JOINT, SkinBinding};
use crate::error::{ExportError, Result};
use crate::scene::{GroupWeight, MeshObject};
use crate::skeleton::JointRegistry;

/// Pack resolved (joint, weight) pairs into exactly four slots.
///
/// Keeps the four heaviest influences (stable, so ties keep source order)
/// without renormalizing, and pads with zero-weight neutral slots.
pub fn pack_influences(influences: &[(u32, f32)]) -> SkinBinding {
    let mut sorted = influences.to_vec();
    if sorted.len() > MAX_INFLUENCES {
        sorted.sort_by(|a, b| b.1.total_cmp(&a.1));
        sorted.truncate(MAX_INFLUENCES);
    }

    let mut binding = SkinBinding::UNBOUND;
    for (slot, (joint, weight)) in sorted.into_iter().enumerate() {
        binding.joints[slot] = joint;
        binding.weights[slot] = weight;
    }
    binding
}

/// Bind a vertex to joints.
///
/// With weights: groups are mapped to joints through the registry. Without:
/// the vertex follows the object's parent bone at full weight, or is left
/// unbound (neutral joint, zero weights) when there is none.
pub fn bind_vertex(
    joints: &mut JointRegistry,
    object_index: usize,
    object: &MeshObject,
    vertex_index: u32,
    groups: &[GroupWeight],
) -> Result<SkinBinding> {
    if groups.is_empty() {
        return Ok(match object.parent_bone.as_deref() {
            Some(bone) if !bone.is_empty() => {
                let joint = joints.resolve_name(bone);
                pack_influences(&[(joint, 1.0)])
            }
            _ => {
                tracing::warn!(
                    "Object '{}' vertex {} has no bone weights and no parent bone",
                    object.name,
                    vertex_index
                );
                SkinBinding::UNBOUND
            }
        });
    }

    if groups.len() > MAX_INFLUENCES {
        tracing::warn!(
            "Object '{}' vertex {} belongs to {} bones, keeping the {} heaviest",
            object.name,
            vertex_index,
            groups.len(),
            MAX_INFLUENCES
        );
    }

    let influences = groups
        .iter()
        .map(|g| {
            joints
                .resolve(object_index, g.group)
                .map(|joint| (joint, g.weight))
                .ok_or_else(|| ExportError::UnknownGroup {
                    object: object.name.clone(),
                    vertex: vertex_index,
                    group: g.group,
                    count: object.vertex_groups.len(),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(pack_influences(&influences))
}

/// Whether every slot is the zero-weight neutral joint.
pub fn is_unbound(binding: &SkinBinding) -> bool {
    binding
        .pairs()
        .all(|(joint, weight)| joint == NEUTRAL_JOINT && weight == 0.0)
}
