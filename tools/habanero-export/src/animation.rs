//! Animation assembly and keyframe compaction
//!
//! A clip becomes one keyframe sequence per skeleton joint, index-aligned
//! with the joint order. Every sampled frame adds one keyframe to every
//! sequence (identity pose unless the sample poses that bone).

use crate::error::{ExportError, Result};
use crate::scene::Clip;
use crate::skeleton::{JointRegistry, Pose};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    /// Seconds from clip start
    pub time: f32,
    pub pose: Pose,
}

/// One joint's timeline within a clip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyframeSequence {
    pub frames: Vec<Keyframe>,
}

impl KeyframeSequence {
    /// Collapse held poses.
    ///
    /// Every maximal run of three or more consecutive keyframes with the same
    /// pose (compared against the run's first keyframe) keeps only its first
    /// and last keyframe. A sequence left with exactly two equal keyframes is
    /// constant and keeps only the first.
    pub fn optimize(&mut self) {
        let frames = std::mem::take(&mut self.frames);
        let mut kept = Vec::with_capacity(frames.len());

        let mut start = 0;
        while start < frames.len() {
            let mut end = start;
            while end + 1 < frames.len() && frames[end + 1].pose.approx_eq(&frames[start].pose) {
                end += 1;
            }
            kept.push(frames[start]);
            if end > start {
                kept.push(frames[end]);
            }
            start = end + 1;
        }

        if kept.len() == 2 && kept[0].pose.approx_eq(&kept[1].pose) {
            kept.truncate(1);
        }

        self.frames = kept;
    }
}

/// A named clip.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub name: String,
    /// One sequence per skeleton joint, in joint id order
    pub sequences: Vec<KeyframeSequence>,
}

impl Animation {
    pub fn keyframe_count(&self) -> usize {
        self.sequences.iter().map(|s| s.frames.len()).sum()
    }
}

/// Build one sequence per joint from a clip's pose samples.
pub fn assemble_clip(joints: &JointRegistry, clip: &Clip) -> Result<Animation> {
    let mut sequences = vec![
        KeyframeSequence {
            frames: Vec::with_capacity(clip.frames.len()),
        };
        joints.len()
    ];

    for frame in &clip.frames {
        for sequence in &mut sequences {
            sequence.frames.push(Keyframe {
                time: frame.time,
                pose: Pose::IDENTITY,
            });
        }

        for sample in &frame.poses {
            let id = joints
                .get(&sample.bone)
                .ok_or_else(|| ExportError::UnknownBone {
                    clip: clip.name.clone(),
                    bone: sample.bone.clone(),
                })?;
            if let Some(last) = sequences[id as usize].frames.last_mut() {
                last.pose = Pose::new(sample.rotation(), sample.translation());
            }
        }
    }

    tracing::info!(
        "Animation '{}': {} frames x {} joints",
        clip.name,
        clip.frames.len(),
        sequences.len()
    );

    Ok(Animation {
        name: clip.name.clone(),
        sequences,
    })
}

/// Compact every sequence of every animation.
pub fn optimize_animations(animations: &mut [Animation]) {
    tracing::info!("Optimizing animations");
    for animation in animations {
        let before = animation.keyframe_count();
        for sequence in &mut animation.sequences {
            sequence.optimize();
        }
        tracing::debug!(
            "Animation '{}': {} -> {} keyframes",
            animation.name,
            before,
            animation.keyframe_count()
        );
    }
}
