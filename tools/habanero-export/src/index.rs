//! Human-readable id index (`i2n`)
//!
//! Lists the ids baked into the binary files so engine-side code can refer
//! to materials, textures, joints and animations by name.
//!
//! ```text
//! #materials
//! 1. Skin
//! #textures
//! 1. textures/skin.png
//! #skeleton
//! 1. hero
//! #joints
//! 0. Root
//! #animations
//! 0. Walk
//! ```

use std::io::{self, Write};

use crate::material::MaterialRegistry;
use crate::skeleton::Skeleton;

/// Write the index. Skeleton sections appear only when `skeleton` is given.
pub fn write_index<W: Write>(
    w: &mut W,
    materials: &MaterialRegistry,
    skeleton: Option<(&str, &Skeleton)>,
) -> io::Result<()> {
    writeln!(w, "#materials")?;
    for material in materials.materials() {
        writeln!(w, "{}. {}", material.id, material.name)?;
    }

    writeln!(w, "#textures")?;
    for (i, path) in materials.textures().paths().iter().enumerate() {
        writeln!(w, "{}. {}", i + 1, path)?;
    }

    if let Some((name, skeleton)) = skeleton {
        writeln!(w, "#skeleton\n1. {}", name)?;
        writeln!(w, "#joints")?;
        for joint in &skeleton.joints {
            writeln!(w, "{}. {}", joint.id, joint.name)?;
        }
        writeln!(w, "#animations")?;
        for (i, animation) in skeleton.animations.iter().enumerate() {
            writeln!(w, "{}. {}", i, animation.name)?;
        }
    }

    Ok(())
}
