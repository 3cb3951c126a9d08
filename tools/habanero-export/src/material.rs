//! Material and texture registry
//!
//! Materials are deduplicated by name and get 1-based ids (0 is reserved so
//! an unset material reference is detectable). Texture paths go into an
//! export-wide list and are referenced by 1-based position.

use habanero_common::formats::{
    MATERIAL_SLOT_COUNT, SLOT_AMBIENT, SLOT_DIFFUSE, SLOT_DISPLACEMENT, SLOT_EMISSIVE, SLOT_GLOSS,
    SLOT_NORMAL, SLOT_SPECULAR, SLOT_TRANSPARENCY,
};
use habanero_common::{Color, LeEncode};

use crate::intern::Interner;
use crate::scene::{MaterialDesc, TextureMap};

/// Value stored directly in a material slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InlineValue {
    Color(Color),
    Scalar(f32),
}

impl InlineValue {
    /// Colors take 16 bytes, scalars 4.
    pub fn encode(&self, out: &mut Vec<u8>) {
        match self {
            InlineValue::Color(c) => c.encode(out),
            InlineValue::Scalar(s) => s.encode(out),
        }
    }
}

/// One material value slot.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MaterialSlot {
    #[default]
    Empty,
    /// 1-based index into the texture list
    Texture(u32),
    Inline(InlineValue),
}

impl MaterialSlot {
    pub fn texture_id(&self) -> Option<u32> {
        match self {
            MaterialSlot::Texture(id) => Some(*id),
            _ => None,
        }
    }
}

/// An encoded material.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub id: u32,
    pub name: String,
    pub slots: [MaterialSlot; MATERIAL_SLOT_COUNT],
}

impl Material {
    /// Build the slot table for `desc`, appending its textures to `textures`.
    pub fn build(id: u32, desc: &MaterialDesc, textures: &mut TextureList) -> Self {
        let mut slots = [MaterialSlot::Empty; MATERIAL_SLOT_COUNT];

        for texture in &desc.textures {
            let texture_id = textures.push(&texture.path);
            for map in &texture.maps {
                slots[slot_for(*map)] = MaterialSlot::Texture(texture_id);
            }
        }

        let inline = |slot: &mut MaterialSlot, value: InlineValue| {
            if *slot == MaterialSlot::Empty {
                *slot = MaterialSlot::Inline(value);
            }
        };
        inline(
            &mut slots[SLOT_AMBIENT],
            InlineValue::Color(Color::splat_rgb(desc.ambient)),
        );
        inline(
            &mut slots[SLOT_DIFFUSE],
            InlineValue::Color(Color::from_rgb(desc.diffuse_color)),
        );
        let mut specular = Color::from_rgb(desc.specular_color);
        specular.a = desc.specular_alpha;
        inline(&mut slots[SLOT_SPECULAR], InlineValue::Color(specular));
        inline(
            &mut slots[SLOT_TRANSPARENCY],
            InlineValue::Scalar(desc.alpha),
        );
        // Emissive has no texture channel
        slots[SLOT_EMISSIVE] = MaterialSlot::Inline(InlineValue::Color(Color::splat_rgb(desc.emit)));

        Self {
            id,
            name: desc.name.clone(),
            slots,
        }
    }

    /// Bit i set when slot i holds a texture id.
    pub fn flags(&self) -> u32 {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| matches!(slot, MaterialSlot::Texture(_)))
            .fold(0, |flags, (i, _)| flags | (1 << i))
    }
}

fn slot_for(map: TextureMap) -> usize {
    match map {
        TextureMap::Ambient => SLOT_AMBIENT,
        TextureMap::Diffuse => SLOT_DIFFUSE,
        TextureMap::Specular => SLOT_SPECULAR,
        TextureMap::Transparency => SLOT_TRANSPARENCY,
        TextureMap::Normal => SLOT_NORMAL,
        TextureMap::Displacement => SLOT_DISPLACEMENT,
        TextureMap::Gloss => SLOT_GLOSS,
    }
}

/// Export-wide texture path list. Not deduplicated.
#[derive(Debug, Clone, Default)]
pub struct TextureList {
    paths: Vec<String>,
}

impl TextureList {
    /// Append `path` and return its 1-based id.
    pub fn push(&mut self, path: &str) -> u32 {
        self.paths.push(resolve_texture_path(path).to_owned());
        self.paths.len() as u32
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Strip the `//` relative-path marker used by authoring tools.
pub fn resolve_texture_path(path: &str) -> &str {
    path.strip_prefix("//").unwrap_or(path)
}

/// Deduplicating material registry.
#[derive(Debug, Clone)]
pub struct MaterialRegistry {
    materials: Interner<Material>,
    textures: TextureList,
}

impl Default for MaterialRegistry {
    fn default() -> Self {
        Self {
            materials: Interner::with_base(1),
            textures: TextureList::default(),
        }
    }
}

impl MaterialRegistry {
    /// Add a material, returning its id and whether it was new.
    ///
    /// Repeated calls with the same name return the first encoding untouched.
    pub fn add(&mut self, desc: &MaterialDesc) -> (u32, bool) {
        let textures = &mut self.textures;
        let (id, created) = self
            .materials
            .intern_with(&desc.name, |id| Material::build(id, desc, textures));
        if created {
            tracing::info!("Material {}: '{}'", id, desc.name);
        }
        (id, created)
    }

    pub fn get(&self, id: u32) -> Option<&Material> {
        self.materials.record(id)
    }

    pub fn contains_id(&self, id: u32) -> bool {
        self.materials.contains_id(id)
    }

    /// Materials in id order (first is id 1).
    pub fn materials(&self) -> &[Material] {
        self.materials.records()
    }

    pub fn textures(&self) -> &TextureList {
        &self.textures
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}
