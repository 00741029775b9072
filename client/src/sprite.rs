//! Avatar atlas storage and per-frame sprite selection

use crate::entity::{AvatarRef, Entity};
use macroquad::texture::Texture2D;
use shared::{Facing, DEFAULT_AVATAR_SIZE};
use std::collections::HashMap;

/// Directional walk frames for one avatar. The server supplies north,
/// south and east; west is always east mirrored at draw time.
#[derive(Debug, Default)]
pub struct AvatarAtlas {
    pub north: Vec<Texture2D>,
    pub south: Vec<Texture2D>,
    pub east: Vec<Texture2D>,
}

impl AvatarAtlas {
    fn sequence(&self, facing: Facing) -> &[Texture2D] {
        match facing {
            Facing::North => &self.north,
            Facing::South => &self.south,
            Facing::East | Facing::West => &self.east,
        }
    }

    /// Size used for culling before the exact frame is known: the first
    /// frame of south, east, then north, whichever exists.
    pub fn nominal_size(&self) -> Option<(f32, f32)> {
        [&self.south, &self.east, &self.north]
            .into_iter()
            .find_map(|seq| seq.first())
            .map(|t| (t.width(), t.height()))
    }
}

#[derive(Debug, Default)]
pub struct AtlasStore {
    atlases: HashMap<String, AvatarAtlas>,
}

impl AtlasStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: String, atlas: AvatarAtlas) {
        self.atlases.insert(id, atlas);
    }

    pub fn get(&self, id: &str) -> Option<&AvatarAtlas> {
        self.atlases.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.atlases.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.atlases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atlases.is_empty()
    }
}

/// The image a compositor should draw for an entity this frame.
pub enum ResolvedSprite<'a> {
    Texture {
        texture: &'a Texture2D,
        width: f32,
        height: f32,
        mirror: bool,
    },
    /// No texture available yet; draw a solid stand-in of this size.
    Placeholder { width: f32, height: f32 },
    /// Atlas present but no frames for this facing; draw nothing.
    Empty,
}

/// Picks the sprite for an entity. Never fails the frame: a missing atlas
/// degrades to a placeholder, an empty frame sequence to nothing.
pub fn resolve<'a>(entity: &'a Entity, atlases: &'a AtlasStore) -> ResolvedSprite<'a> {
    match &entity.avatar {
        AvatarRef::Static {
            texture: Some(texture),
            width,
            height,
        } => ResolvedSprite::Texture {
            texture,
            width: *width,
            height: *height,
            mirror: false,
        },
        AvatarRef::Static {
            texture: None,
            width,
            height,
        } => ResolvedSprite::Placeholder {
            width: *width,
            height: *height,
        },
        AvatarRef::Atlas(id) => match atlases.get(id) {
            Some(atlas) => {
                let (facing, mirror) = draw_facing(entity.facing);
                let sequence = atlas.sequence(facing);
                if sequence.is_empty() {
                    return ResolvedSprite::Empty;
                }
                let texture = &sequence[clamp_frame(entity.frame, sequence.len())];
                ResolvedSprite::Texture {
                    texture,
                    width: texture.width(),
                    height: texture.height(),
                    mirror,
                }
            }
            // atlas not registered (yet); keep the entity visible
            None => ResolvedSprite::Placeholder {
                width: DEFAULT_AVATAR_SIZE,
                height: DEFAULT_AVATAR_SIZE,
            },
        },
    }
}

/// Bounding-box size for culling, cheaper than a full resolve.
pub fn nominal_size(entity: &Entity, atlases: &AtlasStore) -> (f32, f32) {
    match &entity.avatar {
        AvatarRef::Static { width, height, .. } => (*width, *height),
        AvatarRef::Atlas(id) => atlases
            .get(id)
            .and_then(|atlas| atlas.nominal_size())
            .unwrap_or((DEFAULT_AVATAR_SIZE, DEFAULT_AVATAR_SIZE)),
    }
}

/// West has no stored frames: it renders as east, flipped.
pub(crate) fn draw_facing(facing: Facing) -> (Facing, bool) {
    match facing {
        Facing::West => (Facing::East, true),
        other => (other, false),
    }
}

pub(crate) fn clamp_frame(frame: u8, len: usize) -> usize {
    (frame as usize).min(len - 1)
}
