//! Asset loading with graceful fallbacks

use crate::sprite::AvatarAtlas;
use log::{info, warn};
use macroquad::texture::{load_texture, FilterMode, Texture2D};
use shared::{AtlasDef, FALLBACK_WORLD_SIZE};

/// The world map: one immutable raster plus its pixel dimensions. A
/// missing texture means the asset failed to load; the compositor then
/// draws a flat placeholder background instead.
#[derive(Debug)]
pub struct World {
    pub texture: Option<Texture2D>,
    pub width: f32,
    pub height: f32,
}

impl World {
    pub fn sized(width: f32, height: f32) -> Self {
        Self {
            texture: None,
            width,
            height,
        }
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }
}

/// Loads the map raster. A failed load is never fatal: the session keeps a
/// fallback-sized world and renders without a map.
pub async fn load_world(path: &str) -> World {
    match load_texture(path).await {
        Ok(texture) => {
            texture.set_filter(FilterMode::Nearest);
            info!(
                "Loaded world map {} ({}x{})",
                path,
                texture.width(),
                texture.height()
            );
            World {
                width: texture.width(),
                height: texture.height(),
                texture: Some(texture),
            }
        }
        Err(e) => {
            warn!("Failed to load world map {}: {:?}", path, e);
            World::sized(FALLBACK_WORLD_SIZE, FALLBACK_WORLD_SIZE)
        }
    }
}

/// Loads every frame an atlas definition names. Frames that fail to load
/// are skipped with a warning; the sequence simply ends up shorter and
/// frame indexing clamps to what arrived.
pub async fn load_atlas(id: &str, def: &AtlasDef) -> AvatarAtlas {
    AvatarAtlas {
        north: load_frames(id, "north", &def.north).await,
        south: load_frames(id, "south", &def.south).await,
        east: load_frames(id, "east", &def.east).await,
    }
}

async fn load_frames(id: &str, direction: &str, urls: &[String]) -> Vec<Texture2D> {
    let mut frames = Vec::with_capacity(urls.len());
    for url in urls {
        match load_texture(url).await {
            Ok(texture) => {
                texture.set_filter(FilterMode::Nearest);
                frames.push(texture);
            }
            Err(e) => {
                warn!("Skipping frame {} for atlas {}/{}: {:?}", url, id, direction, e);
            }
        }
    }
    frames
}
