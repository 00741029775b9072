//! Per-frame compositing of map, entities and labels

use crate::camera::compute_camera;
use crate::entity::{Entity, NameLabel};
use crate::session::Session;
use crate::sprite::{self, AtlasStore, ResolvedSprite};
use macroquad::prelude::*;

pub const LABEL_FONT_SIZE: u16 = 16;
pub const LABEL_GAP: f32 = 6.0;

const BACKGROUND: Color = Color::new(0.10, 0.10, 0.10, 1.0);
const LOCAL_PLACEHOLDER: Color = GREEN;
const REMOTE_PLACEHOLDER: Color = Color::new(1.0, 0.27, 0.27, 1.0);

/// Draws one frame. Surface sizing and pixel-density scaling are handled
/// by the windowing layer; everything here works in logical pixels.
///
/// Order per frame: camera from the pre-tick position, then prediction,
/// then map, local entity, remotes.
pub fn draw_frame(session: &mut Session) {
    let viewport = (screen_width(), screen_height());
    let camera = compute_camera(
        (session.local.x, session.local.y),
        viewport,
        session.world.size(),
    );

    session.tick(get_frame_time());

    clear_background(BACKGROUND);
    if let Some(texture) = &session.world.texture {
        let (sx, sy, sw, sh) = map_source_rect(camera, viewport, session.world.size());
        draw_texture_ex(
            texture,
            0.0,
            0.0,
            WHITE,
            DrawTextureParams {
                source: Some(Rect::new(sx, sy, sw, sh)),
                dest_size: Some(vec2(sw, sh)),
                ..Default::default()
            },
        );
    }

    draw_entity(&mut session.local, &session.atlases, true, camera, viewport);
    for entity in session.roster.iter_mut() {
        draw_entity(entity, &session.atlases, false, camera, viewport);
    }
}

fn draw_entity(
    entity: &mut Entity,
    atlases: &AtlasStore,
    is_local: bool,
    camera: (f32, f32),
    viewport: (f32, f32),
) {
    let sx = entity.x - camera.0;
    let sy = entity.y - camera.1;
    let (w, h) = sprite::nominal_size(entity, atlases);
    if !visible(sx, sy, w, h, viewport.0, viewport.1) {
        return;
    }

    match sprite::resolve(entity, atlases) {
        ResolvedSprite::Texture {
            texture,
            width,
            height,
            mirror,
        } => {
            draw_texture_ex(
                texture,
                sx - width / 2.0,
                sy - height / 2.0,
                WHITE,
                DrawTextureParams {
                    dest_size: Some(vec2(width, height)),
                    flip_x: mirror,
                    ..Default::default()
                },
            );
        }
        ResolvedSprite::Placeholder { width, height } => {
            let color = if is_local {
                LOCAL_PLACEHOLDER
            } else {
                REMOTE_PLACEHOLDER
            };
            draw_rectangle(sx - width / 2.0, sy - height / 2.0, width, height, color);
            draw_rectangle_lines(sx - width / 2.0, sy - height / 2.0, width, height, 2.0, WHITE);
        }
        ResolvedSprite::Empty => {}
    }

    ensure_label(entity);
    if let Some(label) = &entity.label {
        draw_text(
            &entity.name,
            sx - label.width / 2.0,
            sy - h / 2.0 - LABEL_GAP,
            LABEL_FONT_SIZE as f32,
            WHITE,
        );
    }
}

/// Rebuilds the measured label if the name changed since the last draw.
fn ensure_label(entity: &mut Entity) {
    let stale = match &entity.label {
        Some(label) => label.text != entity.name,
        None => true,
    };
    if stale {
        let dims = measure_text(&entity.name, None, LABEL_FONT_SIZE, 1.0);
        entity.label = Some(NameLabel {
            text: entity.name.clone(),
            width: dims.width,
            height: dims.height,
        });
    }
}

/// Source rectangle into the map texture for the current camera, clamped
/// so it never reads past the map edge even when the world under-fills
/// the viewport.
pub(crate) fn map_source_rect(
    camera: (f32, f32),
    viewport: (f32, f32),
    world: (f32, f32),
) -> (f32, f32, f32, f32) {
    let w = viewport.0.min(world.0 - camera.0).max(0.0);
    let h = viewport.1.min(world.1 - camera.1).max(0.0);
    (camera.0, camera.1, w, h)
}

/// Screen-space bounding-box test for culling. `sx`/`sy` is the entity
/// center in screen coordinates.
pub(crate) fn visible(sx: f32, sy: f32, w: f32, h: f32, vw: f32, vh: f32) -> bool {
    sx + w / 2.0 >= 0.0 && sx - w / 2.0 <= vw && sy + h / 2.0 >= 0.0 && sy - h / 2.0 <= vh
}
