//! Client-side movement prediction with edge-triggered intent detection

use crate::entity::Entity;
use shared::{Direction, MAX_TICK_DT, WALK_CYCLE_FRAMES, WALK_FRAME_SECS, WALK_SPEED};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Which wire shape movement intents take. Servers speak exactly one of
/// these; the choice is a deployment flag, not a runtime negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum MoveProtocol {
    /// Direction tokens on key edges, stop on release.
    Discrete,
    /// Timestamped displacement deltas every tick while moving.
    Displacement,
}

/// Integrates held directional input into the local entity every tick,
/// independent of network state, so the local view never stalls on a round
/// trip. Also reports key edges so the session can emit intents.
pub struct MovementPredictor {
    held: Vec<Direction>,
    speed: f32,
    walk_timer: f32,
}

impl MovementPredictor {
    pub fn new(speed: f32) -> Self {
        Self {
            held: Vec::new(),
            speed,
            walk_timer: 0.0,
        }
    }

    /// Records a key-down transition. Returns true only on the edge (the
    /// direction was not already held); key repeat reports false.
    pub fn key_down(&mut self, direction: Direction) -> bool {
        if self.held.contains(&direction) {
            return false;
        }
        self.held.push(direction);
        true
    }

    /// Records a key-up. Returns true when this release empties the held
    /// set, which is the moment to emit a stop intent. Releasing a key
    /// that was never held reports false.
    pub fn key_up(&mut self, direction: Direction) -> bool {
        let before = self.held.len();
        self.held.retain(|d| *d != direction);
        self.held.len() != before && self.held.is_empty()
    }

    pub fn is_idle(&self) -> bool {
        self.held.is_empty()
    }

    /// Combined direction of all held keys, normalized so diagonal speed
    /// equals axis-aligned speed. Opposing keys cancel to zero.
    pub fn direction_vector(&self) -> (f32, f32) {
        let mut x = 0.0;
        let mut y = 0.0;
        for direction in &self.held {
            let (dx, dy) = direction.vector();
            x += dx;
            y += dy;
        }
        normalize(x, y)
    }

    /// Advances the local entity by one tick and returns the displacement
    /// actually applied (before world clamping), which the displacement
    /// protocol variant puts on the wire.
    ///
    /// `dt` is capped at `MAX_TICK_DT` so a stalled frame (tab in the
    /// background, debugger pause) cannot teleport the entity.
    pub fn advance(&mut self, local: &mut Entity, world: (f32, f32), dt: f32) -> (f32, f32) {
        let dt = dt.min(MAX_TICK_DT);
        let (vx, vy) = self.direction_vector();
        let dx = vx * self.speed * dt;
        let dy = vy * self.speed * dt;

        let moving = dx != 0.0 || dy != 0.0;
        local.x = (local.x + dx).clamp(0.0, world.0);
        local.y = (local.y + dy).clamp(0.0, world.1);
        local.moving = moving;

        if let Some(direction) = self.held.last() {
            local.facing = direction.facing();
        }

        if moving {
            self.walk_timer += dt;
            if self.walk_timer >= WALK_FRAME_SECS {
                self.walk_timer -= WALK_FRAME_SECS;
                local.frame = (local.frame + 1) % WALK_CYCLE_FRAMES;
            }
        } else {
            self.walk_timer = 0.0;
            local.frame = 0;
        }

        (dx, dy)
    }
}

impl Default for MovementPredictor {
    fn default() -> Self {
        Self::new(WALK_SPEED)
    }
}

fn normalize(x: f32, y: f32) -> (f32, f32) {
    let magnitude = (x * x + y * y).sqrt();
    if magnitude > 0.0 {
        (x / magnitude, y / magnitude)
    } else {
        (0.0, 0.0)
    }
}

pub(crate) fn timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_millis() as u64
}
