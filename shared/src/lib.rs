use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const WALK_SPEED: f32 = 200.0;
pub const MAX_TICK_DT: f32 = 0.05;
pub const WALK_FRAME_SECS: f32 = 0.12;
pub const WALK_CYCLE_FRAMES: u8 = 3;
pub const DEFAULT_AVATAR_SIZE: f32 = 32.0;
pub const DEFAULT_NAME: &str = "Player";
pub const FALLBACK_WORLD_SIZE: f32 = 2000.0;

/// A held movement key, as sent in discrete move intents.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit step in world coordinates (y grows downward).
    pub fn vector(&self) -> (f32, f32) {
        match self {
            Direction::Up => (0.0, -1.0),
            Direction::Down => (0.0, 1.0),
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
        }
    }

    pub fn facing(&self) -> Facing {
        match self {
            Direction::Up => Facing::North,
            Direction::Down => Facing::South,
            Direction::Left => Facing::West,
            Direction::Right => Facing::East,
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Which way an avatar is looking. West frames are never shipped by the
/// server; clients mirror east at draw time.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    North,
    South,
    East,
    West,
}

/// A full entity description as it appears in roster snapshots and join
/// notifications. Everything beyond id and position is optional; absent
/// fields fall back to client defaults.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EntityRecord {
    pub id: String,
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facing: Option<Facing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moving: Option<bool>,
}

impl EntityRecord {
    pub fn at(id: &str, x: f32, y: f32) -> Self {
        Self {
            id: id.to_string(),
            x,
            y,
            name: None,
            avatar: None,
            facing: None,
            frame: None,
            moving: None,
        }
    }
}

/// Partial per-entity update. Only fields present on the wire are applied;
/// an absent field keeps the previous value. Presence is modelled with
/// `Option` rather than a sentinel so a legitimate 0 can still be sent.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct EntityDelta {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facing: Option<Facing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moving: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Per-direction frame image URLs for one avatar. West is derived, never
/// listed.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AtlasDef {
    #[serde(default)]
    pub north: Vec<String>,
    #[serde(default)]
    pub south: Vec<String>,
    #[serde(default)]
    pub east: Vec<String>,
}

/// Messages the client sends to the server.
///
/// `Move`/`Stop` belong to the discrete-intent protocol variant, `Displace`
/// to the displacement variant. A deployment picks one; the grammar carries
/// both shapes.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Join { name: String },
    Move { direction: Direction },
    Displace { dx: f32, dy: f32, timestamp: u64 },
    Stop,
}

/// Messages the server sends to the client.
///
/// Unrecognized kinds deserialize to `Unknown` so a newer server never
/// breaks an older client.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        id: String,
        x: f32,
        y: f32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        avatar: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        atlases: Option<HashMap<String, AtlasDef>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        roster: Option<Vec<EntityRecord>>,
    },
    JoinRejected {
        reason: String,
    },
    Roster {
        players: Vec<EntityRecord>,
    },
    PlayerJoined {
        player: EntityRecord,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        atlases: Option<HashMap<String, AtlasDef>>,
    },
    PlayerMoved {
        #[serde(flatten)]
        update: EntityDelta,
    },
    PlayerLeft {
        id: String,
    },
    ServerError {
        message: String,
    },
    #[serde(other)]
    Unknown,
}
