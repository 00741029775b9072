//! Entity state and the roster of remote players

use macroquad::texture::Texture2D;
use shared::{EntityDelta, EntityRecord, Facing, DEFAULT_AVATAR_SIZE, DEFAULT_NAME};
use std::collections::HashMap;

/// Cached measurement of an entity's rendered name. Dropped whenever the
/// name changes and rebuilt on the next draw.
#[derive(Debug, Clone)]
pub struct NameLabel {
    pub text: String,
    pub width: f32,
    pub height: f32,
}

/// What an entity looks like: a single resolved image (possibly still a
/// placeholder while the asset loads), or a reference into the atlas store.
#[derive(Debug, Clone)]
pub enum AvatarRef {
    Static {
        texture: Option<Texture2D>,
        width: f32,
        height: f32,
    },
    Atlas(String),
}

impl AvatarRef {
    pub fn placeholder() -> Self {
        AvatarRef::Static {
            texture: None,
            width: DEFAULT_AVATAR_SIZE,
            height: DEFAULT_AVATAR_SIZE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub id: String,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub avatar: AvatarRef,
    pub facing: Facing,
    pub frame: u8,
    pub moving: bool,
    pub label: Option<NameLabel>,
}

impl Entity {
    pub fn new(id: &str, name: &str, x: f32, y: f32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            x,
            y,
            avatar: AvatarRef::placeholder(),
            facing: Facing::South,
            frame: 0,
            moving: false,
            label: None,
        }
    }

    pub fn from_record(record: &EntityRecord) -> Self {
        let mut entity = Entity::new(&record.id, DEFAULT_NAME, record.x, record.y);
        entity.apply_record(record);
        entity
    }

    /// Renaming invalidates the label cache; same name keeps it.
    pub fn set_name(&mut self, name: &str) {
        if self.name != name {
            self.name = name.to_string();
            self.label = None;
        }
    }

    /// Applies a full snapshot record. Position is always present in a
    /// record; the rest only overwrites when supplied.
    pub fn apply_record(&mut self, record: &EntityRecord) {
        self.x = record.x;
        self.y = record.y;
        if let Some(name) = &record.name {
            self.set_name(name);
        }
        if let Some(avatar) = &record.avatar {
            self.avatar = AvatarRef::Atlas(avatar.clone());
        }
        if let Some(facing) = record.facing {
            self.facing = facing;
        }
        if let Some(frame) = record.frame {
            self.frame = frame;
        }
        if let Some(moving) = record.moving {
            self.moving = moving;
        }
    }

    /// Applies a partial update; absent fields keep their previous values.
    pub fn apply_delta(&mut self, delta: &EntityDelta) {
        if let Some(x) = delta.x {
            self.x = x;
        }
        if let Some(y) = delta.y {
            self.y = y;
        }
        if let Some(facing) = delta.facing {
            self.facing = facing;
        }
        if let Some(frame) = delta.frame {
            self.frame = frame;
        }
        if let Some(moving) = delta.moving {
            self.moving = moving;
        }
        if let Some(name) = &delta.name {
            self.set_name(name);
        }
    }
}

/// Remote players keyed by server-assigned id. The local entity never
/// lives here.
#[derive(Debug, Default)]
pub struct Roster {
    entities: HashMap<String, Entity>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.values_mut()
    }

    /// Creates or updates a single entity from a snapshot record.
    pub fn upsert(&mut self, record: &EntityRecord) {
        match self.entities.get_mut(&record.id) {
            Some(entity) => entity.apply_record(record),
            None => {
                self.entities
                    .insert(record.id.clone(), Entity::from_record(record));
            }
        }
    }

    /// Applies a partial update. An update for an id we have never seen is
    /// an implicit upsert: the wire does not guarantee join-before-move.
    pub fn apply_delta(&mut self, delta: &EntityDelta) {
        let entity = self
            .entities
            .entry(delta.id.clone())
            .or_insert_with(|| Entity::new(&delta.id, DEFAULT_NAME, 0.0, 0.0));
        entity.apply_delta(delta);
    }

    /// Removing an unknown id is a no-op.
    pub fn remove(&mut self, id: &str) {
        self.entities.remove(id);
    }

    /// Full roster replacement: anything absent from the snapshot is gone,
    /// everything present is created or updated in place.
    pub fn replace_all(&mut self, records: &[EntityRecord]) {
        self.entities
            .retain(|id, _| records.iter().any(|r| &r.id == id));
        for record in records {
            self.upsert(record);
        }
    }
}
