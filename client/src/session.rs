//! The session context: one object owning all live client state
//!
//! Single-writer rules: the reconciler (reconcile.rs) writes remote
//! entities, the movement predictor writes the local entity, and the
//! render compositor only reads (label caches aside, which are derived).

use crate::assets::World;
use crate::entity::{Entity, Roster};
use crate::movement::{timestamp_ms, MoveProtocol, MovementPredictor};
use crate::sprite::AtlasStore;
use log::{debug, info};
use shared::{AtlasDef, ClientMessage, Direction};
use tokio::sync::mpsc::UnboundedSender;

/// Sentinel id for the local entity until the server assigns one.
pub const LOCAL_ID: &str = "self";

pub struct Session {
    pub local: Entity,
    pub roster: Roster,
    pub world: World,
    pub atlases: AtlasStore,
    pub predictor: MovementPredictor,
    pub protocol: MoveProtocol,
    pub joined: bool,
    pub offline: bool,
    outbound: Option<UnboundedSender<ClientMessage>>,
    pending_atlases: Vec<(String, AtlasDef)>,
}

impl Session {
    /// The local entity starts provisional: sentinel id, caller-chosen
    /// name, center-of-map position. A welcome message finalizes it.
    pub fn new(
        world: World,
        protocol: MoveProtocol,
        name: &str,
        outbound: Option<UnboundedSender<ClientMessage>>,
    ) -> Self {
        let local = Entity::new(LOCAL_ID, name, world.width / 2.0, world.height / 2.0);
        Self {
            local,
            roster: Roster::new(),
            world,
            atlases: AtlasStore::new(),
            predictor: MovementPredictor::default(),
            protocol,
            joined: false,
            offline: false,
            outbound,
            pending_atlases: Vec::new(),
        }
    }

    /// Announces the local player to the server.
    pub fn join(&mut self) {
        self.send(ClientMessage::Join {
            name: self.local.name.clone(),
        });
    }

    /// Key-down transition. Intents go out on the edge only, never per
    /// frame; key repeat is absorbed by the predictor.
    pub fn key_down(&mut self, direction: Direction) {
        if self.predictor.key_down(direction) && self.protocol == MoveProtocol::Discrete {
            self.send(ClientMessage::Move { direction });
        }
    }

    /// Key-up transition; the last release emits a stop intent.
    pub fn key_up(&mut self, direction: Direction) {
        if self.predictor.key_up(direction) {
            self.send(ClientMessage::Stop);
        }
    }

    /// Per-frame entry point: advances local prediction. Under the
    /// displacement protocol, the applied delta also goes on the wire.
    pub fn tick(&mut self, dt: f32) {
        let world = self.world.size();
        let (dx, dy) = self.predictor.advance(&mut self.local, world, dt);

        if self.protocol == MoveProtocol::Displacement && (dx != 0.0 || dy != 0.0) {
            self.send(ClientMessage::Displace {
                dx,
                dy,
                timestamp: timestamp_ms(),
            });
        }
    }

    /// Switches to offline play: rendering and prediction continue, the
    /// wire goes quiet. Before a join ack this also resets the spawn to
    /// the center of the map.
    pub fn go_offline(&mut self) {
        if self.offline {
            return;
        }
        self.offline = true;
        if !self.joined {
            self.local.x = self.world.width / 2.0;
            self.local.y = self.world.height / 2.0;
        }
        info!("Session is offline; continuing with local play");
    }

    /// Atlas definitions announced by the server but not yet loaded. The
    /// frame loop drains these and awaits the texture loads between ticks.
    pub fn take_pending_atlases(&mut self) -> Vec<(String, AtlasDef)> {
        std::mem::take(&mut self.pending_atlases)
    }

    pub(crate) fn queue_atlases(&mut self, defs: impl IntoIterator<Item = (String, AtlasDef)>) {
        for (id, def) in defs {
            if self.atlases.contains(&id) || self.pending_atlases.iter().any(|(p, _)| p == &id) {
                continue;
            }
            self.pending_atlases.push((id, def));
        }
    }

    pub(crate) fn send(&self, msg: ClientMessage) {
        if let Some(outbound) = &self.outbound {
            if outbound.send(msg).is_err() {
                debug!("Outbound channel is gone; dropping intent");
            }
        }
    }
}
