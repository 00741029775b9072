//! Protocol reconciliation: applying inbound messages to session state
//!
//! Every handler runs to completion before the next frame reads the
//! roster, so a tick observes either all of a message's effects or none.
//! Messages are applied strictly in delivery order; a move update may
//! legitimately arrive before its join and is treated as an upsert.

use crate::entity::AvatarRef;
use crate::session::Session;
use log::{debug, info, warn};
use shared::{AtlasDef, EntityRecord, ServerMessage};
use std::collections::HashMap;

impl Session {
    /// Entry point for one raw frame off the channel. A frame that does
    /// not parse is discarded; the channel stays open and no state
    /// changes.
    pub fn on_inbound(&mut self, raw: &str) {
        match serde_json::from_str::<ServerMessage>(raw) {
            Ok(msg) => self.apply(msg),
            Err(e) => warn!("Discarding malformed message: {}", e),
        }
    }

    /// Applies one inbound message. Nothing in here may panic: every
    /// failure mode degrades to a logged no-op so the render loop keeps
    /// going.
    pub fn apply(&mut self, msg: ServerMessage) {
        match msg {
            ServerMessage::Welcome {
                id,
                x,
                y,
                avatar,
                atlases,
                roster,
            } => self.apply_welcome(id, x, y, avatar, atlases, roster),

            ServerMessage::JoinRejected { reason } => {
                warn!("Join rejected: {}", reason);
                self.go_offline();
            }

            ServerMessage::Roster { players } => {
                // the local entity is never roster-managed
                let remotes: Vec<EntityRecord> = players
                    .into_iter()
                    .filter(|r| r.id != self.local.id)
                    .collect();
                self.roster.replace_all(&remotes);
                debug!("Roster snapshot applied: {} remote(s)", self.roster.len());
            }

            ServerMessage::PlayerJoined { player, atlases } => {
                if let Some(atlases) = atlases {
                    self.queue_atlases(atlases);
                }
                if player.id == self.local.id {
                    return;
                }
                self.roster.upsert(&player);
            }

            ServerMessage::PlayerMoved { update } => {
                if update.id == self.local.id {
                    // server correction for our own entity
                    self.local.apply_delta(&update);
                } else {
                    self.roster.apply_delta(&update);
                }
            }

            ServerMessage::PlayerLeft { id } => {
                if id == self.local.id {
                    debug!("Ignoring departure message for the local entity");
                    return;
                }
                self.roster.remove(&id);
            }

            ServerMessage::ServerError { message } => {
                warn!("Server reported a failed action: {}", message);
            }

            ServerMessage::Unknown => {
                debug!("Ignoring message of unknown kind");
            }
        }
    }

    fn apply_welcome(
        &mut self,
        id: String,
        x: f32,
        y: f32,
        avatar: Option<String>,
        atlases: Option<HashMap<String, AtlasDef>>,
        roster: Option<Vec<EntityRecord>>,
    ) {
        if self.joined {
            // a duplicate ack must never re-spawn or duplicate the local
            // entity
            debug!("Duplicate welcome ignored");
            return;
        }

        info!("Joined as {} at ({}, {})", id, x, y);
        self.local.id = id;
        self.local.x = x.clamp(0.0, self.world.width);
        self.local.y = y.clamp(0.0, self.world.height);
        if let Some(avatar) = avatar {
            self.local.avatar = AvatarRef::Atlas(avatar);
        }
        if let Some(atlases) = atlases {
            self.queue_atlases(atlases);
        }
        if let Some(roster) = roster {
            let remotes: Vec<EntityRecord> = roster
                .into_iter()
                .filter(|r| r.id != self.local.id)
                .collect();
            self.roster.replace_all(&remotes);
        }
        self.joined = true;
        self.offline = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::World;
    use crate::entity::NameLabel;
    use crate::movement::MoveProtocol;
    use shared::EntityDelta;

    fn session() -> Session {
        Session::new(
            World::sized(2000.0, 2000.0),
            MoveProtocol::Discrete,
            "Hero",
            None,
        )
    }

    fn welcome(id: &str, x: f32, y: f32) -> ServerMessage {
        ServerMessage::Welcome {
            id: id.to_string(),
            x,
            y,
            avatar: None,
            atlases: None,
            roster: None,
        }
    }

    fn moved(id: &str) -> EntityDelta {
        EntityDelta {
            id: id.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_welcome_finalizes_local_entity() {
        let mut s = session();
        s.apply(ServerMessage::Welcome {
            id: "p1".to_string(),
            x: 320.0,
            y: 240.0,
            avatar: Some("knight".to_string()),
            atlases: None,
            roster: Some(vec![
                EntityRecord::at("p1", 320.0, 240.0),
                EntityRecord::at("p2", 100.0, 100.0),
            ]),
        });

        assert!(s.joined);
        assert_eq!(s.local.id, "p1");
        assert_eq!((s.local.x, s.local.y), (320.0, 240.0));
        assert!(matches!(&s.local.avatar, AvatarRef::Atlas(a) if a == "knight"));
        // the snapshot entry for ourselves must not become a remote ghost
        assert_eq!(s.roster.len(), 1);
        assert!(s.roster.contains("p2"));
    }

    #[test]
    fn test_duplicate_welcome_is_ignored() {
        let mut s = session();
        s.apply(welcome("p1", 320.0, 240.0));
        s.apply(welcome("p9", 1.0, 1.0));

        assert_eq!(s.local.id, "p1");
        assert_eq!((s.local.x, s.local.y), (320.0, 240.0));
    }

    #[test]
    fn test_welcome_clamps_out_of_range_spawn() {
        let mut s = session();
        s.apply(welcome("p1", 9999.0, -50.0));
        assert_eq!((s.local.x, s.local.y), (2000.0, 0.0));
    }

    #[test]
    fn test_join_rejected_goes_offline() {
        let mut s = session();
        s.apply(ServerMessage::JoinRejected {
            reason: "full".to_string(),
        });
        assert!(s.offline);
        assert!(!s.joined);
    }

    #[test]
    fn test_snapshot_replaces_roster_exactly() {
        let mut s = session();
        s.apply(ServerMessage::Roster {
            players: vec![
                EntityRecord::at("A", 1.0, 1.0),
                EntityRecord::at("B", 2.0, 2.0),
            ],
        });
        assert_eq!(s.roster.len(), 2);

        s.apply(ServerMessage::Roster {
            players: vec![EntityRecord::at("A", 1.0, 1.0)],
        });
        assert_eq!(s.roster.len(), 1);
        assert!(s.roster.contains("A"));
        assert!(!s.roster.contains("B"));
    }

    #[test]
    fn test_moved_for_local_id_corrects_local_entity() {
        let mut s = session();
        s.apply(welcome("p1", 100.0, 100.0));

        let mut update = moved("p1");
        update.x = Some(50.0);
        s.apply(ServerMessage::PlayerMoved { update });

        assert_eq!(s.local.x, 50.0);
        assert!(!s.roster.contains("p1"));
    }

    #[test]
    fn test_moved_before_joined_upserts_remote() {
        let mut s = session();
        let mut update = moved("Z");
        update.x = Some(7.0);
        s.apply(ServerMessage::PlayerMoved { update });

        let z = s.roster.get("Z").unwrap();
        assert_eq!(z.x, 7.0);
        assert_eq!(z.name, shared::DEFAULT_NAME);
    }

    #[test]
    fn test_left_for_local_id_never_removes_self() {
        let mut s = session();
        s.apply(welcome("p1", 100.0, 100.0));
        s.apply(ServerMessage::PlayerLeft {
            id: "p1".to_string(),
        });
        assert_eq!(s.local.id, "p1");
    }

    #[test]
    fn test_left_unknown_id_is_noop() {
        let mut s = session();
        s.apply(ServerMessage::PlayerJoined {
            player: EntityRecord::at("A", 0.0, 0.0),
            atlases: None,
        });
        s.apply(ServerMessage::PlayerLeft {
            id: "ghost".to_string(),
        });
        assert_eq!(s.roster.len(), 1);
    }

    #[test]
    fn test_server_error_changes_nothing() {
        let mut s = session();
        s.apply(ServerMessage::PlayerJoined {
            player: EntityRecord::at("A", 1.0, 2.0),
            atlases: None,
        });

        s.apply(ServerMessage::ServerError {
            message: "move rejected".to_string(),
        });

        assert_eq!(s.roster.len(), 1);
        let a = s.roster.get("A").unwrap();
        assert_eq!((a.x, a.y), (1.0, 2.0));
    }

    #[test]
    fn test_malformed_frame_is_discarded() {
        let mut s = session();
        s.on_inbound("{not json");
        s.on_inbound(r#"{"type":"player_moved"}"#); // missing required id
        s.on_inbound("");
        assert_eq!(s.roster.len(), 0);
        assert!(!s.joined);
    }

    #[test]
    fn test_unknown_kind_is_ignored_via_wire() {
        let mut s = session();
        s.on_inbound(r#"{"type":"season_greeting","text":"hi"}"#);
        assert_eq!(s.roster.len(), 0);
    }

    #[test]
    fn test_wire_partial_update_only_touches_present_fields() {
        let mut s = session();
        s.on_inbound(r#"{"type":"player_joined","player":{"id":"A","x":10.0,"y":20.0,"name":"Alice"}}"#);
        s.on_inbound(r#"{"type":"player_moved","id":"A","x":99.0}"#);

        let a = s.roster.get("A").unwrap();
        assert_eq!((a.x, a.y), (99.0, 20.0));
        assert_eq!(a.name, "Alice");
    }

    #[test]
    fn test_rename_through_wire_invalidates_label() {
        let mut s = session();
        s.apply(ServerMessage::PlayerJoined {
            player: EntityRecord::at("A", 0.0, 0.0),
            atlases: None,
        });
        // simulate a label built by a previous draw
        for entity in s.roster.iter_mut() {
            entity.label = Some(NameLabel {
                text: entity.name.clone(),
                width: 30.0,
                height: 10.0,
            });
        }

        s.on_inbound(r#"{"type":"player_moved","id":"A","name":"Renamed"}"#);
        let a = s.roster.get("A").unwrap();
        assert!(a.label.is_none());
    }

    #[test]
    fn test_joined_atlases_are_queued_once() {
        let mut s = session();
        let mut atlases = HashMap::new();
        atlases.insert("knight".to_string(), AtlasDef::default());

        s.apply(ServerMessage::PlayerJoined {
            player: EntityRecord::at("A", 0.0, 0.0),
            atlases: Some(atlases.clone()),
        });
        s.apply(ServerMessage::PlayerJoined {
            player: EntityRecord::at("B", 0.0, 0.0),
            atlases: Some(atlases),
        });

        assert_eq!(s.take_pending_atlases().len(), 1);
    }

    #[test]
    fn test_messages_apply_in_delivery_order() {
        let mut s = session();
        s.on_inbound(r#"{"type":"player_moved","id":"A","x":1.0}"#);
        s.on_inbound(r#"{"type":"player_moved","id":"A","x":2.0}"#);
        s.on_inbound(r#"{"type":"player_moved","id":"A","x":3.0}"#);
        assert_eq!(s.roster.get("A").unwrap().x, 3.0);
    }
}
