//! # World Viewer Client Library
//!
//! Client-side runtime for the networked multiplayer world viewer. It
//! renders a scrollable map and every player in it, keeps the local
//! avatar responsive through client-side prediction, and reconciles the
//! sparse authoritative updates the server sends for everyone else.
//!
//! ## Architecture Overview
//!
//! The runtime is a single `Session` context object ticked by an
//! uncapped frame loop. Asynchronous completions — inbound network
//! frames and texture loads — are bridged into that loop and applied
//! between ticks, so a frame always observes fully-applied state.
//!
//! ### Client-Side Prediction
//! Held directional keys are integrated into the local entity every
//! frame regardless of network state. The view never stalls waiting for
//! a round trip; a dead channel simply means offline play.
//!
//! ### Reconciliation
//! Inbound messages are a tagged union handled exhaustively: roster
//! snapshots replace the remote set wholesale, partial per-entity
//! updates touch only the fields present on the wire, and unknown
//! message kinds are ignored for forward compatibility.
//!
//! ### Remote Entities
//! Remote players render at their last reported position with no
//! interpolation; they visibly jump between updates. That matches the
//! server's sparse update model rather than hiding it.
//!
//! ## Module Organization
//!
//! - `session` — the context object owning all live state, with
//!   single-writer rules per field
//! - `camera` — pure viewport clamping math
//! - `entity` — entity state and the roster of remote players
//! - `movement` — input-driven prediction and intent edge detection
//! - `reconcile` — inbound message handling
//! - `sprite` — avatar atlases and per-frame sprite selection
//! - `render` — per-frame compositing, culling, labels
//! - `assets` — texture loading with placeholder fallbacks
//! - `net` — the socket task and its bridge into the frame loop

pub mod assets;
pub mod camera;
pub mod entity;
pub mod movement;
pub mod net;
pub mod reconcile;
pub mod render;
pub mod session;
pub mod sprite;
