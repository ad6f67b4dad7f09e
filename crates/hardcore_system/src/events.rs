//! # Player Notifications
//!
//! Notifications the host server raises for players and hardcore worlds. Each
//! carries dimension names as the host sees them; resolving a dimension to its
//! hardcore world is the state machine's job.

use crate::types::{DimensionName, PlayerId};
use serde::{Deserialize, Serialize};

/// A player died in `dimension`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerDeathEvent {
    pub player_id: PlayerId,
    pub dimension: DimensionName,
}

/// A player is respawning after a death in `death_dimension`.
///
/// `respawn_dimension` is where the host resolved the respawn point, if it did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRespawnEvent {
    pub player_id: PlayerId,
    pub death_dimension: DimensionName,
    #[serde(default)]
    pub respawn_dimension: Option<DimensionName>,
}

/// A player joined the server and was placed in `dimension`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerJoinEvent {
    pub player_id: PlayerId,
    pub dimension: DimensionName,
}

/// A player finished moving from one dimension into another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerWorldChangeEvent {
    pub player_id: PlayerId,
    pub from: DimensionName,
    pub to: DimensionName,
}

/// A player is about to teleport or move between dimensions. Cancellable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerTeleportEvent {
    pub player_id: PlayerId,
    pub from: DimensionName,
    pub to: DimensionName,
}
