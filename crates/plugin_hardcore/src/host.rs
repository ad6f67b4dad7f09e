//! The operations the plugin needs from the game server.

use hardcore_system::{DimensionName, PlayerId};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    Survival,
    Spectator,
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Survival => write!(f, "survival"),
            Self::Spectator => write!(f, "spectator"),
        }
    }
}

/// Player-facing actions on the host server.
///
/// Calls are expected to be scheduled onto the server's main thread by the
/// implementation; the plugin never disconnects players.
pub trait PlayerHost: Send + Sync {
    fn set_game_mode(&self, player: PlayerId, mode: GameMode);

    /// Moves the player to the spawn point of `dimension`.
    fn teleport_to_spawn(&self, player: PlayerId, dimension: &DimensionName);

    fn send_message(&self, player: PlayerId, message: &str);
}
