//! Joins and completed world changes.
//!
//! A player who logged out dead, or who was let into a world they are dead in,
//! is put back into the state their world's policy requires.

use super::{HandlerContext, HandlerOutcome};
use crate::host::GameMode;
use crate::messages::{SENT_TO_HUB, SPECTATING};
use hardcore_system::{Decision, DimensionName, PlayerId, PlayerJoinEvent, PlayerWorldChangeEvent};
use tracing::{debug, info};

pub fn handle_player_join(event: PlayerJoinEvent, ctx: &HandlerContext) -> HandlerOutcome {
    debug!("🎮 Player {} joined in '{}'", event.player_id, event.dimension);
    enforce_arrival(event.player_id, &event.dimension, ctx)
}

pub fn handle_world_change(event: PlayerWorldChangeEvent, ctx: &HandlerContext) -> HandlerOutcome {
    debug!(
        "🎮 Player {} moved from '{}' to '{}'",
        event.player_id, event.from, event.to
    );
    enforce_arrival(event.player_id, &event.to, ctx)
}

fn enforce_arrival(player: PlayerId, dimension: &DimensionName, ctx: &HandlerContext) -> HandlerOutcome {
    match ctx.system.on_join_or_world_change(player, dimension) {
        Decision::StayAsSpectator { world, .. } => {
            ctx.host.set_game_mode(player, GameMode::Spectator);
            ctx.host.send_message(
                player,
                &ctx.messages.format(SPECTATING, &[("world", world.as_str())]),
            );
        }
        Decision::RedirectToHubSurvival { hub } => {
            let world = ctx
                .system
                .registry()
                .resolve(dimension.as_str())
                .map(|id| id.to_string())
                .unwrap_or_else(|| dimension.to_string());
            ctx.host.teleport_to_spawn(player, &hub);
            ctx.host.set_game_mode(player, GameMode::Survival);
            ctx.host.send_message(
                player,
                &ctx.messages
                    .format(SENT_TO_HUB, &[("world", world.as_str()), ("hub", hub.as_str())]),
            );
            info!("🏠 Sent dead player {} from '{}' to hub '{}'", player, world, hub);
        }
        _ => {}
    }
    HandlerOutcome::proceed()
}
