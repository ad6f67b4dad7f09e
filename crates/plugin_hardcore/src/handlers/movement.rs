//! Teleports between dimensions, decided before the move happens.

use super::{HandlerContext, HandlerOutcome};
use crate::messages::{TELEPORT_BLOCKED, TELEPORT_BLOCKED_HUB};
use hardcore_system::{Decision, DimensionName, PlayerTeleportEvent};
use tracing::info;

pub fn handle_player_teleport(event: PlayerTeleportEvent, ctx: &HandlerContext) -> HandlerOutcome {
    let player = event.player_id;
    let decision = ctx.system.on_teleport_attempt(player, &event.from, &event.to);
    if !decision.cancels_move() {
        return HandlerOutcome::proceed();
    }

    let world = ctx
        .system
        .registry()
        .resolve(event.to.as_str())
        .map(|id| id.to_string())
        .unwrap_or_else(|| event.to.to_string());
    info!("🚫 Blocked dead player {} from entering '{}'", player, world);

    match decision {
        // Already in the hub: cancelling the move is enough.
        Decision::BlockAndRedirectToHub { hub } if !is_hub(&event.from, &hub) => {
            ctx.host.teleport_to_spawn(player, &hub);
            ctx.host.send_message(
                player,
                &ctx.messages.format(
                    TELEPORT_BLOCKED_HUB,
                    &[("world", world.as_str()), ("hub", hub.as_str())],
                ),
            );
        }
        _ => ctx.host.send_message(
            player,
            &ctx.messages.format(TELEPORT_BLOCKED, &[("world", world.as_str())]),
        ),
    }
    HandlerOutcome::cancel()
}

fn is_hub(dimension: &DimensionName, hub: &DimensionName) -> bool {
    dimension.as_str().eq_ignore_ascii_case(hub.as_str())
}
