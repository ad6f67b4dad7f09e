//! Death handling.
//!
//! A death only records state. The player is still on the death screen, so
//! nothing is applied until the respawn notification arrives.

use super::{HandlerContext, HandlerOutcome};
use hardcore_system::{Decision, PlayerDeathEvent};
use tracing::info;

pub fn handle_player_death(event: PlayerDeathEvent, ctx: &HandlerContext) -> HandlerOutcome {
    if let Decision::HandleOnRespawn { world } =
        ctx.system.on_death(event.player_id, &event.dimension)
    {
        info!(
            "💀 Player {} died in hardcore world '{}' ({})",
            event.player_id, world, event.dimension
        );
    }
    HandlerOutcome::proceed()
}
