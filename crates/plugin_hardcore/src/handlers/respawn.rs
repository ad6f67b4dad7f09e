//! Respawn handling.
//!
//! A player dead in the world they died in either stays there as a spectator or
//! is sent to the hub in survival mode, depending on the world's policy.

use super::{HandlerContext, HandlerOutcome};
use crate::host::GameMode;
use crate::messages::{SENT_TO_HUB, SPECTATING};
use hardcore_system::{Decision, PlayerRespawnEvent};
use tracing::info;

pub fn handle_player_respawn(event: PlayerRespawnEvent, ctx: &HandlerContext) -> HandlerOutcome {
    let player = event.player_id;

    match ctx.system.on_respawn(player, &event.death_dimension) {
        Decision::StayAsSpectator {
            world,
            spawn_dimension,
        } => {
            ctx.host.set_game_mode(player, GameMode::Spectator);
            ctx.host.send_message(
                player,
                &ctx.messages.format(SPECTATING, &[("world", world.as_str())]),
            );
            info!("👻 Player {} respawns as spectator in '{}'", player, world);

            // Keep the host's respawn point when it already lies inside the world.
            let inside = event
                .respawn_dimension
                .as_ref()
                .and_then(|dimension| ctx.system.registry().resolve(dimension.as_str()))
                .is_some_and(|owner| owner == world);
            if inside {
                HandlerOutcome::proceed()
            } else {
                HandlerOutcome::respawn_at(spawn_dimension)
            }
        }
        Decision::RedirectToHubSurvival { hub } => {
            let world = ctx
                .system
                .registry()
                .resolve(event.death_dimension.as_str())
                .map(|id| id.to_string())
                .unwrap_or_else(|| event.death_dimension.to_string());
            ctx.host.set_game_mode(player, GameMode::Survival);
            ctx.host.send_message(
                player,
                &ctx.messages
                    .format(SENT_TO_HUB, &[("world", world.as_str()), ("hub", hub.as_str())]),
            );
            info!("🏠 Player {} respawns at hub '{}'", player, hub);
            HandlerOutcome::respawn_at(hub)
        }
        _ => HandlerOutcome::proceed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{context, kill, Action};
    use hardcore_system::{DimensionName, PlayerId};

    fn respawn(player: PlayerId, death: &str, at: Option<&str>) -> PlayerRespawnEvent {
        PlayerRespawnEvent {
            player_id: player,
            death_dimension: death.into(),
            respawn_dimension: at.map(DimensionName::from),
        }
    }

    #[test]
    fn test_spectator_keeps_respawn_point_inside_world() {
        let (host, ctx) = context();
        let player = PlayerId::new();
        kill(&ctx, player, "hc-1_nether");

        let outcome = handle_player_respawn(respawn(player, "hc-1_nether", Some("hc-1")), &ctx);

        assert_eq!(outcome, HandlerOutcome::proceed());
        assert_eq!(
            host.actions()[0],
            Action::GameMode(player, GameMode::Spectator)
        );
        assert_eq!(
            host.messages(),
            vec!["You died in §chc-1§r. You can only spectate there now.".to_string()]
        );
    }

    #[test]
    fn test_spectator_outside_world_goes_to_world_spawn() {
        let (_, ctx) = context();
        let player = PlayerId::new();
        kill(&ctx, player, "hc-1_nether");

        let outcome = handle_player_respawn(respawn(player, "hc-1_nether", Some("world")), &ctx);
        assert_eq!(outcome, HandlerOutcome::respawn_at("hc-1".into()));

        let outcome = handle_player_respawn(respawn(player, "hc-1_nether", None), &ctx);
        assert_eq!(outcome, HandlerOutcome::respawn_at("hc-1".into()));
    }

    #[test]
    fn test_no_spectating_sends_to_hub_in_survival() {
        let (host, ctx) = context();
        let player = PlayerId::new();
        kill(&ctx, player, "no-spectate");

        let outcome = handle_player_respawn(respawn(player, "no-spectate", None), &ctx);

        assert_eq!(outcome, HandlerOutcome::respawn_at("world".into()));
        assert_eq!(
            host.actions()[0],
            Action::GameMode(player, GameMode::Survival)
        );
        assert!(host.messages()[0].contains("no-spectate"));
    }

    #[test]
    fn test_living_player_respawns_normally() {
        let (host, ctx) = context();
        let outcome = handle_player_respawn(respawn(PlayerId::new(), "hc-1", None), &ctx);
        assert_eq!(outcome, HandlerOutcome::proceed());
        assert!(host.actions().is_empty());
    }
}
