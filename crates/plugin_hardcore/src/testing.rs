use crate::handlers::HandlerContext;
use crate::host::{GameMode, PlayerHost};
use crate::messages::MessageCatalog;
use hardcore_system::{
    ConsoleOrchestrator, DimensionName, HardcoreSystem, MemoryConfig, MemoryState, PlayerId,
};
use std::sync::{Arc, Mutex};

pub const CONFIG: &str = r#"
hub-world = "world"

[messages]
prefix = ""

[hardcore-worlds.hc-1]
dimensions = ["hc-1", "hc-1_nether"]

[hardcore-worlds.no-spectate]
allow-spectator-on-death = false
"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    GameMode(PlayerId, GameMode),
    Teleport(PlayerId, DimensionName),
    Message(PlayerId, String),
}

#[derive(Default)]
pub struct MockHost {
    actions: Mutex<Vec<Action>>,
}

impl MockHost {
    pub fn actions(&self) -> Vec<Action> {
        self.actions.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.actions()
            .into_iter()
            .filter_map(|action| match action {
                Action::Message(_, text) => Some(text),
                _ => None,
            })
            .collect()
    }
}

impl PlayerHost for MockHost {
    fn set_game_mode(&self, player: PlayerId, mode: GameMode) {
        self.actions.lock().unwrap().push(Action::GameMode(player, mode));
    }

    fn teleport_to_spawn(&self, player: PlayerId, dimension: &DimensionName) {
        self.actions
            .lock()
            .unwrap()
            .push(Action::Teleport(player, dimension.clone()));
    }

    fn send_message(&self, player: PlayerId, message: &str) {
        self.actions
            .lock()
            .unwrap()
            .push(Action::Message(player, message.to_string()));
    }
}

pub fn context() -> (Arc<MockHost>, HandlerContext) {
    let config = MemoryConfig::from_toml(CONFIG).unwrap();
    let messages = MessageCatalog::from_table(config.snapshot().get_table_in(&["messages"]));
    let system = HardcoreSystem::open(
        Arc::new(config),
        Arc::new(MemoryState::new()),
        Arc::new(ConsoleOrchestrator::new(|_| {})),
    )
    .unwrap();

    let host = Arc::new(MockHost::default());
    let ctx = HandlerContext {
        system: Arc::new(system),
        host: host.clone(),
        messages,
    };
    (host, ctx)
}

/// Records a visit and a death in `dimension`.
pub fn kill(ctx: &HandlerContext, player: PlayerId, dimension: &str) {
    ctx.system.on_join_or_world_change(player, &dimension.into());
    ctx.system.on_death(player, &dimension.into());
}
