//! World orchestration boundary.
//!
//! Physical world creation and deletion belong to an external orchestrator (on a
//! Bukkit-style server, Multiverse). Commands are fire-and-forget: success is
//! inferred later from [`WorldOrchestrator::dimension_exists`], never from a return
//! value.

use crate::types::{DimensionName, HardcoreDimension};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A command for the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WorldCommand {
    Create {
        dimension: DimensionName,
        kind: HardcoreDimension,
    },
    Delete {
        dimension: DimensionName,
    },
    SetHardDifficulty {
        dimension: DimensionName,
    },
}

impl WorldCommand {
    /// Multiverse console syntax for this command.
    pub fn console_line(&self) -> String {
        match self {
            Self::Create { dimension, kind } => {
                format!("mv create {} {}", dimension, kind.environment())
            }
            Self::Delete { dimension } => format!("mv delete {dimension}"),
            Self::SetHardDifficulty { dimension } => {
                format!("mv modify {dimension} set difficulty hard")
            }
        }
    }
}

impl fmt::Display for WorldCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.console_line())
    }
}

/// Existence and presence queries plus the command sink.
pub trait WorldOrchestrator: Send + Sync {
    fn dimension_exists(&self, dimension: &str) -> bool;

    /// Players currently connected inside `dimension`.
    fn online_players(&self, dimension: &str) -> usize;

    fn dispatch(&self, command: WorldCommand);
}

/// Orchestrator that renders commands as console lines and hands them to a sink.
///
/// It has no view of the running server: every dimension is reported as existing
/// and empty. Used by the offline admin tool, whose output is piped into the
/// server console.
pub struct ConsoleOrchestrator {
    sink: Box<dyn Fn(String) + Send + Sync>,
}

impl ConsoleOrchestrator {
    pub fn new(sink: impl Fn(String) + Send + Sync + 'static) -> Self {
        Self {
            sink: Box::new(sink),
        }
    }

    /// Prints every command on stdout.
    pub fn stdout() -> Self {
        Self::new(|line| println!("{line}"))
    }
}

impl WorldOrchestrator for ConsoleOrchestrator {
    fn dimension_exists(&self, _dimension: &str) -> bool {
        true
    }

    fn online_players(&self, _dimension: &str) -> usize {
        0
    }

    fn dispatch(&self, command: WorldCommand) {
        (self.sink)(command.console_line());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_console_lines() {
        let create = WorldCommand::Create {
            dimension: "hc-1_nether".into(),
            kind: HardcoreDimension::Nether,
        };
        assert_eq!(create.console_line(), "mv create hc-1_nether nether");
        assert_eq!(
            WorldCommand::Delete { dimension: "hc-1".into() }.to_string(),
            "mv delete hc-1"
        );
        assert_eq!(
            WorldCommand::SetHardDifficulty { dimension: "hc-1".into() }.console_line(),
            "mv modify hc-1 set difficulty hard"
        );
    }

    #[test]
    fn test_console_orchestrator_forwards_lines() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&lines);
        let orchestrator = ConsoleOrchestrator::new(move |line| recorded.lock().unwrap().push(line));

        orchestrator.dispatch(WorldCommand::Delete { dimension: "hc-1".into() });

        assert_eq!(*lines.lock().unwrap(), vec!["mv delete hc-1".to_string()]);
        assert!(orchestrator.dimension_exists("anything"));
        assert_eq!(orchestrator.online_players("anything"), 0);
    }
}
