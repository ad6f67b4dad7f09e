//! Admin command execution.
//!
//! `Application` opens the hardcore system from the configuration and player
//! state files and runs one [`AdminCommand`] against it. Results are written to a
//! caller-supplied writer (stdout in the binary).

use crate::cli::{AdminCommand, CliArgs};
use crate::config::AppConfig;
use hardcore_system::{
    ConsoleOrchestrator, HardcoreSystem, JsonStateFile, TomlConfigFile, WorldGroup,
    WorldOrchestrator,
};
use std::io::Write;
use std::sync::Arc;
use tracing::info;

pub struct Application {
    system: HardcoreSystem,
    command: AdminCommand,
}

impl Application {
    /// Opens the system with world commands printed on stdout.
    pub async fn new(args: CliArgs) -> Result<Self, Box<dyn std::error::Error>> {
        Self::with_orchestrator(args, Arc::new(ConsoleOrchestrator::stdout())).await
    }

    /// Loads the configuration, applies CLI overrides and opens the system.
    ///
    /// # Arguments
    ///
    /// * `args` - Parsed command line; `--log-level` and `--json-logs` override the
    ///   file, `--data` overrides `storage.data-file`
    /// * `worlds` - Receives world commands and answers existence checks
    ///
    /// # Errors
    ///
    /// Fails when the configuration cannot be read or is invalid, or when player
    /// state cannot be loaded.
    pub async fn with_orchestrator(
        args: CliArgs,
        worlds: Arc<dyn WorldOrchestrator>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        info!("🔧 Loading configuration from: {}", args.config_path.display());
        let mut config = AppConfig::load_from_file(&args.config_path).await?;

        if let Some(log_level) = args.log_level {
            config.logging.level = log_level;
        }
        if args.json_logs {
            config.logging.json_format = true;
        }
        config.validate()?;

        let data_path = args
            .data_file
            .unwrap_or_else(|| config.data_path(&args.config_path));
        info!("📂 Player state file: {}", data_path.display());

        let system = HardcoreSystem::open(
            Arc::new(TomlConfigFile::new(args.config_path)),
            Arc::new(JsonStateFile::new(data_path)),
            worlds,
        )?;

        Ok(Self {
            system,
            command: args.command,
        })
    }

    pub fn system(&self) -> &HardcoreSystem {
        &self.system
    }

    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        self.execute(&mut out)
    }

    pub fn execute(&self, out: &mut impl Write) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            AdminCommand::Reload => {
                let worlds = self.system.reload()?;
                writeln!(
                    out,
                    "Reloaded {} hardcore worlds ({} players tracked).",
                    worlds,
                    self.system.store().player_count()
                )?;
            }
            AdminCommand::List => self.list(out)?,
            AdminCommand::Status { world } => self.status(world, out)?,
            AdminCommand::Cull { delete } => self.cull(*delete, out)?,
            AdminCommand::Create {
                world,
                dimensions,
                policy,
            } => {
                let group =
                    self.system
                        .create_world(world.as_str().into(), dimensions, *policy)?;
                writeln!(out, "World '{}' added as hardcore.", group.id)?;
                write_group(&group, out)?;
            }
            AdminCommand::Remove { world } => {
                let freed = self.system.remove_world(world)?;
                let names: Vec<&str> = freed.iter().map(|d| d.as_str()).collect();
                writeln!(
                    out,
                    "Removed hardcore world '{}' ({}).",
                    world,
                    names.join(", ")
                )?;
            }
        }
        Ok(())
    }

    fn list(&self, out: &mut impl Write) -> std::io::Result<()> {
        let registry = self.system.registry();
        let groups = registry.groups();
        writeln!(
            out,
            "Hub world: {} ({} of {} hardcore worlds open)",
            registry.hub_world(),
            groups.len(),
            registry.max_open_worlds()
        )?;
        for group in &groups {
            write_group(group, out)?;
        }
        Ok(())
    }

    fn status(&self, world: &str, out: &mut impl Write) -> std::io::Result<()> {
        let status = self.system.world_status(world);
        writeln!(out, "World: {}", status.id)?;
        writeln!(out, "  Hardcore: {}", status.group.is_some())?;
        for dimension in &status.dimensions {
            writeln!(
                out,
                "  {}: exists={}, online={}",
                dimension.name, dimension.exists, dimension.online_players
            )?;
        }
        if let Some(group) = &status.group {
            writeln!(
                out,
                "  Spectator on death: {}",
                group.policy.allow_spectator_on_death
            )?;
            writeln!(
                out,
                "  Teleport after death: {}",
                group.policy.allow_teleport_after_death
            )?;
            writeln!(
                out,
                "  Visitors: {} ({} dead)",
                status.visitors, status.dead_visitors
            )?;
        }
        Ok(())
    }

    fn cull(&self, delete: bool, out: &mut impl Write) -> std::io::Result<()> {
        let report = self.system.cull(delete);
        if report.cullable.is_empty() {
            writeln!(out, "No hardcore worlds are fully dead.")?;
            return Ok(());
        }

        let names: Vec<&str> = report.cullable.iter().map(|id| id.as_str()).collect();
        writeln!(out, "Cullable hardcore worlds: {}", names.join(", "))?;
        if !delete {
            writeln!(out, "Run cull --delete to delete them.")?;
            return Ok(());
        }

        for (world, online) in &report.skipped_online {
            writeln!(out, "Skipped '{}': {} players online.", world, online)?;
        }
        for world in &report.deleted {
            writeln!(out, "Deleted '{}'.", world)?;
        }
        Ok(())
    }
}

fn write_group(group: &WorldGroup, out: &mut impl Write) -> std::io::Result<()> {
    let dimensions: Vec<&str> = group.dimensions.iter().map(|d| d.as_str()).collect();
    writeln!(
        out,
        "  {}: {} (spectator on death: {}, tp after death: {})",
        group.id,
        dimensions.join(", "),
        group.policy.allow_spectator_on_death,
        group.policy.allow_teleport_after_death
    )
}
