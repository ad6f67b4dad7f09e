//! Command-line interface for the hardcore admin tool.
//!
//! Built with the `clap` builder API. Every subcommand works offline against the
//! configuration and player state files; world commands for the server are
//! printed on stdout so they can be piped into the server console.

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use hardcore_system::{HardcoreDimension, PolicyOverride};
use std::path::PathBuf;

pub const DEFAULT_CONFIG: &str = "config.toml";

/// The administrative action to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    Reload,
    List,
    Status {
        world: String,
    },
    Cull {
        delete: bool,
    },
    Create {
        world: String,
        dimensions: Vec<HardcoreDimension>,
        policy: PolicyOverride,
    },
    Remove {
        world: String,
    },
}

/// Command line arguments parsed from user input.
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Path to the configuration file
    pub config_path: PathBuf,
    /// Optional override for the player state file
    pub data_file: Option<PathBuf>,
    /// Optional override for log level
    pub log_level: Option<String>,
    /// Whether to force JSON log output
    pub json_logs: bool,
    pub command: AdminCommand,
}

impl CliArgs {
    /// Parses the process arguments, exiting with usage on error.
    ///
    /// # Returns
    ///
    /// The parsed arguments. Without a subcommand the tool lists worlds.
    pub fn parse() -> Self {
        Self::from_matches(&command().get_matches())
    }

    /// Parses `args` (program name first) without exiting.
    ///
    /// # Errors
    ///
    /// Returns clap's error for unknown flags, missing worlds or non-boolean
    /// policy values.
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Ok(Self::from_matches(&command().try_get_matches_from(args)?))
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        let world = |sub: &ArgMatches| sub.get_one::<String>("world").cloned().unwrap_or_default();

        let command = match matches.subcommand() {
            Some(("reload", _)) => AdminCommand::Reload,
            Some(("status", sub)) => AdminCommand::Status { world: world(sub) },
            Some(("cull", sub)) => AdminCommand::Cull {
                delete: sub.get_flag("delete"),
            },
            Some(("create", sub)) => {
                let mut dimensions = vec![HardcoreDimension::Overworld];
                if sub.get_flag("nether") {
                    dimensions.push(HardcoreDimension::Nether);
                }
                if sub.get_flag("end") {
                    dimensions.push(HardcoreDimension::End);
                }
                AdminCommand::Create {
                    world: world(sub),
                    dimensions,
                    policy: PolicyOverride {
                        allow_spectator_on_death: sub.get_one::<bool>("spectator").copied(),
                        allow_teleport_after_death: sub.get_one::<bool>("tp-after-death").copied(),
                    },
                }
            }
            Some(("remove", sub)) => AdminCommand::Remove { world: world(sub) },
            _ => AdminCommand::List,
        };

        Self {
            config_path: matches
                .get_one::<PathBuf>("config")
                .cloned()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG)),
            data_file: matches.get_one::<PathBuf>("data").cloned(),
            log_level: matches.get_one::<String>("log-level").cloned(),
            json_logs: matches.get_flag("json-logs"),
            command,
        }
    }
}

fn world_arg() -> Arg {
    Arg::new("world")
        .value_name("WORLD")
        .help("Hardcore world id")
        .required(true)
}

fn command() -> Command {
    Command::new("Hardcore Admin")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Manage per-world hardcore worlds and player state")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .value_parser(value_parser!(PathBuf))
                .default_value(DEFAULT_CONFIG)
                .global(true),
        )
        .arg(
            Arg::new("data")
                .short('d')
                .long("data")
                .value_name("FILE")
                .help("Player state file (overrides storage.data-file)")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)")
                .global(true),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .help("Output logs in JSON format")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(Command::new("reload").about("Validate and reload the hardcore world configuration"))
        .subcommand(Command::new("list").about("List registered hardcore worlds"))
        .subcommand(
            Command::new("status")
                .about("Show a world's dimensions and player counts")
                .arg(world_arg()),
        )
        .subcommand(
            Command::new("cull")
                .about("Find hardcore worlds where every visitor is dead")
                .arg(
                    Arg::new("delete")
                        .long("delete")
                        .help("Delete the worlds and unregister them")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("create")
                .about("Create and register a new hardcore world")
                .arg(world_arg())
                .arg(
                    Arg::new("nether")
                        .long("nether")
                        .help("Also create a nether dimension")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("end")
                        .long("end")
                        .help("Also create an end dimension")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("spectator")
                        .long("spectator")
                        .value_name("BOOL")
                        .help("Keep dead players in the world as spectators")
                        .value_parser(value_parser!(bool)),
                )
                .arg(
                    Arg::new("tp-after-death")
                        .long("tp-after-death")
                        .value_name("BOOL")
                        .help("Let dead players teleport back into the world")
                        .value_parser(value_parser!(bool)),
                ),
        )
        .subcommand(
            Command::new("remove")
                .about("Unregister a hardcore world and forget its player state")
                .arg(world_arg()),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_list() {
        let args = CliArgs::try_parse_from(["hardcore"]).unwrap();
        assert_eq!(args.config_path, PathBuf::from("config.toml"));
        assert_eq!(args.data_file, None);
        assert!(!args.json_logs);
        assert_eq!(args.command, AdminCommand::List);
    }

    #[test]
    fn test_create_arguments() {
        let args = CliArgs::try_parse_from([
            "hardcore",
            "create",
            "hc-2",
            "--end",
            "--tp-after-death",
            "true",
            "--config",
            "server/config.toml",
        ])
        .unwrap();

        assert_eq!(args.config_path, PathBuf::from("server/config.toml"));
        assert_eq!(
            args.command,
            AdminCommand::Create {
                world: "hc-2".to_string(),
                dimensions: vec![HardcoreDimension::Overworld, HardcoreDimension::End],
                policy: PolicyOverride {
                    allow_spectator_on_death: None,
                    allow_teleport_after_death: Some(true),
                },
            }
        );
    }

    #[test]
    fn test_global_flags_and_cull() {
        let args =
            CliArgs::try_parse_from(["hardcore", "--json-logs", "-l", "debug", "cull", "--delete"])
                .unwrap();
        assert!(args.json_logs);
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert_eq!(args.command, AdminCommand::Cull { delete: true });
    }

    #[test]
    fn test_missing_world_is_rejected() {
        assert!(CliArgs::try_parse_from(["hardcore", "status"]).is_err());
        assert!(CliArgs::try_parse_from(["hardcore", "create", "x", "--spectator", "maybe"]).is_err());
    }
}
