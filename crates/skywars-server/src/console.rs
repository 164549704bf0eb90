//! Console commands that stand in for in-game players.

use skywars_api::{BlockPos, EventResult, TouchedBlock};
use skywars_archive::ArchiveScheduler;
use skywars_setup::{ArenaEditCoordinator, SetupError};
use tracing::warn;

use crate::host::ConsoleHost;

const HELP: &[&str] = &[
    "join <player>                      bring a player online",
    "quit <player>                      take a player offline",
    "setup <player>                     open the new arena form",
    "settings <player>                  open the arena settings menu",
    "stats <player>                     show player stats",
    "npc <player>                       capture the three NPC anchors",
    "edit <player> <arena>              edit an arena world",
    "spawns <player> <arena>            capture spawn pedestals",
    "spectator <player> <arena>         capture the spectator spawn",
    "sign <player> <arena>              capture the join sign",
    "finish <arena>                     end editing and archive the world",
    "click <player> <x> <y> <z> [world] [slab]   touch a block",
    "respond <player> <json>|close      answer the open form",
    "arenas                             list arenas",
    "stop                               shut down",
];

/// A parsed console line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Join(String),
    Quit(String),
    Setup(String),
    Settings(String),
    Stats(String),
    Npc(String),
    Edit { player: String, arena: String },
    Spawns { player: String, arena: String },
    Spectator { player: String, arena: String },
    Sign { player: String, arena: String },
    Finish(String),
    Click {
        player: String,
        position: BlockPos,
        world: Option<String>,
        slab: bool,
    },
    /// `data` is `None` when the form is closed.
    Respond { player: String, data: Option<String> },
    Arenas,
    Stop,
}

/// Result of running a command.
#[derive(Debug, Default)]
pub struct CommandResult {
    pub success: bool,
    /// Lines printed back on the console.
    pub messages: Vec<String>,
    /// If true, the server should shut down.
    pub should_stop: bool,
}

impl CommandResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            messages: vec![message.into()],
            should_stop: false,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            messages: vec![message.into()],
            should_stop: false,
        }
    }
}

fn usage(command: &str) -> String {
    HELP.iter()
        .find(|line| line.starts_with(command))
        .map(|line| format!("Usage: {}", line.split("  ").next().unwrap_or(line)))
        .unwrap_or_else(|| format!("Unknown command: {command}"))
}

/// Parse one console line.
pub fn parse(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let args: Vec<&str> = rest.split_whitespace().collect();

    let one = |args: &[&str]| match args {
        [player] => Ok(player.to_string()),
        _ => Err(usage(name)),
    };
    let two = |args: &[&str]| match args {
        [player, arena] => Ok((player.to_string(), arena.to_string())),
        _ => Err(usage(name)),
    };

    match name.to_lowercase().as_str() {
        "help" | "?" => Ok(Command::Help),
        "join" => one(&args).map(Command::Join),
        "quit" => one(&args).map(Command::Quit),
        "setup" => one(&args).map(Command::Setup),
        "settings" => one(&args).map(Command::Settings),
        "stats" => one(&args).map(Command::Stats),
        "npc" => one(&args).map(Command::Npc),
        "edit" => two(&args).map(|(player, arena)| Command::Edit { player, arena }),
        "spawns" => two(&args).map(|(player, arena)| Command::Spawns { player, arena }),
        "spectator" => two(&args).map(|(player, arena)| Command::Spectator { player, arena }),
        "sign" => two(&args).map(|(player, arena)| Command::Sign { player, arena }),
        "finish" => one(&args).map(Command::Finish),
        "click" => parse_click(&args).ok_or_else(|| usage("click")),
        "respond" => {
            let (player, data) = rest.split_once(char::is_whitespace).ok_or_else(|| usage("respond"))?;
            let data = data.trim();
            Ok(Command::Respond {
                player: player.to_string(),
                data: (!data.eq_ignore_ascii_case("close")).then(|| data.to_string()),
            })
        }
        "arenas" => Ok(Command::Arenas),
        "stop" => Ok(Command::Stop),
        _ => Err(format!("Unknown command: {name}. Type 'help' for a list.")),
    }
}

fn parse_click(args: &[&str]) -> Option<Command> {
    let (player, coords, extra) = match args {
        [player, x, y, z, extra @ ..] if extra.len() <= 2 => (player, [x, y, z], extra),
        _ => return None,
    };
    let [x, y, z] = coords.map(|c| c.parse::<i32>().ok());
    let mut world = None;
    let mut slab = false;
    for arg in extra {
        if arg.eq_ignore_ascii_case("slab") {
            slab = true;
        } else {
            world = Some(arg.to_string());
        }
    }
    Some(Command::Click {
        player: player.to_string(),
        position: BlockPos::new(x?, y?, z?),
        world,
        slab,
    })
}

/// Run a command against the coordinator.
pub fn execute<J: ArchiveScheduler>(
    command: Command,
    coord: &mut ArenaEditCoordinator<J>,
    host: &mut ConsoleHost,
) -> CommandResult {
    // Requests made on behalf of a player need that player online.
    let player_of = |command: &Command| -> Option<String> {
        match command {
            Command::Setup(p)
            | Command::Settings(p)
            | Command::Stats(p)
            | Command::Npc(p)
            | Command::Edit { player: p, .. }
            | Command::Spawns { player: p, .. }
            | Command::Spectator { player: p, .. }
            | Command::Sign { player: p, .. }
            | Command::Click { player: p, .. }
            | Command::Respond { player: p, .. } => Some(p.clone()),
            _ => None,
        }
    };
    if let Some(player) = player_of(&command) {
        if !host.is_online(&player) {
            return CommandResult::err(format!("{player} is not online"));
        }
    }

    match command {
        Command::Help => CommandResult {
            success: true,
            messages: HELP.iter().map(|s| s.to_string()).collect(),
            should_stop: false,
        },
        Command::Join(player) => {
            if host.join(&player) {
                CommandResult::ok(format!("{player} joined"))
            } else {
                CommandResult::err(format!("{player} is already online"))
            }
        }
        Command::Quit(player) => {
            if !host.is_online(&player) {
                return CommandResult::err(format!("{player} is not online"));
            }
            coord.on_player_quit(host, &player);
            host.quit(&player);
            CommandResult::ok(format!("{player} left"))
        }
        Command::Setup(player) => reported(coord, host, &player, |c, h| c.open_setup(h, &player)),
        Command::Settings(player) => reported(coord, host, &player, |c, h| c.open_settings(h, &player)),
        Command::Stats(player) => reported(coord, host, &player, |c, h| c.show_stats(h, &player)),
        Command::Npc(player) => reported(coord, host, &player, |c, h| c.begin_npc_capture(h, &player)),
        Command::Edit { player, arena } => {
            reported(coord, host, &player, |c, _| c.begin_edit(&player, &arena).map(drop))
        }
        Command::Spawns { player, arena } => {
            reported(coord, host, &player, |c, _| c.begin_spawn_capture(&player, &arena).map(drop))
        }
        Command::Spectator { player, arena } => reported(coord, host, &player, |c, _| {
            c.begin_spectator_capture(&player, &arena).map(drop)
        }),
        Command::Sign { player, arena } => {
            reported(coord, host, &player, |c, h| c.begin_sign_capture(h, &player, &arena))
        }
        Command::Finish(arena) => match coord.end_edit(host, &arena) {
            Ok(id) => CommandResult::ok(format!("Archiving {arena} ({id})")),
            Err(e) => CommandResult::err(e.to_string()),
        },
        Command::Click {
            player,
            position,
            world,
            slab,
        } => {
            let world = world
                .or_else(|| host.player(&player).map(|p| p.world.clone()))
                .unwrap_or_default();
            let block = TouchedBlock {
                position,
                world,
                is_slab: slab,
            };
            let held = host.held_item(&player);
            match coord.on_capture_event(host, &player, &block, &held) {
                EventResult::Cancelled => CommandResult::ok("Block interaction consumed by setup"),
                EventResult::Continue => CommandResult::ok("Block interaction passed through"),
            }
        }
        Command::Respond { player, data } => {
            let Some((form_id, _)) = host.last_form(&player).cloned() else {
                return CommandResult::err(format!("{player} has no open form"));
            };
            host.close_form(&player);
            reported(coord, host, &player, |c, h| {
                c.on_form_response(h, &player, form_id, data.as_deref())
            })
        }
        Command::Arenas => {
            let names = coord.arena_names();
            if names.is_empty() {
                return CommandResult::ok("No arenas configured");
            }
            CommandResult {
                success: true,
                messages: names
                    .iter()
                    .map(|name| match coord.phase(name) {
                        Some(phase) => format!("{name}: {phase:?}"),
                        None => name.clone(),
                    })
                    .collect(),
                should_stop: false,
            }
        }
        Command::Stop => CommandResult {
            success: true,
            messages: vec!["Stopping".into()],
            should_stop: true,
        },
    }
}

/// Run a player request; failures go to the player and the console.
fn reported<J, F>(
    coord: &mut ArenaEditCoordinator<J>,
    host: &mut ConsoleHost,
    player: &str,
    request: F,
) -> CommandResult
where
    J: ArchiveScheduler,
    F: FnOnce(&mut ArenaEditCoordinator<J>, &mut ConsoleHost) -> Result<(), SetupError>,
{
    match request(coord, host) {
        Ok(()) => CommandResult {
            success: true,
            ..Default::default()
        },
        Err(e) => {
            warn!("Request from {player} failed: {e}");
            coord.report(host, player, &e);
            CommandResult::err(e.to_string())
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
