//! Console host for the demo binary.
//!
//! Reads a small command language from text lines, keeps the world in a
//! `MemoryHost` and delivers through a `ChannelSink`:
//!
//! ```text
//! /join ann 0 64 0          add a player (optional world name last)
//! /move ann 10 64 0         move a player
//! /wall 5 64 -2 5 66 2      fill a box with solid blocks
//! /nick ann Annabel         set (or clear) a nickname
//! /lang ann Elvish          select the spoken language
//! /learn ann Elvish         learn a language
//! /mode ann yell            whisper | normal | yell | sign
//! /roleplay ann off         toggle roleplay mode
//! ann: hello there          chat as ann
//! /me ann waves             emote; also /ooc, /gooc, /env
//! ```

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::info;

use crate::common::messages::{CommandKind, InboundChat};
use crate::common::types::{BlockPos, ChatMode, Location, PlayerId, PlayerProfile};
use crate::host::channels::{ChannelSink, Delivery};
use crate::host::memory::MemoryHost;
use crate::host::{PlayerDirectory, WorldView};
use crate::pipeline::{PipelineReport, TransformerSystem};

/// Default world for players joined without one.
pub const DEFAULT_WORLD: &str = "overworld";

/// Largest box `/wall` will fill.
pub const MAX_WALL_BLOCKS: u64 = 4096;

/// Problems with a console line.
#[derive(Debug, Error, PartialEq)]
pub enum ConsoleError {
    #[error("Unknown command '{0}' (try /help)")]
    UnknownCommand(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("'{0}' is not a number")]
    BadNumber(String),

    #[error("No player named '{0}'")]
    UnknownPlayer(String),

    #[error("A player named '{0}' is already here")]
    DuplicatePlayer(String),

    #[error("No language named '{0}'")]
    UnknownLanguage(String),

    #[error("'{0}' is not a chat mode (whisper, normal, yell, sign)")]
    UnknownMode(String),
}

/// A parsed console line.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Join { name: String, location: Location },
    Leave { name: String },
    Move { name: String, location: Location },
    Wall { from: BlockPos, to: BlockPos },
    Nick { name: String, nickname: Option<String> },
    Lang { name: String, language: String },
    Learn { name: String, language: String },
    Mode { name: String, mode: ChatMode },
    Roleplay { name: String, enabled: bool },
    Say { name: String, text: String },
    Kind { name: String, kind: CommandKind, text: String },
    Who,
    Help,
    Quit,
}

impl ConsoleCommand {
    /// Parse one input line.
    pub fn parse(line: &str) -> Result<Self, ConsoleError> {
        let line = line.trim();
        let Some(rest) = line.strip_prefix('/') else {
            return parse_say(line);
        };

        let mut parts = rest.splitn(2, char::is_whitespace);
        let command = parts.next().unwrap_or_default().to_lowercase();
        let args = parts.next().unwrap_or_default().trim();
        let words: Vec<&str> = args.split_whitespace().collect();

        match command.as_str() {
            "join" => {
                let (name, location) = name_and_location(&words, "/join <name> <x> <y> <z> [world]")?;
                Ok(Self::Join { name, location })
            }
            "move" => {
                let (name, location) = name_and_location(&words, "/move <name> <x> <y> <z> [world]")?;
                Ok(Self::Move { name, location })
            }
            "leave" => match words.as_slice() {
                [name] => Ok(Self::Leave { name: name.to_string() }),
                _ => Err(ConsoleError::Usage("/leave <name>")),
            },
            "wall" => {
                const USAGE: &str = "/wall <x> <y> <z> [<x2> <y2> <z2>]";
                match words.len() {
                    3 => {
                        let at = block(&words[0..3])?;
                        Ok(Self::Wall { from: at, to: at })
                    }
                    6 => {
                        let (from, to) = (block(&words[0..3])?, block(&words[3..6])?);
                        match box_volume(from, to) {
                            Some(blocks) if blocks <= MAX_WALL_BLOCKS => Ok(Self::Wall { from, to }),
                            _ => Err(ConsoleError::Usage("/wall boxes are limited to 4096 blocks")),
                        }
                    }
                    _ => Err(ConsoleError::Usage(USAGE)),
                }
            }
            "nick" => {
                let (name, nickname) = name_and_text(args).ok_or(ConsoleError::Usage("/nick <name> [nickname]"))?;
                Ok(Self::Nick {
                    name,
                    nickname: (!nickname.is_empty()).then_some(nickname),
                })
            }
            "lang" | "learn" => match words.as_slice() {
                [name, language] => {
                    let (name, language) = (name.to_string(), language.to_string());
                    Ok(if command == "lang" {
                        Self::Lang { name, language }
                    } else {
                        Self::Learn { name, language }
                    })
                }
                _ => Err(ConsoleError::Usage("/lang|/learn <name> <language>")),
            },
            "mode" => match words.as_slice() {
                [name, mode] => Ok(Self::Mode {
                    name: name.to_string(),
                    mode: ChatMode::from_key(mode).ok_or_else(|| ConsoleError::UnknownMode(mode.to_string()))?,
                }),
                _ => Err(ConsoleError::Usage("/mode <name> <whisper|normal|yell|sign>")),
            },
            "roleplay" | "rp" => match words.as_slice() {
                [name, toggle] => Ok(Self::Roleplay {
                    name: name.to_string(),
                    enabled: matches!(toggle.to_lowercase().as_str(), "on" | "true" | "yes" | "1"),
                }),
                _ => Err(ConsoleError::Usage("/roleplay <name> <on|off>")),
            },
            "say" | "me" | "ooc" | "gooc" | "env" => {
                let (name, text) = name_and_text(args).ok_or(ConsoleError::Usage("/<say|me|ooc|gooc|env> <name> <text>"))?;
                if text.is_empty() {
                    return Err(ConsoleError::Usage("/<say|me|ooc|gooc|env> <name> <text>"));
                }
                let kind = match command.as_str() {
                    "say" => CommandKind::Speech,
                    "me" => CommandKind::Emote,
                    "ooc" => CommandKind::Ooc,
                    "gooc" => CommandKind::GlobalOoc,
                    _ => CommandKind::Environmental,
                };
                Ok(Self::Kind { name, kind, text })
            }
            "who" => Ok(Self::Who),
            "help" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(ConsoleError::UnknownCommand(other.to_string())),
        }
    }
}

fn parse_say(line: &str) -> Result<ConsoleCommand, ConsoleError> {
    const USAGE: &str = "<name>: <text>";
    let (name, text) = line.split_once(':').ok_or(ConsoleError::Usage(USAGE))?;
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(ConsoleError::Usage(USAGE));
    }
    Ok(ConsoleCommand::Say {
        name: name.to_string(),
        text: text.trim().to_string(),
    })
}

fn name_and_text(args: &str) -> Option<(String, String)> {
    let mut parts = args.splitn(2, char::is_whitespace);
    let name = parts.next().filter(|n| !n.is_empty())?;
    let text = parts.next().unwrap_or_default().trim();
    Some((name.to_string(), text.to_string()))
}

fn number(word: &str) -> Result<i32, ConsoleError> {
    word.parse()
        .map_err(|_| ConsoleError::BadNumber(word.to_string()))
}

fn block(words: &[&str]) -> Result<BlockPos, ConsoleError> {
    Ok(BlockPos::new(number(words[0])?, number(words[1])?, number(words[2])?))
}

/// Number of blocks in the box spanned by two corners, if it fits in a `u64`.
fn box_volume(from: BlockPos, to: BlockPos) -> Option<u64> {
    let side = |a: i32, b: i32| u64::from(a.abs_diff(b)).checked_add(1);
    side(from.x, to.x)?
        .checked_mul(side(from.y, to.y)?)?
        .checked_mul(side(from.z, to.z)?)
}

fn name_and_location(words: &[&str], usage: &'static str) -> Result<(String, Location), ConsoleError> {
    let world = match words.len() {
        4 => DEFAULT_WORLD,
        5 => words[4],
        _ => return Err(ConsoleError::Usage(usage)),
    };
    let at = block(&words[1..4])?;
    Ok((words[0].to_string(), Location::standing(world, at)))
}

/// Result of executing a command.
#[derive(Debug)]
pub enum Outcome {
    /// A player joined; the receiver yields everything delivered to them.
    Joined {
        id: PlayerId,
        name: String,
        deliveries: mpsc::UnboundedReceiver<Delivery>,
    },
    /// Something to print for the operator.
    Info(String),
    /// A message went through the pipeline.
    Processed(PipelineReport),
    Quit,
}

/// World, delivery channels and pipeline behind the console.
pub struct ConsoleHost {
    world: MemoryHost,
    sink: ChannelSink,
    system: TransformerSystem,
}

impl ConsoleHost {
    pub fn new(system: TransformerSystem) -> Self {
        Self {
            world: MemoryHost::new(),
            sink: ChannelSink::new(),
            system,
        }
    }

    pub fn world(&self) -> &MemoryHost {
        &self.world
    }

    fn player(&self, name: &str) -> Result<PlayerId, ConsoleError> {
        self.world
            .find_by_name(name)
            .ok_or_else(|| ConsoleError::UnknownPlayer(name.to_string()))
    }

    fn language_name(&self, name: &str) -> Result<String, ConsoleError> {
        self.system
            .languages()
            .get(name)
            .map(|l| l.name.clone())
            .ok_or_else(|| ConsoleError::UnknownLanguage(name.to_string()))
    }

    /// Default language for newly joined players.
    fn starting_language(&self) -> Option<String> {
        self.system
            .languages()
            .languages()
            .iter()
            .find(|l| l.is_default && !l.is_sign_language)
            .map(|l| l.name.clone())
    }

    pub fn execute(&self, command: ConsoleCommand) -> Result<Outcome, ConsoleError> {
        match command {
            ConsoleCommand::Join { name, location } => {
                if self.world.find_by_name(&name).is_some() {
                    return Err(ConsoleError::DuplicatePlayer(name));
                }
                let id = self.world.next_id();
                let mut profile = PlayerProfile::new(name.clone());
                profile.current_language = self.starting_language();
                info!(player = id, name = %name, at = %location.block, world = %location.world, "Player joined");
                self.world.add_player(id, profile, location);
                let deliveries = self.sink.register(id);
                Ok(Outcome::Joined { id, name, deliveries })
            }
            ConsoleCommand::Leave { name } => {
                let id = self.player(&name)?;
                self.world.remove_player(id);
                self.sink.unregister(id);
                Ok(Outcome::Info(format!("{} left", name)))
            }
            ConsoleCommand::Move { name, location } => {
                let id = self.player(&name)?;
                let text = format!("{} is now at {} in {}", name, location.block, location.world);
                self.world.move_player(id, location);
                Ok(Outcome::Info(text))
            }
            ConsoleCommand::Wall { from, to } => {
                if box_volume(from, to).map_or(true, |blocks| blocks > MAX_WALL_BLOCKS) {
                    return Err(ConsoleError::Usage("/wall boxes are limited to 4096 blocks"));
                }
                let world = self
                    .world
                    .online_players()
                    .first()
                    .and_then(|id| self.world.location(*id))
                    .map_or_else(|| DEFAULT_WORLD.to_string(), |l| l.world);
                let mut count: u64 = 0;
                for x in from.x.min(to.x)..=from.x.max(to.x) {
                    for y in from.y.min(to.y)..=from.y.max(to.y) {
                        for z in from.z.min(to.z)..=from.z.max(to.z) {
                            self.world.set_solid(&world, BlockPos::new(x, y, z), true);
                            count += 1;
                        }
                    }
                }
                Ok(Outcome::Info(format!("Placed {} solid blocks in {}", count, world)))
            }
            ConsoleCommand::Nick { name, nickname } => {
                let id = self.player(&name)?;
                let text = match &nickname {
                    Some(nick) => format!("{} is now known as {}", name, nick),
                    None => format!("{} cleared their nickname", name),
                };
                self.world.update_profile(id, |p| p.nickname = nickname);
                Ok(Outcome::Info(text))
            }
            ConsoleCommand::Lang { name, language } => {
                let id = self.player(&name)?;
                let language = self.language_name(&language)?;
                let text = format!("{} now speaks {}", name, language);
                self.world.update_profile(id, |p| p.current_language = Some(language));
                Ok(Outcome::Info(text))
            }
            ConsoleCommand::Learn { name, language } => {
                let id = self.player(&name)?;
                let language = self.language_name(&language)?;
                let text = format!("{} learned {}", name, language);
                self.world.update_profile(id, |p| {
                    p.known_languages.insert(language);
                });
                Ok(Outcome::Info(text))
            }
            ConsoleCommand::Mode { name, mode } => {
                let id = self.player(&name)?;
                self.world.update_profile(id, |p| p.chat_mode = mode);
                Ok(Outcome::Info(format!("{} is now in {} mode", name, mode)))
            }
            ConsoleCommand::Roleplay { name, enabled } => {
                let id = self.player(&name)?;
                self.world.update_profile(id, |p| p.roleplay = enabled);
                let state = if enabled { "on" } else { "off" };
                Ok(Outcome::Info(format!("Roleplay mode {} for {}", state, name)))
            }
            ConsoleCommand::Say { name, text } => {
                let id = self.player(&name)?;
                Ok(Outcome::Processed(self.process(InboundChat::chat(id, text))))
            }
            ConsoleCommand::Kind { name, kind, text } => {
                let id = self.player(&name)?;
                Ok(Outcome::Processed(self.process(InboundChat::command(id, kind, text))))
            }
            ConsoleCommand::Who => {
                let lines: Vec<String> = self
                    .world
                    .online_players()
                    .into_iter()
                    .filter_map(|id| {
                        let profile = self.world.profile(id)?;
                        let location = self.world.location(id)?;
                        Some(format!(
                            "  {} ({}) at {} in {}, {} mode, speaks {}",
                            profile.username,
                            profile.display_name(),
                            location.block,
                            location.world,
                            profile.chat_mode,
                            profile.current_language.as_deref().unwrap_or("nothing")
                        ))
                    })
                    .collect();
                if lines.is_empty() {
                    Ok(Outcome::Info("Nobody is here".to_string()))
                } else {
                    Ok(Outcome::Info(lines.join("\n")))
                }
            }
            ConsoleCommand::Help => Ok(Outcome::Info(HELP.to_string())),
            ConsoleCommand::Quit => Ok(Outcome::Quit),
        }
    }

    fn process(&self, inbound: InboundChat) -> PipelineReport {
        self.system
            .process(inbound.with_channel("console"), &self.world, &self.world, &self.sink)
    }
}

const HELP: &str = "\
Commands:
  /join <name> <x> <y> <z> [world]   /leave <name>   /move <name> <x> <y> <z> [world]
  /wall <x> <y> <z> [<x2> <y2> <z2>]
  /nick <name> [nickname]   /lang <name> <language>   /learn <name> <language>
  /mode <name> <whisper|normal|yell|sign>   /roleplay <name> <on|off>
  <name>: <text>   /me <name> <text>   /ooc /gooc /env <name> <text>
  /who   /help   /quit";
