// User command handlers

use crate::client::engine::{Effect, Effects, Engine};
use crate::error::CommandError;
use crate::network::messages::{ClientMessage, SlotIndex};
use crate::utils::{position_from_seek, SEEK_BAR_RESOLUTION};
use tracing::{debug, info};

/// Shuffling needs more than this many tracks from the cursor onward
const MIN_TRACKS_TO_SHUFFLE: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    TogglePause,
    SkipTo(u32),
    BackTo(u32),
    /// Seek bar value in `0..=500`
    Seek(f64),
    Shuffle,
    Move { from: i64, to: i64 },
    Resync,
    Quit,
}

impl Command {
    /// Parse a command line such as `skip 2` or `move -1 3`
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let words = shell_words::split(line).map_err(|_| CommandError::Quoting)?;
        let Some((name, args)) = words.split_first() else {
            return Err(CommandError::Empty);
        };

        match name.to_ascii_lowercase().as_str() {
            "pause" | "play" | "p" => Ok(Self::TogglePause),
            "skip" | "next" => Ok(Self::SkipTo(optional_arg("skip", args.first())?.unwrap_or(1))),
            "back" | "prev" => Ok(Self::BackTo(optional_arg("back", args.first())?.unwrap_or(1))),
            "seek" => {
                let value: f64 = required_arg("seek", args.first())?;
                if !(0.0..=SEEK_BAR_RESOLUTION as f64).contains(&value) {
                    return Err(CommandError::InvalidArgument {
                        command: "seek",
                        value: value.to_string(),
                    });
                }
                Ok(Self::Seek(value))
            }
            "shuffle" => Ok(Self::Shuffle),
            "move" => Ok(Self::Move {
                from: required_arg("move", args.first())?,
                to: required_arg("move", args.get(1))?,
            }),
            "sync" | "resync" => Ok(Self::Resync),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn optional_arg<T: std::str::FromStr>(
    command: &'static str,
    arg: Option<&String>,
) -> Result<Option<T>, CommandError> {
    arg.map(|value| {
        value.parse().map_err(|_| CommandError::InvalidArgument {
            command,
            value: value.clone(),
        })
    })
    .transpose()
}

fn required_arg<T: std::str::FromStr>(
    command: &'static str,
    arg: Option<&String>,
) -> Result<T, CommandError> {
    optional_arg(command, arg)?.ok_or(CommandError::MissingArgument(command))
}

impl Engine {
    /// Turn a user command into outbound messages. Nothing is applied
    /// locally; the server's confirmation drives the state.
    pub fn command(&mut self, command: Command) -> Effects {
        info!("User command: {:?}", command);
        match command {
            Command::TogglePause => vec![self.toggle_pause()],
            Command::SkipTo(index) => vec![Effect::Send(ClientMessage::SkipTo { index })],
            Command::BackTo(index) => vec![Effect::Send(ClientMessage::BackTo { index })],
            Command::Seek(value) => self.seek_to(value).into_iter().collect(),
            Command::Shuffle => self.shuffle().into_iter().collect(),
            Command::Move { from, to } => vec![Effect::Send(ClientMessage::MoveTrack {
                position: SlotIndex { index: from },
                new_position: SlotIndex { index: to },
            })],
            Command::Resync => vec![Effect::Send(ClientMessage::InitPlayer)],
            Command::Quit => Vec::new(),
        }
    }

    fn toggle_pause(&self) -> Effect {
        Effect::Send(ClientMessage::UpdatePause {
            pause: !self.state().playback.is_paused,
        })
    }

    fn seek_to(&self, value: f64) -> Option<Effect> {
        let Some(track) = self.current_track() else {
            debug!("Seek ignored, nothing is playing");
            return None;
        };
        Some(Effect::Send(ClientMessage::UpdatePosition {
            position: position_from_seek(value, track.duration_ms),
        }))
    }

    fn shuffle(&self) -> Option<Effect> {
        if self.state().queue.remaining() > MIN_TRACKS_TO_SHUFFLE {
            return Some(Effect::Send(ClientMessage::ShuffleTrack));
        }
        self.toast(
            Some(self.state().session.user_id),
            "Add more songs to the queue before shuffling.",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::messages::ServerMessage;
    use serde_json::json;
    use std::time::Duration;

    fn engine_with_queue(count: usize, position: i64) -> Engine {
        let mut engine = Engine::new(1, Duration::from_millis(1000));
        let tracks: Vec<_> = (0..count)
            .map(|i| {
                json!({
                    "track_id": format!("t{}", i),
                    "info": { "title": format!("Song {}", i), "author": "", "length": 200_000 }
                })
            })
            .collect();
        engine.handle(
            ServerMessage::from_value(json!({
                "op": "initPlayer",
                "tracks": tracks,
                "current_queue_position": position,
                "is_paused": false,
                "current_position": 0,
                "users": [{ "user_id": 1, "avatar_url": "", "name": "me" }]
            }))
            .unwrap(),
        );
        engine
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("pause"), Ok(Command::TogglePause));
        assert_eq!(Command::parse("skip"), Ok(Command::SkipTo(1)));
        assert_eq!(Command::parse("back 3"), Ok(Command::BackTo(3)));
        assert_eq!(Command::parse("seek 250"), Ok(Command::Seek(250.0)));
        assert_eq!(
            Command::parse("move -1 2"),
            Ok(Command::Move { from: -1, to: 2 })
        );
        assert_eq!(Command::parse("  QUIT "), Ok(Command::Quit));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Command::parse(""), Err(CommandError::Empty));
        assert_eq!(
            Command::parse("dance"),
            Err(CommandError::Unknown("dance".to_string()))
        );
        assert_eq!(
            Command::parse("move 1"),
            Err(CommandError::MissingArgument("move"))
        );
        assert!(matches!(
            Command::parse("seek 900"),
            Err(CommandError::InvalidArgument { command: "seek", .. })
        ));
        assert!(matches!(
            Command::parse("skip x"),
            Err(CommandError::InvalidArgument { command: "skip", .. })
        ));
        assert_eq!(Command::parse("skip \"1"), Err(CommandError::Quoting));
    }

    #[test]
    fn test_toggle_pause_sends_inverse() {
        let mut engine = engine_with_queue(2, 1);
        assert_eq!(
            engine.command(Command::TogglePause),
            vec![Effect::Send(ClientMessage::UpdatePause { pause: true })]
        );
        // not applied until the server confirms
        assert!(!engine.state().playback.is_paused);
    }

    #[test]
    fn test_seek_scales_to_duration() {
        let mut engine = engine_with_queue(2, 1);
        assert_eq!(
            engine.command(Command::Seek(125.0)),
            vec![Effect::Send(ClientMessage::UpdatePosition { position: 50_000 })]
        );

        let mut idle = engine_with_queue(2, 0);
        assert!(idle.command(Command::Seek(125.0)).is_empty());
    }

    #[test]
    fn test_shuffle_guard() {
        let mut engine = engine_with_queue(5, 1);
        assert_eq!(
            engine.command(Command::Shuffle),
            vec![Effect::Send(ClientMessage::ShuffleTrack)]
        );

        let mut short = engine_with_queue(5, 3);
        let effects = short.command(Command::Shuffle);
        assert_eq!(effects.len(), 1);
        assert!(matches!(
            &effects[0],
            Effect::Toast(toast) if toast.message == "Add more songs to the queue before shuffling."
        ));
    }

    #[test]
    fn test_move_and_navigation() {
        let mut engine = engine_with_queue(4, 1);
        assert_eq!(
            engine.command(Command::Move { from: 2, to: 1 }),
            vec![Effect::Send(ClientMessage::MoveTrack {
                position: SlotIndex { index: 2 },
                new_position: SlotIndex { index: 1 },
            })]
        );
        assert_eq!(
            engine.command(Command::SkipTo(2)),
            vec![Effect::Send(ClientMessage::SkipTo { index: 2 })]
        );
        assert_eq!(
            engine.command(Command::Resync),
            vec![Effect::Send(ClientMessage::InitPlayer)]
        );
    }
}
