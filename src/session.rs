// Session driver

use crate::client::{Command, Effect, Effects, Engine};
use crate::config::RoomPlayerConfig;
use crate::error::CommandError;
use crate::network::Connection;
use crate::ui::{Presenter, UiEvent};
use anyhow::Context;
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tokio_util::codec::{FramedRead, LinesCodec};
use tracing::{debug, info, warn};

const RECONNECT_BASE_DELAY_SECONDS: f64 = 0.1;
const RECONNECT_MAX_EXPONENT: u32 = 5;

fn reconnect_delay(attempt: u32) -> Duration {
    let exponent = attempt.min(RECONNECT_MAX_EXPONENT);
    let delay = RECONNECT_BASE_DELAY_SECONDS * 2_f64.powi(exponent as i32);
    Duration::from_secs_f64(delay)
}

/// Forward stdin lines on a channel that closes at end of input
pub fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut lines = FramedRead::new(tokio::io::stdin(), LinesCodec::new());
        while let Some(line) = lines.next().await {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Failed to read command: {}", e);
                    break;
                }
            }
        }
        debug!("Command reader terminated");
    });
    rx
}

/// Next connection attempt
struct Retry {
    attempt: u32,
    at: Instant,
}

async fn next_frame(inbound: &mut Option<mpsc::UnboundedReceiver<String>>) -> Option<String> {
    match inbound {
        Some(receiver) => receiver.recv().await,
        None => None,
    }
}

enum Event {
    Frame(Option<String>),
    Connect,
    Tick,
    Input(Option<String>),
    Shutdown,
}

pub struct Session<P: Presenter> {
    config: RoomPlayerConfig,
    engine: Engine,
    connection: Connection,
    presenter: P,
}

impl<P: Presenter> Session<P> {
    pub fn new(config: RoomPlayerConfig, presenter: P) -> Self {
        let engine = Engine::new(config.server.user_id, config.tick_interval());
        Self {
            config,
            engine,
            connection: Connection::new(),
            presenter,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Run until the user quits, Ctrl-C, or the server stays unreachable
    pub async fn run(&mut self, mut input: mpsc::UnboundedReceiver<String>) -> anyhow::Result<()> {
        let url = self.config.server_url()?;
        let mut inbound: Option<mpsc::UnboundedReceiver<String>> = None;
        let mut retry = Some(Retry {
            attempt: 0,
            at: Instant::now(),
        });
        let mut input_open = true;

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            let deadline = self.engine.timer().next_deadline().map(Instant::from_std);
            let retry_at = retry.as_ref().map(|r| r.at);
            let event = tokio::select! {
                frame = next_frame(&mut inbound), if inbound.is_some() => Event::Frame(frame),
                _ = sleep_until(retry_at.unwrap_or_else(Instant::now)), if retry_at.is_some() => Event::Connect,
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => Event::Tick,
                line = input.recv(), if input_open => Event::Input(line),
                _ = &mut shutdown => Event::Shutdown,
            };

            match event {
                Event::Frame(Some(text)) => {
                    let effects = self.engine.handle_text(&text);
                    self.apply(effects);
                }
                Event::Frame(None) => {
                    warn!("Connection with server lost");
                    inbound = None;
                    self.connection.disconnect();
                    let effects = self.engine.set_connected(false);
                    self.apply(effects);
                    if !self.config.reconnect.enabled {
                        anyhow::bail!("Connection with server lost");
                    }
                    retry = Some(Retry {
                        attempt: 0,
                        at: Instant::now(),
                    });
                }
                Event::Connect => {
                    let attempt = retry.as_ref().map(|r| r.attempt).unwrap_or(0);
                    let result = tokio::select! {
                        result = self.connection.connect(&url) => result,
                        _ = &mut shutdown => {
                            info!("Interrupted");
                            break;
                        }
                    };
                    match result {
                        Ok(receiver) => {
                            inbound = Some(receiver);
                            retry = None;
                            let effects = self.engine.set_connected(true);
                            self.apply(effects);
                        }
                        Err(e) => {
                            let attempt = attempt.saturating_add(1);
                            let reconnect = &self.config.reconnect;
                            if !reconnect.enabled || attempt > reconnect.max_retries {
                                return Err(e).context("Connection with server failed");
                            }
                            warn!("Connection attempt {} failed: {}", attempt, e);
                            retry = Some(Retry {
                                attempt,
                                at: Instant::now() + reconnect_delay(attempt - 1),
                            });
                        }
                    }
                }
                Event::Tick => {
                    let effects = self.engine.tick();
                    self.apply(effects);
                }
                Event::Input(Some(line)) => {
                    if !self.handle_line(&line) {
                        break;
                    }
                }
                Event::Input(None) => {
                    debug!("Command input closed");
                    input_open = false;
                }
                Event::Shutdown => {
                    info!("Interrupted");
                    break;
                }
            }
        }

        self.connection.disconnect();
        Ok(())
    }

    /// Returns false when the user asked to quit
    fn handle_line(&mut self, line: &str) -> bool {
        match Command::parse(line) {
            Ok(Command::Quit) => false,
            Ok(command) => {
                let effects = self.engine.command(command);
                self.apply(effects);
                true
            }
            Err(CommandError::Empty) => true,
            Err(e) => {
                warn!("{}", e);
                true
            }
        }
    }

    fn apply(&mut self, effects: Effects) {
        for effect in effects {
            if let Effect::Send(message) = &effect {
                if let Err(e) = self.connection.send(message) {
                    warn!("Failed to send {:?}: {}", message, e);
                }
                continue;
            }
            if let Some(event) = UiEvent::from_effect(effect, &self.engine) {
                self.presenter.present(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Vec<UiEvent>,
    }

    impl Presenter for Recorder {
        fn present(&mut self, event: UiEvent) {
            self.events.push(event);
        }
    }

    fn session() -> Session<Recorder> {
        let mut config = RoomPlayerConfig::default();
        config.server.user_id = 1;
        Session::new(config, Recorder::default())
    }

    #[test]
    fn test_reconnect_delay() {
        assert_eq!(reconnect_delay(0), Duration::from_millis(100));
        assert_eq!(reconnect_delay(1), Duration::from_millis(200));
        assert_eq!(reconnect_delay(5), Duration::from_millis(3200));
        assert_eq!(reconnect_delay(40), Duration::from_millis(3200));
    }

    #[test]
    fn test_frames_are_presented() {
        let mut session = session();
        let effects = session.engine.handle_text(
            r#"{"op":"addTrack","tracks":[{"track_id":"a","info":{"title":"A","author":"x","length":1000}}]}"#,
        );
        session.apply(effects);

        let events = &session.presenter().events;
        assert!(matches!(events.first(), Some(UiEvent::Queue(q)) if q.tracks.len() == 1));
        assert!(matches!(events.last(), Some(UiEvent::Player(_))));
    }

    #[test]
    fn test_sends_are_not_presented() {
        let mut session = session();
        session.apply(vec![Effect::Send(crate::network::ClientMessage::InitPlayer)]);
        assert!(session.presenter().events.is_empty());
    }

    #[test]
    fn test_handle_line() {
        let mut session = session();
        assert!(session.handle_line(""));
        assert!(session.handle_line("nonsense"));
        assert!(session.handle_line("pause"));
        assert!(!session.handle_line("quit"));
    }

    #[tokio::test]
    async fn test_quit_while_reconnecting() {
        let mut config = RoomPlayerConfig::default();
        config.server.url = "ws://127.0.0.1:1".to_string();
        let mut session = Session::new(config, Recorder::default());

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send("quit".to_string()).unwrap();
        let result = tokio::time::timeout(Duration::from_secs(5), session.run(rx)).await;
        assert!(matches!(result, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn test_unreachable_server_without_reconnect() {
        let mut config = RoomPlayerConfig::default();
        config.server.url = "ws://127.0.0.1:1".to_string();
        config.reconnect.enabled = false;
        let mut session = Session::new(config, Recorder::default());

        let (_tx, rx) = mpsc::unbounded_channel();
        assert!(session.run(rx).await.is_err());
        assert!(!session.engine().state().playback.is_connected);
    }
}
