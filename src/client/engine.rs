// Server message handlers

use crate::client::queue::{Divergence, Track};
use crate::client::state::{RoomState, User};
use crate::client::timer::{advance, InterpolationTimer};
use crate::network::messages::{
    AddTrack, ClientMessage, GetTracks, InitPlayer, MoveTrack, PlayerUpdate, ServerMessage,
    ShuffleTrack, SwapTrack, TrackUpdate, UpdateGuild, UpdatePause, UserId,
};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Side effect requested by the engine, executed by the session driver
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Send(ClientMessage),
    Toast(Toast),
    /// Queue list needs rebuilding
    RefreshQueue,
    ShowSearchResults,
    /// Position moved on a timer tick
    RenderProgress,
    /// Full player render from current state
    Render,
}

/// Transient notification attributed to a room member
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub user: User,
    pub message: String,
}

pub type Effects = Vec<Effect>;

pub struct Engine {
    state: RoomState,
    timer: InterpolationTimer,
}

impl Engine {
    pub fn new(user_id: UserId, tick_interval: Duration) -> Self {
        Self {
            state: RoomState::new(user_id),
            timer: InterpolationTimer::new(tick_interval),
        }
    }

    pub fn state(&self) -> &RoomState {
        &self.state
    }

    pub fn timer(&self) -> &InterpolationTimer {
        &self.timer
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.state.current_track()
    }

    /// Decode and handle a raw frame. Undecodable frames change nothing.
    pub fn handle_text(&mut self, text: &str) -> Effects {
        debug!("Received frame: {}", text);
        match ServerMessage::from_json(text) {
            Ok(message) => self.handle(message),
            Err(e) => {
                warn!("Ignoring server message: {}", e);
                self.finish(Vec::new())
            }
        }
    }

    pub fn handle(&mut self, message: ServerMessage) -> Effects {
        debug!("Handling {}", message.op());
        let mut effects = Vec::new();
        match message {
            ServerMessage::InitPlayer(init) => self.init_player(init, &mut effects),
            ServerMessage::PlayerUpdate(update) => self.player_update(update),
            ServerMessage::TrackUpdate(update) => self.track_update(update, &mut effects),
            ServerMessage::AddTrack(add) => self.add_track(add, &mut effects),
            ServerMessage::GetTracks(results) => self.get_tracks(results, &mut effects),
            ServerMessage::PlayerClose => {
                info!("Player closed by server");
                self.state.reset();
                effects.push(Effect::RefreshQueue);
            }
            ServerMessage::UpdateGuild(update) => self.update_guild(update, &mut effects),
            ServerMessage::UpdatePause(update) => self.update_pause(update, &mut effects),
            ServerMessage::UpdatePosition(update) => {
                self.state.playback.position_ms = update.position;
            }
            ServerMessage::SwapTrack(swap) => self.swap_track(swap, &mut effects),
            ServerMessage::MoveTrack(moved) => self.move_track(moved, &mut effects),
            ServerMessage::ShuffleTrack(shuffle) => self.shuffle_track(shuffle, &mut effects),
            ServerMessage::Unknown(op) => {
                warn!("Invalid action: {}", op);
            }
        }
        self.finish(effects)
    }

    /// Transport connection state changed
    pub fn set_connected(&mut self, connected: bool) -> Effects {
        self.state.playback.is_connected = connected;
        let mut effects = Vec::new();
        if connected {
            effects.push(Effect::Send(ClientMessage::InitPlayer));
        }
        self.finish(effects)
    }

    /// One interpolation timer tick
    pub fn tick(&mut self) -> Effects {
        let Some(duration) = self.current_track().map(|track| track.duration_ms) else {
            self.timer.stop();
            return Vec::new();
        };
        match advance(
            self.state.playback.position_ms,
            duration,
            self.timer.interval_ms(),
        ) {
            Some(position) => {
                self.state.playback.position_ms = position;
                self.timer.rearm();
                vec![Effect::RenderProgress]
            }
            None => {
                debug!("Reached end of track, waiting for server");
                self.timer.stop();
                Vec::new()
            }
        }
    }

    pub(crate) fn toast(&self, user_id: Option<UserId>, message: impl Into<String>) -> Option<Effect> {
        let user_id = user_id?;
        let Some(user) = self.state.roster.get_user(user_id) else {
            debug!("No roster entry for {}, dropping toast", user_id);
            return None;
        };
        Some(Effect::Toast(Toast {
            user: user.clone(),
            message: message.into(),
        }))
    }

    pub(crate) fn finish(&mut self, mut effects: Effects) -> Effects {
        self.sync_timer();
        effects.push(Effect::Render);
        effects
    }

    /// Run the timer only while a track is playing and has time left
    fn sync_timer(&mut self) {
        let playback = &self.state.playback;
        let should_run = !playback.is_paused
            && self
                .current_track()
                .map(|track| playback.position_ms < track.duration_ms)
                .unwrap_or(false);
        if should_run {
            self.timer.start();
        } else {
            self.timer.stop();
        }
    }

    fn resync(&self, op: &str, divergence: Divergence, effects: &mut Effects) {
        warn!("{} diverged from local queue ({}), requesting resync", op, divergence);
        effects.push(Effect::Send(ClientMessage::InitPlayer));
    }

    fn init_player(&mut self, init: InitPlayer, effects: &mut Effects) {
        info!(
            "Initializing player with {} tracks at position {}",
            init.tracks.len(),
            init.current_queue_position
        );
        self.state.reset();
        self.state
            .queue
            .append(init.tracks.into_iter().map(Track::from));
        self.state.queue.set_position(init.current_queue_position);
        self.state.session.is_dj = init.is_dj;
        self.state.playback.is_paused = init.is_paused;
        self.state.playback.position_ms = init.current_position;
        self.state.roster.clear();
        for user in init.users {
            self.state.roster.add_user(User::from(user));
        }
        effects.push(Effect::RefreshQueue);
    }

    fn player_update(&mut self, update: PlayerUpdate) {
        let playback = &mut self.state.playback;
        playback.last_server_update = update.last_update;
        playback.is_connected = update.is_connected;
        playback.position_ms = update.last_position;
    }

    fn track_update(&mut self, update: TrackUpdate, effects: &mut Effects) {
        let found = self
            .state
            .queue
            .peek_position(update.current_queue_position)
            .map(|track| &track.id);
        if found != update.track_id.as_ref() {
            warn!(
                "Track update expected {:?} but queue has {:?}, requesting resync",
                update.track_id, found
            );
            effects.push(Effect::Send(ClientMessage::InitPlayer));
            return;
        }
        self.state.queue.set_position(update.current_queue_position);
        self.state.playback.is_paused = update.is_paused;
    }

    fn add_track(&mut self, add: AddTrack, effects: &mut Effects) {
        let message = match add.tracks.as_slice() {
            [] => None,
            [single] => Some(format!("Added {} into the queue.", single.info.title)),
            many => Some(format!("Added {} songs into the queue.", many.len())),
        };
        let added = self
            .state
            .queue
            .append(add.tracks.into_iter().map(Track::from));
        debug!("Appended {} tracks to the queue", added);
        effects.push(Effect::RefreshQueue);
        if let Some(toast) = message.and_then(|m| self.toast(add.requester_id, m)) {
            effects.push(toast);
        }
    }

    fn get_tracks(&mut self, results: GetTracks, effects: &mut Effects) {
        if let Some(tracks) = results.tracks {
            self.state.search_results = tracks.into_iter().map(Track::from).collect();
        }
        effects.push(Effect::ShowSearchResults);
    }

    fn update_guild(&mut self, update: UpdateGuild, effects: &mut Effects) {
        let joined = update.is_joined().unwrap_or(false);
        let user_id = update.user.user_id;

        if self.state.is_local_user(user_id) {
            if joined {
                effects.push(Effect::Send(ClientMessage::InitPlayer));
            } else {
                info!("Left the room, resetting player");
                self.state.reset();
                effects.push(Effect::RefreshQueue);
            }
        }

        if joined {
            self.state.roster.add_user(User::from(update.user));
            if let Some(toast) = self.toast(Some(user_id), "Joined your channel!") {
                effects.push(toast);
            }
        } else if let Some(user) = self.state.roster.remove_user(user_id) {
            effects.push(Effect::Toast(Toast {
                user,
                message: "Left your channel!".to_string(),
            }));
        }
    }

    fn update_pause(&mut self, update: UpdatePause, effects: &mut Effects) {
        self.state.playback.is_paused = update.pause;
        let message = if update.pause {
            "Paused the player."
        } else {
            "Resumed the player."
        };
        if let Some(toast) = self.toast(update.requester_id, message) {
            effects.push(toast);
        }
    }

    fn swap_track(&mut self, swap: SwapTrack, effects: &mut Effects) {
        // The payload describes the layout after the swap: position1's
        // track currently sits at position2 and vice versa.
        let result = self.state.queue.swap(
            swap.position2.index,
            swap.position1.track_id.as_ref(),
            swap.position1.index,
            swap.position2.track_id.as_ref(),
        );
        let (first, second) = match result {
            Ok(indices) => indices,
            Err(divergence) => return self.resync("swapTrack", divergence, effects),
        };
        let tracks = self.state.queue.tracks();
        let message = format!(
            "{} and {} are swapped",
            tracks[second].title, tracks[first].title
        );
        effects.push(Effect::RefreshQueue);
        if let Some(toast) = self.toast(swap.requester_id, message) {
            effects.push(toast);
        }
    }

    fn move_track(&mut self, moved: MoveTrack, effects: &mut Effects) {
        let result = self.state.queue.move_track(
            moved.position.index,
            moved.position.track_id.as_ref(),
            moved.new_position.index,
        );
        let destination = match result {
            Ok(destination) => destination,
            Err(divergence) => return self.resync("moveTrack", divergence, effects),
        };
        let title = self.state.queue.tracks()[destination].title.clone();
        effects.push(Effect::RefreshQueue);
        if let Some(toast) = self.toast(
            moved.requester_id,
            format!("Moved {} to {}", title, destination),
        ) {
            effects.push(toast);
        }
    }

    fn shuffle_track(&mut self, shuffle: ShuffleTrack, effects: &mut Effects) {
        let Some(tracks) = shuffle.tracks else {
            debug!("Shuffle message without tracks");
            return;
        };
        self.state
            .queue
            .replace(tracks.into_iter().map(Track::from).collect());
        effects.push(Effect::RefreshQueue);
        if let Some(toast) = self.toast(shuffle.requester_id, "The queue is shuffled.") {
            effects.push(toast);
        }
    }
}
