pub mod json;
pub mod terminal;

use crate::client::engine::Toast;
use crate::client::queue::Track;
use crate::client::{Effect, Engine};
use crate::network::messages::UserId;
use crate::utils::{format_time, seek_value};
use serde::Serialize;

pub use json::JsonLinesPresenter;
pub use terminal::TerminalPresenter;

pub trait Presenter {
    fn present(&mut self, event: UiEvent);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum UiEvent {
    Player(PlayerView),
    Progress(ProgressView),
    Queue(QueueView),
    SearchResults(SearchResultsView),
    Toast(ToastView),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackView {
    pub id: String,
    pub title: String,
    pub author: String,
    pub image_url: Option<String>,
    pub duration_ms: u64,
    pub duration_label: String,
}

impl From<&Track> for TrackView {
    fn from(track: &Track) -> Self {
        Self {
            id: track.id.to_string(),
            title: track.title.clone(),
            author: track.author.clone(),
            image_url: track.image_url.clone(),
            duration_ms: track.duration_ms,
            duration_label: format_time(track.duration_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub track: Option<TrackView>,
    pub position_ms: u64,
    pub position_label: String,
    pub seek_value: u32,
    /// Show the play icon rather than pause
    pub show_play: bool,
    pub connected: bool,
    pub is_dj: bool,
    pub listeners: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressView {
    pub position_ms: u64,
    pub position_label: String,
    pub duration_label: String,
    pub seek_value: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueView {
    pub tracks: Vec<TrackView>,
    pub current: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultsView {
    pub tracks: Vec<TrackView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToastView {
    pub user_id: UserId,
    pub name: String,
    pub avatar_url: String,
    pub message: String,
    pub timestamp: String,
}

impl From<Toast> for ToastView {
    fn from(toast: Toast) -> Self {
        Self {
            user_id: toast.user.user_id,
            name: toast.user.name,
            avatar_url: toast.user.avatar_url,
            message: toast.message,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl UiEvent {
    /// Build the event an engine effect asks for. Outbound sends have no
    /// presentation and yield None.
    pub fn from_effect(effect: Effect, engine: &Engine) -> Option<Self> {
        match effect {
            Effect::Send(_) => None,
            Effect::Toast(toast) => Some(UiEvent::Toast(toast.into())),
            Effect::RefreshQueue => Some(UiEvent::Queue(QueueView::from_engine(engine))),
            Effect::ShowSearchResults => Some(UiEvent::SearchResults(
                SearchResultsView::from_engine(engine),
            )),
            Effect::RenderProgress => Some(UiEvent::Progress(ProgressView::from_engine(engine))),
            Effect::Render => Some(UiEvent::Player(PlayerView::from_engine(engine))),
        }
    }
}

impl PlayerView {
    pub fn from_engine(engine: &Engine) -> Self {
        let state = engine.state();
        let track = engine.current_track();
        let position_ms = if track.is_some() {
            state.playback.position_ms
        } else {
            0
        };
        let duration_ms = track.map(|t| t.duration_ms).unwrap_or(0);
        Self {
            track: track.map(TrackView::from),
            position_ms,
            position_label: format_time(position_ms),
            seek_value: seek_value(position_ms, duration_ms),
            show_play: state.playback.is_paused || track.is_none(),
            connected: state.playback.is_connected,
            is_dj: state.session.is_dj,
            listeners: state.roster.users().count(),
        }
    }
}

impl ProgressView {
    pub fn from_engine(engine: &Engine) -> Self {
        let position_ms = engine.state().playback.position_ms;
        let duration_ms = engine.current_track().map(|t| t.duration_ms).unwrap_or(0);
        Self {
            position_ms,
            position_label: format_time(position_ms),
            duration_label: format_time(duration_ms),
            seek_value: seek_value(position_ms, duration_ms),
        }
    }
}

impl QueueView {
    pub fn from_engine(engine: &Engine) -> Self {
        let queue = &engine.state().queue;
        Self {
            tracks: queue.tracks().iter().map(TrackView::from).collect(),
            current: queue.current_index(),
        }
    }
}

impl SearchResultsView {
    pub fn from_engine(engine: &Engine) -> Self {
        Self {
            tracks: engine
                .state()
                .search_results
                .iter()
                .map(TrackView::from)
                .collect(),
        }
    }
}
