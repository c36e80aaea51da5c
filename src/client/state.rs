use crate::client::queue::{Queue, Track};
use crate::network::messages::{UserId, UserPayload};
use std::collections::HashMap;

/// Room member
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub user_id: UserId,
    pub name: String,
    pub avatar_url: String,
}

impl From<UserPayload> for User {
    fn from(payload: UserPayload) -> Self {
        Self {
            user_id: payload.user_id,
            name: payload.name,
            avatar_url: payload.avatar_url,
        }
    }
}

/// Playback state mirrored from the server
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlaybackState {
    pub is_paused: bool,
    /// Local estimate between server updates
    pub position_ms: u64,
    pub last_server_update: u64,
    pub is_connected: bool,
}

/// Users currently in the room, keyed by id
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Roster {
    users: HashMap<UserId, User>,
}

impl Roster {
    pub fn add_user(&mut self, user: User) {
        self.users.insert(user.user_id, user);
    }

    pub fn remove_user(&mut self, user_id: UserId) -> Option<User> {
        self.users.remove(&user_id)
    }

    pub fn get_user(&self, user_id: UserId) -> Option<&User> {
        self.users.get(&user_id)
    }

    pub fn contains(&self, user_id: UserId) -> bool {
        self.users.contains_key(&user_id)
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn clear(&mut self) {
        self.users.clear();
    }
}

/// Identity of the local listener
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: UserId,
    pub is_dj: bool,
}

/// Everything the client mirrors about the room
#[derive(Debug, Clone, PartialEq)]
pub struct RoomState {
    pub session: Session,
    pub playback: PlaybackState,
    pub queue: Queue,
    pub roster: Roster,
    /// Last search response; not part of playback
    pub search_results: Vec<Track>,
}

impl RoomState {
    pub fn new(user_id: UserId) -> Self {
        Self {
            session: Session {
                user_id,
                is_dj: false,
            },
            playback: PlaybackState::default(),
            queue: Queue::new(),
            roster: Roster::default(),
            search_results: Vec::new(),
        }
    }

    /// Drop back to idle: no queue, no current track, position zero.
    /// Roster, identity, connection flag and search results survive.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.playback.position_ms = 0;
        self.playback.is_paused = false;
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.queue.current()
    }

    pub fn is_local_user(&self, user_id: UserId) -> bool {
        self.session.user_id == user_id
    }
}
