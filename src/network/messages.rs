use crate::error::ProtocolError;
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

pub type UserId = u64;

/// Server-assigned track identifier; accepted as a JSON string or number
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TrackId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(id) => Ok(Self(id)),
            Value::Number(id) => Ok(Self(id.to_string())),
            other => Err(de::Error::custom(format!("invalid track id: {}", other))),
        }
    }
}

/// Millisecond values arrive as integers or floats depending on the sender
fn millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    if let Some(ms) = value.as_u64() {
        return Ok(ms);
    }
    match value.as_f64() {
        Some(ms) if ms.is_finite() => Ok(ms.max(0.0).round() as u64),
        _ => Err(de::Error::custom(format!("invalid millisecond value: {}", value))),
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TrackInfo {
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(deserialize_with = "millis")]
    pub length: u64,
}

/// Track as sent by the server
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TrackPayload {
    pub track_id: TrackId,
    #[serde(default)]
    pub thumbnail: Option<String>,
    pub info: TrackInfo,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserPayload {
    pub user_id: UserId,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_joined: Option<bool>,
}

/// Queue slot given as an offset from the current queue position
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QueueSlot {
    pub index: i64,
    #[serde(default)]
    pub track_id: Option<TrackId>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InitPlayer {
    pub tracks: Vec<TrackPayload>,
    pub current_queue_position: i64,
    #[serde(default)]
    pub is_dj: bool,
    pub is_paused: bool,
    #[serde(deserialize_with = "millis")]
    pub current_position: u64,
    #[serde(default)]
    pub users: Vec<UserPayload>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlayerUpdate {
    #[serde(deserialize_with = "millis")]
    pub last_update: u64,
    pub is_connected: bool,
    #[serde(deserialize_with = "millis")]
    pub last_position: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrackUpdate {
    pub current_queue_position: i64,
    pub is_paused: bool,
    #[serde(default)]
    pub track_id: Option<TrackId>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AddTrack {
    pub tracks: Vec<TrackPayload>,
    #[serde(default)]
    pub requester_id: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GetTracks {
    #[serde(default)]
    pub tracks: Option<Vec<TrackPayload>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpdateGuild {
    pub user: UserPayload,
    #[serde(default)]
    pub is_joined: Option<bool>,
}

impl UpdateGuild {
    /// The flag lives at the top level but older servers nest it in `user`
    pub fn is_joined(&self) -> Option<bool> {
        self.is_joined.or(self.user.is_joined)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpdatePause {
    pub pause: bool,
    #[serde(default)]
    pub requester_id: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpdatePosition {
    #[serde(deserialize_with = "millis")]
    pub position: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SwapTrack {
    pub position1: QueueSlot,
    pub position2: QueueSlot,
    #[serde(default)]
    pub requester_id: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MoveTrack {
    pub position: QueueSlot,
    #[serde(rename = "newPosition")]
    pub new_position: QueueSlot,
    #[serde(default)]
    pub requester_id: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ShuffleTrack {
    #[serde(default)]
    pub tracks: Option<Vec<TrackPayload>>,
    #[serde(default)]
    pub requester_id: Option<UserId>,
}

/// Messages pushed by the playback server
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    InitPlayer(InitPlayer),
    PlayerUpdate(PlayerUpdate),
    TrackUpdate(TrackUpdate),
    AddTrack(AddTrack),
    GetTracks(GetTracks),
    PlayerClose,
    UpdateGuild(UpdateGuild),
    UpdatePause(UpdatePause),
    UpdatePosition(UpdatePosition),
    SwapTrack(SwapTrack),
    MoveTrack(MoveTrack),
    ShuffleTrack(ShuffleTrack),
    /// An op this client does not know about
    Unknown(String),
}

impl ServerMessage {
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, ProtocolError> {
        let op = value
            .get("op")
            .and_then(Value::as_str)
            .ok_or(ProtocolError::MissingOp)?
            .to_string();

        let message = match op.as_str() {
            "initPlayer" => Self::InitPlayer(payload(&op, value)?),
            "playerUpdate" => Self::PlayerUpdate(payload(&op, value)?),
            "trackUpdate" => Self::TrackUpdate(payload(&op, value)?),
            "addTrack" => Self::AddTrack(payload(&op, value)?),
            "getTracks" => Self::GetTracks(payload(&op, value)?),
            "playerClose" => Self::PlayerClose,
            "updateGuild" => {
                let update: UpdateGuild = payload(&op, value)?;
                if update.is_joined().is_none() {
                    return Err(ProtocolError::MissingField {
                        op: op.clone(),
                        field: "is_joined",
                    });
                }
                Self::UpdateGuild(update)
            }
            "updatePause" => Self::UpdatePause(payload(&op, value)?),
            "updatePosition" => Self::UpdatePosition(payload(&op, value)?),
            "swapTrack" => Self::SwapTrack(payload(&op, value)?),
            "moveTrack" => Self::MoveTrack(payload(&op, value)?),
            "shuffleTrack" => Self::ShuffleTrack(payload(&op, value)?),
            _ => Self::Unknown(op.clone()),
        };
        Ok(message)
    }

    pub fn op(&self) -> &str {
        match self {
            Self::InitPlayer(_) => "initPlayer",
            Self::PlayerUpdate(_) => "playerUpdate",
            Self::TrackUpdate(_) => "trackUpdate",
            Self::AddTrack(_) => "addTrack",
            Self::GetTracks(_) => "getTracks",
            Self::PlayerClose => "playerClose",
            Self::UpdateGuild(_) => "updateGuild",
            Self::UpdatePause(_) => "updatePause",
            Self::UpdatePosition(_) => "updatePosition",
            Self::SwapTrack(_) => "swapTrack",
            Self::MoveTrack(_) => "moveTrack",
            Self::ShuffleTrack(_) => "shuffleTrack",
            Self::Unknown(op) => op,
        }
    }
}

fn payload<T: DeserializeOwned>(op: &str, value: Value) -> Result<T, ProtocolError> {
    serde_json::from_value(value).map_err(|source| ProtocolError::Malformed {
        op: op.to_string(),
        source,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotIndex {
    pub index: i64,
}

/// Messages sent to the playback server
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Ask the server to resend the full player state
    InitPlayer,
    MoveTrack {
        position: SlotIndex,
        #[serde(rename = "newPosition")]
        new_position: SlotIndex,
    },
    UpdatePause {
        pause: bool,
    },
    SkipTo {
        index: u32,
    },
    BackTo {
        index: u32,
    },
    UpdatePosition {
        position: u64,
    },
    ShuffleTrack,
}

impl ClientMessage {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
