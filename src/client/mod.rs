pub mod commands;
pub mod engine;
pub mod queue;
pub mod state;
pub mod timer;

pub use commands::Command;
pub use engine::{Effect, Effects, Engine, Toast};
pub use queue::{Queue, Track};
pub use state::{PlaybackState, RoomState, Roster, User};
pub use timer::InterpolationTimer;
