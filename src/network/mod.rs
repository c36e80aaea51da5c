pub mod connection;
pub mod messages;
pub mod tls;

pub use connection::Connection;
pub use messages::{ClientMessage, ServerMessage};
