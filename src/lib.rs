pub mod client;
pub mod config;
pub mod error;
pub mod network;
pub mod session;
pub mod ui;
pub mod utils;
