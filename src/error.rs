use thiserror::Error;

/// Errors raised while decoding an inbound server frame
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("message has no op field")]
    MissingOp,

    #[error("malformed {op} payload: {source}")]
    Malformed {
        op: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{op} payload is missing `{field}`")]
    MissingField { op: String, field: &'static str },
}

/// Transport errors
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("TLS setup failed: {0}")]
    Tls(String),

    #[error("unsupported url scheme: {0}")]
    UnsupportedScheme(String),

    #[error("connection attempt timed out")]
    Timeout,

    #[error("not connected to server")]
    NotConnected,

    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("failed to write config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid server url: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Reasons a user command could not be parsed
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command: {0}")]
    Unknown(String),

    #[error("invalid argument for {command}: {value}")]
    InvalidArgument { command: &'static str, value: String },

    #[error("missing argument for {0}")]
    MissingArgument(&'static str),

    #[error("unbalanced quotes in input")]
    Quoting,
}
