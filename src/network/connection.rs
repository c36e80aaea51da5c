use crate::error::ConnectionError;
use crate::network::messages::ClientMessage;
use crate::network::tls::create_tls_connector;
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};
use url::Url;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// WebSocket connection to the playback server.
///
/// Inbound text frames are forwarded unparsed on the receiver returned by
/// [`Connection::connect`]; the receiver closes when the socket does.
pub struct Connection {
    sender: Mutex<Option<mpsc::UnboundedSender<Message>>>,
}

impl Connection {
    pub fn new() -> Self {
        Self {
            sender: Mutex::new(None),
        }
    }

    pub async fn connect(
        &self,
        url: &Url,
    ) -> Result<mpsc::UnboundedReceiver<String>, ConnectionError> {
        let connector = match url.scheme() {
            "ws" => None,
            "wss" => Some(create_tls_connector()?),
            other => return Err(ConnectionError::UnsupportedScheme(other.to_string())),
        };

        info!("Connecting to {}", url);
        let (stream, _response) = timeout(
            CONNECT_TIMEOUT,
            tokio_tungstenite::connect_async_tls_with_config(url.as_str(), None, true, connector),
        )
        .await
        .map_err(|_| ConnectionError::Timeout)??;
        info!("Connected to {}", url);

        let (mut sink, mut source) = stream.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Message>();
        let (in_tx, in_rx) = mpsc::unbounded_channel::<String>();

        tokio::spawn(async move {
            while let Some(message) = out_rx.recv().await {
                if let Err(e) = sink.send(message).await {
                    error!("Failed to write to server socket: {}", e);
                    break;
                }
            }
            let _ = sink.close().await;
            debug!("Socket write task terminated");
        });

        tokio::spawn(async move {
            while let Some(frame) = source.next().await {
                let text = match frame {
                    Ok(Message::Text(text)) => text,
                    Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                        Ok(text) => text,
                        Err(_) => {
                            warn!("Dropping non-UTF-8 binary frame");
                            continue;
                        }
                    },
                    Ok(Message::Close(frame)) => {
                        info!("Server closed the connection: {:?}", frame);
                        break;
                    }
                    Ok(_) => continue,
                    Err(e) => {
                        warn!("Socket read failed: {}", e);
                        break;
                    }
                };
                if in_tx.send(text).is_err() {
                    break;
                }
            }
            debug!("Socket read task terminated");
        });

        *self.sender.lock() = Some(out_tx);
        Ok(in_rx)
    }

    pub fn send(&self, message: &ClientMessage) -> Result<(), ConnectionError> {
        let json = message.to_json()?;
        debug!("Sending: {}", json);
        let sender = self.sender.lock();
        let Some(sender) = sender.as_ref() else {
            return Err(ConnectionError::NotConnected);
        };
        sender
            .send(Message::Text(json))
            .map_err(|_| ConnectionError::NotConnected)
    }

    /// Drop the write half; the writer task closes the socket
    pub fn disconnect(&self) {
        if self.sender.lock().take().is_some() {
            info!("Disconnecting from server");
        }
    }
}

impl Default for Connection {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_without_connection() {
        let connection = Connection::new();
        assert!(matches!(
            connection.send(&ClientMessage::InitPlayer),
            Err(ConnectionError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_rejects_unsupported_scheme() {
        let connection = Connection::new();
        let url = Url::parse("http://127.0.0.1:5000").unwrap();
        let result = connection.connect(&url).await;
        assert!(matches!(result, Err(ConnectionError::UnsupportedScheme(ref s)) if s == "http"));
    }
}
