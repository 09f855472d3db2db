use axum::{
    extract::State,
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

use crate::config::ServerConfig;
use crate::tail::LogTail;

type ClientId = u64;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    next_id: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", content = "data")]
enum ClientMessage {
    #[serde(rename = "cmd")]
    Cmd(String),
}

/// Text frames understood from the console.
#[derive(Debug, Clone, PartialEq)]
enum Inbound {
    Ping,
    Command(String),
    Unknown,
}

impl Inbound {
    fn parse(text: &str) -> Self {
        if text == "ping" {
            return Inbound::Ping;
        }
        match serde_json::from_str::<ClientMessage>(text) {
            Ok(ClientMessage::Cmd(cmd)) => Inbound::Command(cmd),
            Err(_) => Inbound::Unknown,
        }
    }
}

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let client_id: ClientId = state.next_id.fetch_add(1, Ordering::Relaxed);
    log::info!("Console {} connected", client_id);

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let (mut ws_tx, mut ws_rx) = socket.split();

    // Task to send lines to the console
    let send_task = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            if ws_tx.send(Message::Text(line.into())).await.is_err() {
                break;
            }
        }
    });

    let tail_task = tokio::spawn(stream_log(state.config.clone(), tx.clone()));

    while let Some(Ok(msg)) = ws_rx.next().await {
        match msg {
            Message::Text(text) => match Inbound::parse(text.as_str()) {
                Inbound::Ping => {
                    let _ = tx.send("pong".to_string());
                }
                Inbound::Command(cmd) => log::info!("Console {} command: {}", client_id, cmd),
                Inbound::Unknown => {
                    log::debug!("Console {} sent unknown frame: {}", client_id, text.as_str())
                }
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    log::info!("Console {} disconnected", client_id);
    tail_task.abort();
    send_task.abort();
}

/// Tail the configured log file into `tx` until the socket goes away.
async fn stream_log(config: Arc<ServerConfig>, tx: mpsc::UnboundedSender<String>) {
    let path = &config.log_file;
    let mut tail = match LogTail::open_at_end(path).await {
        Ok(tail) => tail,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Log file not found: {}", path.display());
            let _ = tx.send(format!("[ERROR] Log file not found: {}", path.display()));
            return;
        }
        Err(e) => {
            log::error!("Failed to open {}: {}", path.display(), e);
            let _ = tx.send(format!("[ERROR] Failed to open log file {}: {}", path.display(), e));
            return;
        }
    };

    let mut ticker = tokio::time::interval(config.poll_interval);
    loop {
        ticker.tick().await;
        match tail.poll_lines().await {
            Ok(lines) => {
                for line in lines {
                    if tx.send(line).is_err() {
                        return;
                    }
                }
            }
            Err(e) => {
                log::error!("Failed to read {}: {}", tail.path().display(), e);
                let _ = tx.send(format!("[ERROR] Failed to read log file: {}", e));
                return;
            }
        }
    }
}
