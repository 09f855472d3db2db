/// Developer console server
/// Serves the built console and streams a log file over WebSocket
mod config;
mod logs;
mod tail;

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use tower_http::services::ServeDir;

use config::{LOG_ENDPOINT_PATH, ServerConfig};
use logs::AppState;

fn router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.dist_dir);
    Router::new()
        .route(LOG_ENDPOINT_PATH, get(logs::ws_handler))
        .fallback_service(static_files)
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env()?;
    log::info!("Starting developer console server...");
    log::info!("  HTTP:      http://{}", config.addr);
    log::info!("  WebSocket: ws://{}{}", config.addr, LOG_ENDPOINT_PATH);
    log::info!("  Tailing:   {}", config.log_file.display());

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, router(AppState::new(config)))
        .await
        .context("server error")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::{SinkExt, StreamExt};
    use std::time::Duration;
    use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

    type Client = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

    async fn next_text(ws: &mut Client) -> String {
        loop {
            let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
                .await
                .expect("timed out waiting for a frame")
                .expect("socket closed")
                .expect("socket error");
            match msg {
                Message::Text(text) => return text.to_string(),
                Message::Close(frame) => panic!("socket closed by server: {frame:?}"),
                _ => continue,
            }
        }
    }

    #[tokio::test]
    async fn missing_log_is_reported_and_socket_keeps_answering() {
        let dir = tempfile::tempdir().unwrap();
        let log_file = dir.path().join("missing.log");
        let config = ServerConfig {
            addr: "127.0.0.1:0".parse().unwrap(),
            log_file: log_file.clone(),
            dist_dir: dir.path().to_path_buf(),
            poll_interval: Duration::from_millis(10),
        };

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, router(AppState::new(config))).await
        });

        let (mut ws, _) = connect_async(format!("ws://{}{}", addr, LOG_ENDPOINT_PATH))
            .await
            .unwrap();

        assert_eq!(
            next_text(&mut ws).await,
            format!("[ERROR] Log file not found: {}", log_file.display())
        );

        ws.send(Message::text("ping")).await.unwrap();
        assert_eq!(next_text(&mut ws).await, "pong");

        // Commands are only logged; the socket stays up afterwards.
        ws.send(Message::text(r#"{"type":"cmd","data":"status"}"#))
            .await
            .unwrap();
        ws.send(Message::text("ping")).await.unwrap();
        assert_eq!(next_text(&mut ws).await, "pong");

        ws.close(None).await.unwrap();
        server.abort();
    }
}
