//! Connection manager for the log socket.
//!
//! Owns at most one socket at a time and drives the
//! `Connecting -> Open -> (Error) -> Closed -> Connecting` cycle. The browser
//! specifics live behind [`Transport`] so the whole lifecycle runs natively in
//! tests.

use std::time::Duration;

use thiserror::Error;

use super::protocol::ClientCommand;
use super::reconnect::{ReconnectPolicy, describe_delay};
use super::render::Line;

/// Identifies one socket instance. Bumped on every connect so late events
/// from a superseded socket can be recognised.
pub type Generation = u64;

pub const CONNECTED_NOTICE: &str = "🟢 Connected to Developer Console";
pub const ERROR_NOTICE: &str = "🔴 WebSocket error";
pub const ECHO_MARKER: &str = "▶️ ";

/// Lifecycle events reported by a socket.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketEvent {
    Open,
    Message(String),
    /// Browsers don't expose error details for WebSockets; keep whatever we get.
    Error(Option<String>),
    Closed { code: u16, reason: String },
}

/// Everything that can wake the console.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Socket {
        generation: Generation,
        event: SocketEvent,
    },
    ReconnectDue,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransportError {
    #[error("failed to open socket: {0}")]
    Open(String),
    #[error("failed to send frame: {0}")]
    Send(String),
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("not connected")]
    NotConnected,
    #[error("failed to encode command: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Send(TransportError),
}

/// A live socket.
pub trait Socket {
    fn is_open(&self) -> bool;
    fn send_text(&self, text: &str) -> Result<(), TransportError>;
}

/// Opens sockets and runs timers. Implementations report socket activity and
/// timer expiry back as [`TransportEvent`]s; they must never call into the
/// manager synchronously from `open` or `schedule_reconnect`.
pub trait Transport {
    type Socket: Socket;

    fn open(&mut self, url: &str, generation: Generation) -> Result<Self::Socket, TransportError>;

    fn schedule_reconnect(&mut self, delay: Duration);
}

/// Destination for displayed lines.
pub trait LogSink {
    fn append(&mut self, line: Line);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

pub struct ConnectionManager<T: Transport> {
    transport: T,
    url: String,
    policy: ReconnectPolicy,
    socket: Option<T::Socket>,
    generation: Generation,
    state: ConnectionState,
    /// Consecutive reconnects since the last successful open.
    attempts: u32,
    reconnect_pending: bool,
}

impl<T: Transport> ConnectionManager<T> {
    pub fn new(transport: T, url: impl Into<String>, policy: ReconnectPolicy) -> Self {
        Self {
            transport,
            url: url.into(),
            policy,
            socket: None,
            generation: 0,
            state: ConnectionState::Closed,
            attempts: 0,
            reconnect_pending: false,
        }
    }

    /// Open a new socket, superseding the previous one.
    pub fn connect(&mut self, sink: &mut dyn LogSink) {
        self.generation += 1;
        self.state = ConnectionState::Connecting;
        log::info!("Connecting to log stream: {} (#{})", self.url, self.generation);

        match self.transport.open(&self.url, self.generation) {
            Ok(socket) => self.socket = Some(socket),
            Err(e) => {
                log::error!("{}", e);
                self.socket = None;
                sink.append(Line::Text(format!("{}: {}", ERROR_NOTICE, e)));
                self.on_closed(sink);
            }
        }
    }

    pub fn handle(&mut self, event: TransportEvent, sink: &mut dyn LogSink) {
        match event {
            TransportEvent::ReconnectDue => {
                self.reconnect_pending = false;
                self.connect(sink);
            }
            TransportEvent::Socket { generation, event } if generation != self.generation => {
                log::debug!(
                    "Ignoring {:?} from superseded socket #{} (current #{})",
                    event,
                    generation,
                    self.generation
                );
            }
            TransportEvent::Socket { event, .. } => self.handle_socket_event(event, sink),
        }
    }

    fn handle_socket_event(&mut self, event: SocketEvent, sink: &mut dyn LogSink) {
        match event {
            SocketEvent::Open => {
                log::info!("Log stream connected");
                self.state = ConnectionState::Open;
                self.attempts = 0;
                sink.append(Line::Text(CONNECTED_NOTICE.to_string()));
            }
            SocketEvent::Message(payload) => sink.append(Line::from_payload(&payload)),
            SocketEvent::Error(detail) => {
                log::error!("WebSocket error: {:?}", detail);
                let text = match detail {
                    Some(d) => format!("{}: {}", ERROR_NOTICE, d),
                    None => ERROR_NOTICE.to_string(),
                };
                sink.append(Line::Text(text));
            }
            SocketEvent::Closed { code, reason } => {
                log::info!("Log stream closed (code {}, reason {:?})", code, reason);
                self.on_closed(sink);
            }
        }
    }

    fn on_closed(&mut self, sink: &mut dyn LogSink) {
        self.state = ConnectionState::Closed;
        if self.reconnect_pending {
            return;
        }
        let delay = self.policy.delay(self.attempts);
        self.attempts = self.attempts.saturating_add(1);
        self.reconnect_pending = true;
        sink.append(Line::Text(format!(
            "🔴 Disconnected. Retrying in {}...",
            describe_delay(delay)
        )));
        self.transport.schedule_reconnect(delay);
    }

    /// Echo and send a command typed by the user.
    ///
    /// Returns `Ok(false)` for blank input, which produces no line and no
    /// frame. For anything else the echo line is appended first, then the
    /// envelope is sent; a socket that isn't open yields
    /// [`CommandError::NotConnected`].
    pub fn send_command(
        &mut self,
        raw: &str,
        sink: &mut dyn LogSink,
    ) -> Result<bool, CommandError> {
        let Some(cmd) = ClientCommand::from_input(raw) else {
            return Ok(false);
        };
        sink.append(Line::Text(format!("{}{}", ECHO_MARKER, cmd.text())));

        let json = cmd.to_json()?;
        let socket = self
            .socket
            .as_ref()
            .filter(|s| self.state == ConnectionState::Open && s.is_open())
            .ok_or(CommandError::NotConnected)?;
        socket.send_text(&json).map_err(CommandError::Send)?;
        Ok(true)
    }

    #[cfg(test)]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    #[cfg(test)]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    #[cfg(test)]
    pub fn reconnect_pending(&self) -> bool {
        self.reconnect_pending
    }

    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.transport
    }
}
