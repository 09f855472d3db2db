//! Developer console: a reconnecting log stream plus a command line.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Browser callbacks (transport.rs)       │
//! │  - WebSocket open/message/error/close   │
//! │  - Reconnect timer                      │
//! └───────────────────┬─────────────────────┘
//!                     │ TransportEvent → EventQueue
//! ┌───────────────────▼─────────────────────┐
//! │  Console (this module)                  │
//! │  - Drains the queue via pump()          │
//! │  - Routes user commands                 │
//! └───────────────────┬─────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────┐
//! │  ConnectionManager (connection.rs)      │
//! │  - Owns the socket, schedules retries   │
//! │  - Emits Lines to a LogSink             │
//! └───────────────────┬─────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────┐
//! │  Renderer (render.rs) + DOM sink (ui.rs)│
//! │  - classify / escape / timestamps       │
//! │  - bounded history, auto-scroll         │
//! └─────────────────────────────────────────┘
//! ```

mod connection;
mod endpoint;
mod history;
mod protocol;
mod queue;
mod reconnect;
mod render;

#[cfg(target_arch = "wasm32")]
mod transport;
#[cfg(target_arch = "wasm32")]
mod ui;

use std::cell::RefCell;

pub use connection::{CommandError, ConnectionManager, LogSink, Transport, TransportEvent};
#[cfg(target_arch = "wasm32")]
pub use endpoint::page_endpoint;
pub use queue::EventQueue;
pub use reconnect::ReconnectPolicy;
use render::Line;
#[cfg(target_arch = "wasm32")]
pub use transport::WebTransport;
#[cfg(target_arch = "wasm32")]
pub use ui::DomSink;

/// The connection manager together with the sink it writes to.
pub struct Console<T: Transport, S: LogSink> {
    manager: ConnectionManager<T>,
    sink: S,
}

impl<T: Transport, S: LogSink> Console<T, S> {
    pub fn new(manager: ConnectionManager<T>, sink: S) -> Self {
        Self { manager, sink }
    }

    pub fn connect(&mut self) {
        self.manager.connect(&mut self.sink);
    }

    pub fn handle(&mut self, event: TransportEvent) {
        self.manager.handle(event, &mut self.sink);
    }

    /// Submit a command. Failures are reported in the output as well as
    /// returned, so the caller can decide whether to keep the input.
    pub fn submit(&mut self, raw: &str) -> Result<bool, CommandError> {
        let result = self.manager.send_command(raw, &mut self.sink);
        if let Err(e) = &result {
            log::warn!("Command not sent: {}", e);
            self.sink
                .append(Line::Text(format!("🔴 Command not sent: {}", e)));
        }
        result
    }

    #[cfg(test)]
    pub fn manager(&self) -> &ConnectionManager<T> {
        &self.manager
    }

    #[cfg(test)]
    pub fn sink(&self) -> &S {
        &self.sink
    }
}

/// Drain queued events into the console.
///
/// If the console is already borrowed, a pump is running further up the
/// stack and will pick the new events up, so this returns immediately.
pub fn pump<T: Transport, S: LogSink>(
    console: &RefCell<Console<T, S>>,
    events: &EventQueue<TransportEvent>,
) -> usize {
    let Ok(mut console) = console.try_borrow_mut() else {
        return 0;
    };
    let mut handled = 0;
    while let Some(event) = events.pop() {
        console.handle(event);
        handled += 1;
    }
    handled
}

#[cfg(test)]
mod tests {
    use super::connection::tests::FakeTransport;
    use super::connection::{ConnectionState, SocketEvent};
    use super::render::Level;
    use super::*;
    use std::time::Duration;

    fn console() -> Console<FakeTransport, Vec<Line>> {
        let manager = ConnectionManager::new(
            FakeTransport::default(),
            "ws://localhost/ws/logs",
            ReconnectPolicy::Fixed(Duration::from_millis(3000)),
        );
        Console::new(manager, Vec::new())
    }

    #[test]
    fn pump_drains_in_order() {
        let console = RefCell::new(console());
        console.borrow_mut().connect();
        let events = EventQueue::new();
        events.push(TransportEvent::Socket {
            generation: 1,
            event: SocketEvent::Open,
        });
        events.push(TransportEvent::Socket {
            generation: 1,
            event: SocketEvent::Message(r#"{"timestamp":0,"message":"job failed"}"#.into()),
        });

        assert_eq!(pump(&console, &events), 2);
        assert!(events.is_empty());
        let console = console.borrow();
        assert_eq!(console.manager().state(), ConnectionState::Open);
        match &console.sink()[1] {
            Line::Entry(entry) => assert_eq!(entry.level, Level::Error),
            other => panic!("expected entry, got {other:?}"),
        }
    }

    #[test]
    fn pump_defers_while_console_is_busy() {
        let console = RefCell::new(console());
        let events = EventQueue::new();
        events.push(TransportEvent::ReconnectDue);
        {
            let _busy = console.borrow_mut();
            assert_eq!(pump(&console, &events), 0);
        }
        assert_eq!(events.len(), 1);
        assert_eq!(pump(&console, &events), 1);
        assert_eq!(console.borrow().manager().generation(), 1);
    }

    #[test]
    fn failed_submit_is_reported_in_output() {
        let mut console = console();
        assert!(console.submit("reload").is_err());
        assert_eq!(
            console.sink().iter().map(Line::text).collect::<Vec<_>>(),
            vec!["▶️ reload", "🔴 Command not sent: not connected"]
        );
    }
}
