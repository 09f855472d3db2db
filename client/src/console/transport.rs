//! Browser WebSocket transport.
//!
//! Socket callbacks and the reconnect timer push [`TransportEvent`]s into a
//! shared queue and then call `wake`, which drains the queue into the console.

use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CloseEvent, MessageEvent, WebSocket};

use super::connection::{
    Generation, Socket, SocketEvent, Transport, TransportError, TransportEvent,
};
use super::queue::EventQueue;

/// Best-effort text for a thrown JS value.
pub fn js_error_text(err: &JsValue) -> String {
    if let Some(s) = err.as_string() {
        return s;
    }
    if let Some(e) = err.dyn_ref::<js_sys::Error>() {
        return String::from(e.message());
    }
    format!("{:?}", err)
}

/// A browser socket plus the callbacks attached to it.
///
/// Dropping the handle detaches the callbacks before the closures are freed,
/// so a superseded socket can't call into dropped Rust code.
pub struct WebSocketHandle {
    ws: WebSocket,
    _onopen: Closure<dyn FnMut(JsValue)>,
    _onmessage: Closure<dyn FnMut(MessageEvent)>,
    _onerror: Closure<dyn FnMut(JsValue)>,
    _onclose: Closure<dyn FnMut(CloseEvent)>,
}

impl Socket for WebSocketHandle {
    fn is_open(&self) -> bool {
        self.ws.ready_state() == WebSocket::OPEN
    }

    fn send_text(&self, text: &str) -> Result<(), TransportError> {
        self.ws
            .send_with_str(text)
            .map_err(|e| TransportError::Send(js_error_text(&e)))
    }
}

impl Drop for WebSocketHandle {
    fn drop(&mut self) {
        self.ws.set_onopen(None);
        self.ws.set_onmessage(None);
        self.ws.set_onerror(None);
        self.ws.set_onclose(None);
    }
}

pub struct WebTransport {
    events: Rc<EventQueue<TransportEvent>>,
    wake: Rc<dyn Fn()>,
}

impl WebTransport {
    pub fn new(events: Rc<EventQueue<TransportEvent>>, wake: Rc<dyn Fn()>) -> Self {
        Self { events, wake }
    }
}

/// Callback that tags `event` with the socket generation and wakes the pump.
fn notifier(
    events: Rc<EventQueue<TransportEvent>>,
    wake: Rc<dyn Fn()>,
    generation: Generation,
) -> impl Fn(SocketEvent) {
    move |event| {
        events.push(TransportEvent::Socket { generation, event });
        wake();
    }
}

impl Transport for WebTransport {
    type Socket = WebSocketHandle;

    fn open(
        &mut self,
        url: &str,
        generation: Generation,
    ) -> Result<WebSocketHandle, TransportError> {
        let ws = WebSocket::new(url).map_err(|e| TransportError::Open(js_error_text(&e)))?;

        let notify = notifier(self.events.clone(), self.wake.clone(), generation);
        let onopen = Closure::wrap(Box::new(move |_: JsValue| {
            notify(SocketEvent::Open);
        }) as Box<dyn FnMut(JsValue)>);
        ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));

        let notify = notifier(self.events.clone(), self.wake.clone(), generation);
        let onmessage = Closure::wrap(Box::new(move |ev: MessageEvent| {
            match ev.data().as_string() {
                Some(text) => notify(SocketEvent::Message(text)),
                None => log::warn!("Ignoring non-text frame on log socket"),
            }
        }) as Box<dyn FnMut(MessageEvent)>);
        ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));

        let notify = notifier(self.events.clone(), self.wake.clone(), generation);
        let onerror = Closure::wrap(Box::new(move |_: JsValue| {
            notify(SocketEvent::Error(None));
        }) as Box<dyn FnMut(JsValue)>);
        ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));

        let notify = notifier(self.events.clone(), self.wake.clone(), generation);
        let onclose = Closure::wrap(Box::new(move |ev: CloseEvent| {
            notify(SocketEvent::Closed {
                code: ev.code(),
                reason: ev.reason(),
            });
        }) as Box<dyn FnMut(CloseEvent)>);
        ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));

        Ok(WebSocketHandle {
            ws,
            _onopen: onopen,
            _onmessage: onmessage,
            _onerror: onerror,
            _onclose: onclose,
        })
    }

    fn schedule_reconnect(&mut self, delay: Duration) {
        let events = self.events.clone();
        let wake = self.wake.clone();
        let callback = Closure::once_into_js(move || {
            events.push(TransportEvent::ReconnectDue);
            wake();
        });

        let ms = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        let scheduled = web_sys::window()
            .ok_or_else(|| JsValue::from_str("no window"))
            .and_then(|w| {
                w.set_timeout_with_callback_and_timeout_and_arguments_0(
                    callback.unchecked_ref(),
                    ms,
                )
            });
        if let Err(e) = scheduled {
            log::error!("Failed to schedule reconnect: {}", js_error_text(&e));
        }
    }
}
